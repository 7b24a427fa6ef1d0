use axum::{extract::State, http::StatusCode, routing::get, routing::post, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use bakeplan_core::domain::sales::TrafficRecord;
use bakeplan_core::domain::week::Weights;
use bakeplan_core::plan::{PlanningBatch, PlanningDefaults, ProductPlan};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = bakeplan_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let state = AppState {
        defaults: settings.planning,
    };

    let app = router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], settings.port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/weights", post(post_weights))
        .route("/plans", post(post_plans))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Clone)]
struct AppState {
    defaults: PlanningDefaults,
}

#[derive(Debug, Serialize)]
struct PlanRun {
    run_id: Uuid,
    generated_at: DateTime<Utc>,
    products: Vec<ProductPlan>,
}

async fn post_weights(Json(records): Json<Vec<TrafficRecord>>) -> Json<Weights> {
    Json(bakeplan_core::engine::traffic::compute_traffic_weights(
        &records,
    ))
}

async fn post_plans(
    State(state): State<AppState>,
    Json(batch): Json<PlanningBatch>,
) -> Result<Json<PlanRun>, StatusCode> {
    if let Err(e) = batch.validate() {
        sentry_anyhow::capture_anyhow(&e);
        tracing::warn!(error = %e, "rejected planning batch");
        return Err(StatusCode::BAD_REQUEST);
    }

    let run_id = Uuid::new_v4();
    let defaults = state.defaults;
    let products = tokio::task::spawn_blocking(move || {
        bakeplan_core::plan::plan_batch(&batch, &defaults)
    })
    .await
    .map_err(|e| {
        sentry_anyhow::capture_anyhow(&anyhow::Error::new(e));
        StatusCode::INTERNAL_SERVER_ERROR
    })?
    .map_err(|e| {
        sentry_anyhow::capture_anyhow(&e);
        StatusCode::BAD_REQUEST
    })?;

    tracing::info!(%run_id, products = products.len(), "planning run served");

    Ok(Json(PlanRun {
        run_id,
        generated_at: Utc::now(),
        products,
    }))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &bakeplan_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state() -> State<AppState> {
        State(AppState {
            defaults: PlanningDefaults::default(),
        })
    }

    #[tokio::test]
    async fn weights_endpoint_normalizes() {
        let records: Vec<TrafficRecord> = serde_json::from_value(json!([
            {"weekday": "monday", "count": 1},
            {"weekday": "friday", "count": 3}
        ]))
        .unwrap();
        let Json(weights) = post_weights(Json(records)).await;
        assert_eq!(weights.monday, 0.25);
        assert_eq!(weights.friday, 0.75);
    }

    #[tokio::test]
    async fn plans_endpoint_rejects_duplicate_products() {
        let batch: PlanningBatch = serde_json::from_value(json!({
            "products": [
                {"product_id": "pain", "daily_sales": []},
                {"product_id": "pain", "daily_sales": []}
            ]
        }))
        .unwrap();
        let res = post_plans(state(), Json(batch)).await;
        assert_eq!(res.err(), Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn plans_endpoint_returns_one_plan_per_product() {
        let batch: PlanningBatch = serde_json::from_value(json!({
            "products": [
                {"product_id": "pain", "daily_sales": [{"date": 45320, "quantity": 14}]},
                {"product_id": "tarte", "daily_sales": []}
            ]
        }))
        .unwrap();
        let Json(run) = post_plans(state(), Json(batch)).await.unwrap();
        assert_eq!(run.products.len(), 2);
        // Uniform weights: 14 / (1/7) = 98, held by prudent's +10% cap at 16.
        assert_eq!(run.products[0].potential.weekly_potential, 16);
        assert_eq!(run.products[1].plan.total(), 0);
    }
}
