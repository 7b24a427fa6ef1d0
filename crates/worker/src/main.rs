use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod batch;

#[derive(Debug, Parser)]
#[command(name = "bakeplan_worker")]
struct Args {
    /// Planning batch (JSON): traffic records, optional closures and products.
    #[arg(long)]
    input: PathBuf,

    /// Where to write the plans. Defaults to stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Validate the batch and log its size without planning.
    #[arg(long)]
    dry_run: bool,
}

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

    let args = Args::parse();

    if let Err(err) = run(&args, &settings).await {
        sentry_anyhow::capture_anyhow(&err);
        tracing::error!(input = %args.input.display(), error = %err, "planning run failed");
        return Err(err);
    }
    Ok(())
}

async fn run(args: &Args, settings: &bakeplan_core::config::Settings) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let batch: bakeplan_core::plan::PlanningBatch = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid planning batch", args.input.display()))?;

    if args.dry_run {
        batch.validate()?;
        tracing::info!(
            products = batch.products.len(),
            traffic_records = batch.traffic.len(),
            closures = batch.closures.is_some(),
            dry_run = true,
            "planning batch is valid"
        );
        return Ok(());
    }

    let started = chrono::Utc::now();
    let products = batch.products.len();
    let plans =
        batch::plan_concurrently(batch, settings.planning, settings.worker_concurrency).await?;

    let rejected: usize = plans.iter().map(|p| p.rejected_splits.len()).sum();
    if rejected > 0 {
        tracing::warn!(rejected, "some closure redistributions were rejected");
    }

    let body = serde_json::to_string_pretty(&plans).context("failed to serialize plans")?;
    match &args.output {
        Some(path) => tokio::fs::write(path, body)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{body}"),
    }

    let elapsed_ms = (chrono::Utc::now() - started).num_milliseconds();
    tracing::info!(products, elapsed_ms, "planning run finished");
    Ok(())
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
