use anyhow::Context;
use bakeplan_core::engine::traffic::compute_traffic_weights;
use bakeplan_core::plan::{plan_product, PlanningBatch, PlanningDefaults, ProductPlan};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Plans every product of the batch on the blocking pool, at most
/// `concurrency` at a time. Results keep the input order.
pub async fn plan_concurrently(
    batch: PlanningBatch,
    defaults: PlanningDefaults,
    concurrency: usize,
) -> anyhow::Result<Vec<ProductPlan>> {
    batch.validate()?;

    let weights = Arc::new(compute_traffic_weights(&batch.traffic));
    let closures = Arc::new(batch.closures);
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));

    let mut handles = Vec::with_capacity(batch.products.len());
    for product in batch.products {
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .context("planning semaphore closed")?;
        let weights = Arc::clone(&weights);
        let closures = Arc::clone(&closures);

        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            plan_product(&product, &weights, (*closures).as_ref(), &defaults)
        }));
    }

    let mut plans = Vec::with_capacity(handles.len());
    for handle in handles {
        plans.push(handle.await.context("planning task failed")?);
    }
    Ok(plans)
}
