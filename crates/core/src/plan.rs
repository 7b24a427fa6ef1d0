use crate::domain::closure::ClosureConfig;
use crate::domain::sales::{ProductHistory, TrafficRecord};
use crate::domain::week::{DayPlan, WeekdayMap, Weights};
use crate::engine::closure::{apply_closures, SlotPlan};
use crate::engine::distribute::{distribute_week_explained, DayDecision, DayOverrides, GrowthVariant};
use crate::engine::error::InvalidRedistributionSplit;
use crate::engine::history::{compute_historical_floors, HistoricalFloors};
use crate::engine::potential::{evaluate_potential, PotentialMethod, PotentialReport};
use crate::engine::traffic::compute_traffic_weights;
use anyhow::ensure;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Choices applied when a product request leaves them out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanningDefaults {
    pub method: PotentialMethod,
    pub variant: GrowthVariant,
    pub morning_share: f64,
}

impl Default for PlanningDefaults {
    fn default() -> Self {
        Self {
            method: PotentialMethod::Prudent,
            variant: GrowthVariant::Uncapped,
            morning_share: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPlanRequest {
    #[serde(flatten)]
    pub history: ProductHistory,
    #[serde(default)]
    pub method: Option<PotentialMethod>,
    #[serde(default)]
    pub variant: Option<GrowthVariant>,
    #[serde(default)]
    pub overrides: Option<DayOverrides>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningBatch {
    #[serde(default)]
    pub traffic: Vec<TrafficRecord>,
    #[serde(default)]
    pub closures: Option<ClosureConfig>,
    pub products: Vec<ProductPlanRequest>,
}

impl PlanningBatch {
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut seen = BTreeSet::new();
        for product in &self.products {
            let id = product.history.product_id.trim();
            ensure!(!id.is_empty(), "product_id must be non-empty");
            ensure!(seen.insert(id), "duplicate product_id: {id}");
        }

        if let Some(share) = self.closures.as_ref().and_then(|c| c.morning_share) {
            ensure!(
                (0.0..=1.0).contains(&share),
                "closures.morning_share must be between 0 and 1 (got {share})"
            );
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPlan {
    pub product_id: String,
    pub total_sales: f64,
    pub floors: HistoricalFloors,
    pub potential: PotentialReport,
    pub days: WeekdayMap<DayDecision>,
    /// Plan before closures.
    pub distributed: DayPlan,
    pub slots: SlotPlan,
    pub plan: DayPlan,
    pub rejected_splits: Vec<InvalidRedistributionSplit>,
}

/// Runs the whole pipeline for one product: floors, weekly potential, daily
/// distribution, then closures. Depends only on its arguments, so products
/// can be planned in parallel.
pub fn plan_product(
    request: &ProductPlanRequest,
    weights: &Weights,
    closures: Option<&ClosureConfig>,
    defaults: &PlanningDefaults,
) -> ProductPlan {
    let history = &request.history;
    let floors = compute_historical_floors(history);
    let method = request.method.unwrap_or(defaults.method);
    let variant = request.variant.unwrap_or(defaults.variant);

    let potential = evaluate_potential(history, &floors, weights, method);
    let days = distribute_week_explained(
        potential.weekly_potential,
        weights,
        &floors,
        variant,
        request.overrides.as_ref(),
    );
    let distributed = days.map(|_, d| d.quantity);

    let mut closures = closures.cloned().unwrap_or_default();
    closures.morning_share = Some(closures.morning_share_or(defaults.morning_share));
    let outcome = apply_closures(&distributed, &closures);

    tracing::debug!(
        product_id = %history.product_id,
        weekly_potential = potential.weekly_potential,
        distributed_total = distributed.total(),
        rejected_splits = outcome.rejected.len(),
        "product planned"
    );

    ProductPlan {
        product_id: history.product_id.clone(),
        total_sales: potential.total_sales,
        floors,
        potential,
        days,
        distributed,
        plan: outcome.day_plan(),
        slots: outcome.slots,
        rejected_splits: outcome.rejected,
    }
}

/// Validates the batch, derives traffic weights once and plans every product.
pub fn plan_batch(
    batch: &PlanningBatch,
    defaults: &PlanningDefaults,
) -> anyhow::Result<Vec<ProductPlan>> {
    batch.validate()?;
    let weights = compute_traffic_weights(&batch.traffic);
    Ok(batch
        .products
        .iter()
        .map(|p| plan_product(p, &weights, batch.closures.as_ref(), defaults))
        .collect())
}
