use crate::domain::sales::ProductHistory;
use crate::domain::week::{serde_label_opt, Weights};
use crate::engine::ceil_units;
use crate::engine::history::HistoricalFloors;
use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// How the weekly potential is derived from history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PotentialMethod {
    /// Peak single-day sale scaled up by that day's traffic weight.
    Mathematical,
    /// Mathematical, growth capped at +10% over current volume.
    Prudent,
    /// Mathematical, growth capped at +20% over current volume.
    Standard,
    /// Caller-supplied weekly potential.
    Manual(u64),
}

impl PotentialMethod {
    pub fn growth_cap(&self) -> Option<f64> {
        match self {
            PotentialMethod::Prudent => Some(0.10),
            PotentialMethod::Standard => Some(0.20),
            PotentialMethod::Mathematical | PotentialMethod::Manual(_) => None,
        }
    }

    /// Parses the method names used in configuration. `Manual` carries a value
    /// and has no bare name.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mathematical" | "mathematique" => Some(PotentialMethod::Mathematical),
            "prudent" => Some(PotentialMethod::Prudent),
            "standard" => Some(PotentialMethod::Standard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PotentialClamp {
    #[default]
    None,
    /// Growth exceeded the method's cap.
    GrowthCap,
    /// Growth was negative; held at current volume.
    CurrentVolume,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PotentialReport {
    pub method: PotentialMethod,
    pub weekly_potential: u64,
    /// Uncapped mathematical value, kept for display next to the capped one.
    pub mathematical: u64,
    #[serde(with = "serde_label_opt")]
    pub peak_day: Option<Weekday>,
    pub total_sales: f64,
    /// Relative change of the chosen potential over total sales; `None` when
    /// there are no sales to compare against.
    pub growth: Option<f64>,
    pub clamp: PotentialClamp,
}

/// `ceil(peak / weight(peak_day))`, or `peak * 7` when that day carries no
/// traffic weight.
pub fn mathematical_potential(floors: &HistoricalFloors, weights: &Weights) -> (u64, Option<Weekday>) {
    let Some((day, peak)) = floors.peak() else {
        return (0, None);
    };
    let weight = weights[day];
    let value = if weight > 0.0 && weight.is_finite() {
        ceil_units(peak / weight)
    } else {
        ceil_units(peak * 7.0)
    };
    (value, Some(day))
}

pub fn evaluate_potential(
    history: &ProductHistory,
    floors: &HistoricalFloors,
    weights: &Weights,
    method: PotentialMethod,
) -> PotentialReport {
    let total_sales = history.total_sales();
    let (mathematical, peak_day) = mathematical_potential(floors, weights);
    let growth_of = |value: u64| (total_sales > 0.0).then(|| (value as f64 - total_sales) / total_sales);

    let (weekly_potential, clamp) = match method {
        PotentialMethod::Manual(value) => (value, PotentialClamp::None),
        PotentialMethod::Mathematical => (mathematical, PotentialClamp::None),
        PotentialMethod::Prudent | PotentialMethod::Standard => {
            let cap = method.growth_cap().unwrap_or_default();
            match growth_of(mathematical) {
                Some(g) if g > cap => (
                    ceil_units(total_sales * (1.0 + cap)),
                    PotentialClamp::GrowthCap,
                ),
                Some(g) if g < 0.0 => (ceil_units(total_sales), PotentialClamp::CurrentVolume),
                _ => (mathematical, PotentialClamp::None),
            }
        }
    };

    let report = PotentialReport {
        method,
        weekly_potential,
        mathematical,
        peak_day,
        total_sales,
        growth: growth_of(weekly_potential),
        clamp,
    };

    tracing::debug!(
        product_id = %history.product_id,
        ?method,
        weekly_potential,
        mathematical,
        ?clamp,
        "weekly potential evaluated"
    );

    report
}

pub fn compute_weekly_potential(
    history: &ProductHistory,
    floors: &HistoricalFloors,
    weights: &Weights,
    method: PotentialMethod,
) -> u64 {
    evaluate_potential(history, floors, weights, method).weekly_potential
}
