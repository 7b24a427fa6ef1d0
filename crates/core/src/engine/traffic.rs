use crate::domain::sales::{sanitize_quantity, TrafficRecord};
use crate::domain::week::{WeekdayMap, Weights};

pub const UNIFORM_WEIGHT: f64 = 1.0 / 7.0;

/// Raw traffic counts summed per weekday. Negative or non-finite counts are
/// ignored.
pub fn aggregate_traffic(records: &[TrafficRecord]) -> WeekdayMap<f64> {
    let mut counts = WeekdayMap::splat(0.0);
    for record in records {
        counts[record.weekday] += sanitize_quantity(record.count);
    }
    counts
}

/// Normalizes traffic into weekday weights summing to 1.0. Zero total traffic
/// yields a uniform 1/7 per day.
pub fn compute_traffic_weights(records: &[TrafficRecord]) -> Weights {
    normalize(&aggregate_traffic(records))
}

pub fn normalize(counts: &WeekdayMap<f64>) -> Weights {
    let total = counts.total();
    if total <= 0.0 || !total.is_finite() {
        tracing::warn!(
            records_total = total,
            "no usable traffic; falling back to uniform weekday weights"
        );
        return WeekdayMap::splat(UNIFORM_WEIGHT);
    }
    counts.map(|_, c| c / total)
}
