use crate::domain::sales::ProductHistory;
use crate::domain::week::WeekdayMap;
use crate::time::weekday::weekday_of;
use chrono::Weekday;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DayFloor {
    /// Total sold on this weekday across the historical window.
    pub sum: f64,
    /// Largest single-day sale on this weekday.
    pub max: f64,
}

pub type HistoricalFloors = WeekdayMap<DayFloor>;

impl WeekdayMap<DayFloor> {
    /// Weekday holding the overall largest single-day sale; ties go to the
    /// earliest weekday. `None` when nothing was ever sold.
    pub fn peak(&self) -> Option<(Weekday, f64)> {
        let mut best: Option<(Weekday, f64)> = None;
        for (day, floor) in self.iter() {
            if floor.max <= 0.0 {
                continue;
            }
            match best {
                Some((_, max)) if max >= floor.max => {}
                _ => best = Some((day, floor.max)),
            }
        }
        best
    }

    pub fn total(&self) -> f64 {
        self.iter().map(|(_, f)| f.sum).sum()
    }
}

/// Per-weekday totals and maxima of a product's sales. Records whose date
/// cannot be resolved are skipped.
pub fn compute_historical_floors(history: &ProductHistory) -> HistoricalFloors {
    let mut floors = HistoricalFloors::default();
    let mut unknown = 0usize;

    for sale in &history.daily_sales {
        let Some(day) = weekday_of(&sale.date) else {
            unknown += 1;
            tracing::debug!(
                product_id = %history.product_id,
                date = ?sale.date,
                "unparsable sale date; excluded from floors"
            );
            continue;
        };

        if sale.quantity != sale.effective_quantity() {
            tracing::debug!(
                product_id = %history.product_id,
                quantity = sale.quantity,
                "invalid sale quantity treated as zero"
            );
        }

        let qty = sale.effective_quantity();
        let floor = &mut floors[day];
        floor.sum += qty;
        floor.max = floor.max.max(qty);
    }

    if unknown > 0 {
        tracing::debug!(
            product_id = %history.product_id,
            unknown,
            total = history.daily_sales.len(),
            "sales excluded for unknown weekday"
        );
    }

    floors
}
