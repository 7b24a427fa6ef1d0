use crate::domain::closure::Slot;
use crate::domain::week::{serde_label, weekday_label};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An exceptionally closed slot whose redistribution percentages do not add
/// up to 100. Its quantity is zeroed and nothing is moved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvalidRedistributionSplit {
    #[serde(with = "serde_label")]
    pub day: Weekday,
    pub slot: Slot,
    pub same_day_other_slot: f64,
    pub next_day: f64,
    /// Units the slot held before being zeroed.
    pub dropped_quantity: u64,
}

impl fmt::Display for InvalidRedistributionSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid redistribution split (day={}, slot={:?}): {}% + {}% must equal 100%",
            weekday_label(self.day),
            self.slot,
            self.same_day_other_slot,
            self.next_day
        )
    }
}

impl std::error::Error for InvalidRedistributionSplit {}
