use crate::domain::week::WeekdayMap;
use serde::{Deserialize, Serialize};

const SPLIT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Morning,
    Afternoon,
}

impl Slot {
    pub const BOTH: [Slot; 2] = [Slot::Morning, Slot::Afternoon];

    pub fn other(self) -> Slot {
        match self {
            Slot::Morning => Slot::Afternoon,
            Slot::Afternoon => Slot::Morning,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    #[default]
    Open,
    ClosedHabitual,
    ClosedExceptional,
}

impl SlotStatus {
    /// User-driven cycle: open -> closed_habitual -> closed_exceptional -> open.
    pub fn next(self) -> SlotStatus {
        match self {
            SlotStatus::Open => SlotStatus::ClosedHabitual,
            SlotStatus::ClosedHabitual => SlotStatus::ClosedExceptional,
            SlotStatus::ClosedExceptional => SlotStatus::Open,
        }
    }

    pub fn is_open(self) -> bool {
        matches!(self, SlotStatus::Open)
    }
}

/// Percentages of an exceptionally closed slot's quantity sent elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Redistribution {
    pub same_day_other_slot: f64,
    pub next_day: f64,
}

impl Default for Redistribution {
    fn default() -> Self {
        Self {
            same_day_other_slot: 50.0,
            next_day: 50.0,
        }
    }
}

impl Redistribution {
    pub fn is_valid(&self) -> bool {
        let parts = [self.same_day_other_slot, self.next_day];
        parts.iter().all(|p| p.is_finite() && *p >= 0.0)
            && (parts.iter().sum::<f64>() - 100.0).abs() <= SPLIT_TOLERANCE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SlotClosure {
    #[serde(default)]
    pub status: SlotStatus,
    #[serde(default)]
    pub redistribution: Redistribution,
}

impl SlotClosure {
    pub fn exceptional(redistribution: Redistribution) -> Self {
        Self {
            status: SlotStatus::ClosedExceptional,
            redistribution,
        }
    }

    pub fn habitual() -> Self {
        Self {
            status: SlotStatus::ClosedHabitual,
            ..Self::default()
        }
    }

    /// Advances the status; stored percentages survive every transition.
    pub fn cycle(&mut self) {
        self.status = self.status.next();
    }

    /// The redistribution panel is only shown while exceptionally closed.
    pub fn redistribution_visible(&self) -> bool {
        self.status == SlotStatus::ClosedExceptional
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DayClosure {
    #[serde(default)]
    pub morning: SlotClosure,
    #[serde(default)]
    pub afternoon: SlotClosure,
}

impl DayClosure {
    pub fn slot(&self, slot: Slot) -> &SlotClosure {
        match slot {
            Slot::Morning => &self.morning,
            Slot::Afternoon => &self.afternoon,
        }
    }

    pub fn slot_mut(&mut self, slot: Slot) -> &mut SlotClosure {
        match slot {
            Slot::Morning => &mut self.morning,
            Slot::Afternoon => &mut self.afternoon,
        }
    }

    /// Both half-days share one status.
    pub fn whole_day(closure: SlotClosure) -> Self {
        Self {
            morning: closure,
            afternoon: closure,
        }
    }
}

pub const DEFAULT_MORNING_SHARE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClosureConfig {
    #[serde(default)]
    pub days: WeekdayMap<DayClosure>,
    /// Fraction of a day's quantity planned for the morning slot. `None`
    /// defers to the caller's planning defaults.
    #[serde(default)]
    pub morning_share: Option<f64>,
}

impl ClosureConfig {
    pub fn morning_share_or(&self, fallback: f64) -> f64 {
        self.morning_share.unwrap_or(fallback)
    }
}
