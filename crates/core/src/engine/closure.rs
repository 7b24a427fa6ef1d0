use crate::domain::closure::{ClosureConfig, Slot, SlotStatus, DEFAULT_MORNING_SHARE};
use crate::domain::week::{DayPlan, WeekdayMap, WEEK};
use crate::engine::ceil_units;
use crate::engine::error::InvalidRedistributionSplit;
use chrono::Weekday;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HalfDays {
    pub morning: u64,
    pub afternoon: u64,
}

impl HalfDays {
    pub fn get(&self, slot: Slot) -> u64 {
        match slot {
            Slot::Morning => self.morning,
            Slot::Afternoon => self.afternoon,
        }
    }

    pub fn get_mut(&mut self, slot: Slot) -> &mut u64 {
        match slot {
            Slot::Morning => &mut self.morning,
            Slot::Afternoon => &mut self.afternoon,
        }
    }

    pub fn total(&self) -> u64 {
        self.morning.saturating_add(self.afternoon)
    }
}

pub type SlotPlan = WeekdayMap<HalfDays>;

impl WeekdayMap<HalfDays> {
    /// Splits each day with `round(q * morning_share)` in the morning and the
    /// rest in the afternoon, so day totals are kept exactly.
    pub fn split(plan: &DayPlan, morning_share: f64) -> Self {
        let share = if morning_share.is_finite() {
            morning_share.clamp(0.0, 1.0)
        } else {
            0.5
        };
        plan.map(|_, &q| {
            let morning = ((q as f64 * share).round() as u64).min(q);
            HalfDays {
                morning,
                afternoon: q - morning,
            }
        })
    }

    pub fn day_plan(&self) -> DayPlan {
        self.map(|_, halves| halves.total())
    }

    pub fn total(&self) -> u64 {
        self.iter().fold(0, |acc, (_, h)| acc.saturating_add(h.total()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosureOutcome {
    pub slots: SlotPlan,
    pub rejected: Vec<InvalidRedistributionSplit>,
}

impl ClosureOutcome {
    pub fn day_plan(&self) -> DayPlan {
        self.slots.day_plan()
    }
}

struct Transfer {
    day: Weekday,
    slot: Slot,
    quantity: u64,
}

/// Splits a day plan into half-days with the configured morning share (even
/// split when unset), then applies closures.
pub fn apply_closures(plan: &DayPlan, config: &ClosureConfig) -> ClosureOutcome {
    let share = config.morning_share_or(DEFAULT_MORNING_SHARE);
    apply_slot_closures(&SlotPlan::split(plan, share), config)
}

/// Zeroes every closed slot and moves exceptionally closed quantities to open
/// slots.
///
/// Amounts are taken from the input plan, never from quantities received
/// during this pass. Each exceptional slot is rounded up per target, adding at
/// most one unit to the week. Habitually closed slots are dropped.
pub fn apply_slot_closures(slots: &SlotPlan, config: &ClosureConfig) -> ClosureOutcome {
    let mut out = *slots;
    let mut transfers = Vec::new();
    let mut rejected = Vec::new();

    for day in WEEK {
        for slot in Slot::BOTH {
            let closure = config.days[day].slot(slot);
            if closure.status != SlotStatus::ClosedExceptional {
                continue;
            }

            let quantity = slots[day].get(slot);
            if !closure.redistribution.is_valid() {
                let err = InvalidRedistributionSplit {
                    day,
                    slot,
                    same_day_other_slot: closure.redistribution.same_day_other_slot,
                    next_day: closure.redistribution.next_day,
                    dropped_quantity: quantity,
                };
                tracing::warn!(error = %err, "redistribution skipped");
                rejected.push(err);
                continue;
            }

            if quantity > 0 {
                plan_transfers(config, day, slot, quantity, &mut transfers);
            }
        }
    }

    for day in WEEK {
        for slot in Slot::BOTH {
            if !config.days[day].slot(slot).status.is_open() {
                *out[day].get_mut(slot) = 0;
            }
        }
    }

    for t in transfers {
        let target = out[t.day].get_mut(t.slot);
        *target = target.saturating_add(t.quantity);
    }

    ClosureOutcome {
        slots: out,
        rejected,
    }
}

fn plan_transfers(
    config: &ClosureConfig,
    day: Weekday,
    slot: Slot,
    quantity: u64,
    transfers: &mut Vec<Transfer>,
) {
    let split = config.days[day].slot(slot).redistribution;
    let mut same_day_pct = split.same_day_other_slot;
    let mut next_day_pct = split.next_day;

    // A closed sibling cannot receive; its share moves forward instead.
    if !config.days[day].slot(slot.other()).status.is_open() {
        next_day_pct += same_day_pct;
        same_day_pct = 0.0;
    }

    let share = |pct: f64| ceil_units(quantity as f64 * pct / 100.0);

    if same_day_pct > 0.0 {
        transfers.push(Transfer {
            day,
            slot: slot.other(),
            quantity: share(same_day_pct),
        });
    }

    if next_day_pct > 0.0 {
        match next_open_slot(config, day) {
            Some((target_day, target_slot)) => transfers.push(Transfer {
                day: target_day,
                slot: target_slot,
                quantity: share(next_day_pct),
            }),
            None => tracing::warn!(
                ?day,
                ?slot,
                quantity,
                "no open slot in the week; redistributed share dropped"
            ),
        }
    }
}

/// First open slot from the next day onward, morning before afternoon,
/// wrapping Sunday to Monday.
fn next_open_slot(config: &ClosureConfig, from: Weekday) -> Option<(Weekday, Slot)> {
    let mut day = from;
    for _ in 0..7 {
        day = day.succ();
        for slot in Slot::BOTH {
            if config.days[day].slot(slot).status.is_open() {
                return Some((day, slot));
            }
        }
    }
    None
}
