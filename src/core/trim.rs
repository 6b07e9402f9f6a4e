use bon::Builder;
use chrono::TimeDelta;

use crate::{
    core::{charge_slot::SlotEnergy, plan::ChargePlan},
    prelude::*,
    quantity::{energy::KilowattHours, percent::Percent, rate::KilowattHourRate},
};

/// Surplus shorter than this is not worth trimming.
const MIN_SURPLUS_MINUTES: i64 = 5;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Side {
    Leading,
    Trailing,
}

/// The most expensive window boundary.
#[derive(Copy, Clone, Debug)]
struct Edge {
    /// Index of the charge slot.
    index: usize,

    side: Side,
    rate: KilowattHourRate,
}

/// Removes the energy delivered on top of what is needed.
///
/// The required slot count is rounded up, so the plan may deliver up to almost one slot worth
/// of extra energy. The surplus is cut from the single most expensive window boundary.
#[derive(Builder)]
pub struct SurplusTrim {
    surplus: KilowattHours,
    slot_energy: SlotEnergy,
    slot_duration: TimeDelta,
    capacity: KilowattHours,

    /// State of charge before the first window.
    initial_soc: Percent,
}

impl SurplusTrim {
    #[must_use]
    #[instrument(name = "Trimming…", skip_all, fields(surplus = ?self.surplus))]
    pub fn apply(&self, mut plan: ChargePlan) -> ChargePlan {
        let surplus_minutes = self.surplus_minutes();
        if surplus_minutes <= MIN_SURPLUS_MINUTES {
            debug!(surplus_minutes, "not worth trimming");
            return plan;
        }
        let Some(edge) = Self::find_most_expensive_edge(&plan) else {
            return plan;
        };
        debug!(
            surplus_minutes,
            index = edge.index,
            side = ?edge.side,
            rate = ?edge.rate,
            "trimming",
        );

        let removed_cost =
            self.slot_energy.grid * edge.rate * (self.surplus / self.slot_energy.battery);
        let mut soc_before = match edge.index {
            0 => self.initial_soc,
            index => plan.charge_slots[index - 1].charge,
        };
        for (index, charge_slot) in plan.charge_slots.iter_mut().enumerate().skip(edge.index) {
            if index == edge.index {
                charge_slot.energy -= self.surplus;
                charge_slot.cost -= removed_cost;
                match edge.side {
                    Side::Leading => {
                        charge_slot.interval.start += TimeDelta::minutes(surplus_minutes);
                    }
                    Side::Trailing => {
                        charge_slot.interval.end -= TimeDelta::minutes(surplus_minutes);
                    }
                }
                charge_slot.rebase(self.capacity, soc_before);
                // Subsequent windows continue from the rounded charge:
                soc_before = charge_slot.charge;
            } else {
                charge_slot.rebase(self.capacity, soc_before);
                soc_before += charge_slot.charge_delta;
            }
        }

        plan.total_energy -= self.surplus;
        plan.total_cost -= removed_cost;
        plan
    }

    /// Surplus expressed in whole minutes of charging.
    #[expect(clippy::cast_possible_truncation)]
    fn surplus_minutes(&self) -> i64 {
        let n_slots = self.surplus / self.slot_energy.battery;
        (n_slots * self.slot_duration.as_seconds_f64() / 60.0).floor() as i64
    }

    /// Find the most expensive first or last slot among all the windows.
    ///
    /// The earliest one wins a tie, and a leading slot wins over the trailing one.
    fn find_most_expensive_edge(plan: &ChargePlan) -> Option<Edge> {
        let mut most_expensive: Option<Edge> = None;
        for (index, charge_slot) in plan.charge_slots.iter().enumerate() {
            for (side, price_slot) in [
                (Side::Leading, charge_slot.leading_slot()),
                (Side::Trailing, charge_slot.trailing_slot()),
            ] {
                if most_expensive.is_none_or(|edge| price_slot.rate > edge.rate) {
                    most_expensive = Some(Edge { index, side, rate: price_slot.rate });
                }
            }
        }
        most_expensive
    }
}
