use serde::Serialize;

use crate::{
    core::charge_slot::ChargeSlot,
    quantity::{cost::Cost, energy::KilowattHours},
};

/// Why the plan looks the way it does.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The cheapest windows have been selected.
    Planned,

    /// The battery is already at or above the target.
    NoChargingNeeded,

    /// The forecast is too short, so the whole of it is used.
    InsufficientSlots,

    /// No split count produced a complete set of windows.
    NoFeasiblePlan,
}

#[derive(Clone, Debug, Serialize)]
pub struct ChargePlan {
    pub outcome: Outcome,
    pub charge_slots: Vec<ChargeSlot>,
    pub total_energy: KilowattHours,
    pub total_cost: Cost,
}

impl ChargePlan {
    pub const fn empty(outcome: Outcome) -> Self {
        Self {
            outcome,
            charge_slots: Vec::new(),
            total_energy: KilowattHours::ZERO,
            total_cost: Cost::ZERO,
        }
    }
}
