use bon::Builder;
use chrono::{DateTime, Local};
use ordered_float::OrderedFloat;

use crate::{
    core::{
        charge_slot::{ChargeSlot, SlotEnergy},
        enumerator::Enumerator,
        error::InvalidConfiguration,
        plan::{ChargePlan, Outcome},
        price_slot::PriceSlot,
        trim::SurplusTrim,
        window::Window,
    },
    prelude::*,
    quantity::{cost::Cost, energy::KilowattHours, percent::Percent},
};

/// Cheapest charging plan finder.
#[derive(Builder)]
#[builder(finish_fn(vis = ""))]
pub struct Planner<'a> {
    current_soc: Percent,
    target_soc: Percent,
    capacity: KilowattHours,
    slot_energy: SlotEnergy,

    /// Forecast ordered by the start time.
    price_slots: &'a [PriceSlot],

    #[builder(default = 1)]
    min_slots_per_window: usize,

    #[builder(default = 3)]
    max_windows: usize,

    /// Only the slots starting before this moment are considered.
    complete_by: Option<DateTime<Local>>,
}

impl<S: planner_builder::IsComplete> PlannerBuilder<'_, S> {
    pub fn plan(self) -> Result<ChargePlan, InvalidConfiguration> {
        self.build().plan()
    }
}

impl Planner<'_> {
    #[instrument(
        name = "Planning…",
        skip_all,
        fields(current_soc = ?self.current_soc, target_soc = ?self.target_soc),
    )]
    fn plan(self) -> Result<ChargePlan, InvalidConfiguration> {
        self.validate()?;

        let energy_needed = (self.capacity * (self.target_soc - self.current_soc).to_proportion())
            .max(KilowattHours::ZERO);
        if energy_needed <= KilowattHours::ZERO {
            info!("no charging needed");
            return Ok(ChargePlan::empty(Outcome::NoChargingNeeded));
        }

        let price_slots = self.available_slots();
        let n_slots_to_charge = self.n_slots_for(energy_needed);
        debug!(
            energy_needed = ?energy_needed,
            n_slots_to_charge,
            n_available_slots = price_slots.len(),
            "sized the plan",
        );
        if price_slots.len() < n_slots_to_charge {
            warn!(n_slots_to_charge, n_available_slots = price_slots.len(), "not enough slots");
            return Ok(self.charge_everything(price_slots));
        }

        let candidates = Enumerator::builder()
            .slots(price_slots)
            .n_slots_to_charge(n_slots_to_charge)
            .max_windows(self.max_windows)
            .min_slots_per_window(self.min_slots_per_window)
            .energy_per_slot(self.slot_energy.grid)
            .build()
            .enumerate();
        let Some(best) =
            candidates.into_iter().min_by_key(|candidate| OrderedFloat(candidate.cost.0))
        else {
            warn!("no feasible plan");
            return Ok(ChargePlan::empty(Outcome::NoFeasiblePlan));
        };
        info!(n_windows = best.windows.len(), cost = ?best.cost, "selected");

        let plan = self.commit(&best.windows);
        Ok(SurplusTrim::builder()
            .surplus(plan.total_energy - energy_needed)
            .slot_energy(self.slot_energy)
            .slot_duration(price_slots[0].interval.duration())
            .capacity(self.capacity)
            .initial_soc(self.current_soc)
            .build()
            .apply(plan))
    }

    fn validate(&self) -> Result<(), InvalidConfiguration> {
        let battery_energy = self.slot_energy.battery;
        if !(battery_energy.is_finite() && battery_energy > KilowattHours::ZERO) {
            return Err(InvalidConfiguration::BatteryEnergyPerSlot(battery_energy));
        }
        let grid_energy = self.slot_energy.grid;
        if !(grid_energy.is_finite() && grid_energy >= KilowattHours::ZERO) {
            return Err(InvalidConfiguration::GridEnergyPerSlot(grid_energy));
        }
        if !(self.capacity.is_finite() && self.capacity > KilowattHours::ZERO) {
            return Err(InvalidConfiguration::Capacity(self.capacity));
        }
        if !(self.current_soc.is_finite() && self.target_soc.is_finite()) {
            return Err(InvalidConfiguration::StateOfCharge);
        }
        if self.min_slots_per_window == 0 {
            return Err(InvalidConfiguration::MinSlotsPerWindow);
        }
        if self.max_windows == 0 {
            return Err(InvalidConfiguration::MaxWindows);
        }
        Ok(())
    }

    /// Forecast cut off at the deadline.
    fn available_slots(&self) -> &[PriceSlot] {
        match self.complete_by {
            Some(complete_by) => {
                let end = self
                    .price_slots
                    .partition_point(|price_slot| price_slot.interval.start < complete_by);
                &self.price_slots[..end]
            }
            None => self.price_slots,
        }
    }

    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn n_slots_for(&self, energy: KilowattHours) -> usize {
        (energy / self.slot_energy.battery).ceil() as usize
    }

    /// Charge through the entire forecast since there is no room to choose.
    fn charge_everything(&self, price_slots: &[PriceSlot]) -> ChargePlan {
        if price_slots.is_empty() {
            return ChargePlan::empty(Outcome::InsufficientSlots);
        }
        let charge_slot =
            ChargeSlot::new(price_slots, self.slot_energy, self.capacity, self.current_soc);
        ChargePlan {
            outcome: Outcome::InsufficientSlots,
            total_energy: charge_slot.energy,
            total_cost: charge_slot.cost,
            charge_slots: vec![charge_slot],
        }
    }

    /// Turn the chronologically ordered windows into charge slots.
    fn commit(&self, windows: &[Window<'_>]) -> ChargePlan {
        let (charge_slots, (_, total_energy, total_cost)) = windows.iter().fold(
            (
                Vec::with_capacity(windows.len()),
                (self.current_soc, KilowattHours::ZERO, Cost::ZERO),
            ),
            |(mut charge_slots, (running_soc, total_energy, total_cost)), window| {
                let charge_slot =
                    ChargeSlot::new(window.slots, self.slot_energy, self.capacity, running_soc);
                let totals = (
                    running_soc + charge_slot.charge_delta,
                    total_energy + charge_slot.energy,
                    total_cost + charge_slot.cost,
                );
                charge_slots.push(charge_slot);
                (charge_slots, totals)
            },
        );
        ChargePlan { outcome: Outcome::Planned, charge_slots, total_energy, total_cost }
    }
}
