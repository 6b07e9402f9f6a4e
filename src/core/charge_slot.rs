use serde::Serialize;

use crate::{
    core::{interval::Interval, price_slot::PriceSlot},
    quantity::{
        cost::Cost,
        energy::KilowattHours,
        percent::Percent,
        rate::KilowattHourRate,
    },
};

/// Energy moved in one price slot.
#[derive(Copy, Clone, Debug)]
pub struct SlotEnergy {
    /// Drawn from the grid, this is what gets paid for.
    pub grid: KilowattHours,

    /// Stored in the battery.
    pub battery: KilowattHours,
}

/// Committed charging interval.
#[derive(Clone, Debug, Serialize)]
pub struct ChargeSlot {
    #[serde(flatten)]
    pub interval: Interval,

    pub average_rate: KilowattHourRate,
    pub energy: KilowattHours,
    pub cost: Cost,
    pub price_slots: Vec<PriceSlot>,

    /// Projected state of charge after the interval, rounded to a whole percent.
    pub charge: Percent,

    /// State of charge gained during the interval.
    pub charge_delta: Percent,
}

impl ChargeSlot {
    /// Charge through all the price slots, starting at the specified state of charge.
    ///
    /// The slots are expected to be non-empty and ordered.
    #[expect(clippy::cast_precision_loss)]
    pub fn new(
        price_slots: &[PriceSlot],
        slot_energy: SlotEnergy,
        capacity: KilowattHours,
        soc_before: Percent,
    ) -> Self {
        let n_slots = price_slots.len() as f64;
        let energy = slot_energy.battery * n_slots;
        let charge_delta = energy.percent_of(capacity);
        Self {
            interval: Interval::new(
                price_slots[0].interval.start,
                price_slots[price_slots.len() - 1].interval.end,
            ),
            average_rate: price_slots.iter().map(|slot| slot.rate).sum::<KilowattHourRate>()
                / n_slots,
            energy,
            cost: price_slots.iter().map(|slot| slot.cost(slot_energy.grid)).sum(),
            price_slots: price_slots.to_vec(),
            charge: (soc_before + charge_delta).round(),
            charge_delta,
        }
    }

    /// Recalculate the state of charge after the energy has changed.
    pub fn rebase(&mut self, capacity: KilowattHours, soc_before: Percent) {
        self.charge_delta = self.energy.percent_of(capacity);
        self.charge = (soc_before + self.charge_delta).round();
    }

    pub fn leading_slot(&self) -> &PriceSlot {
        &self.price_slots[0]
    }

    pub fn trailing_slot(&self) -> &PriceSlot {
        &self.price_slots[self.price_slots.len() - 1]
    }
}
