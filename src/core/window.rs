use std::{collections::BTreeSet, ops::Range};

use bon::Builder;
use itertools::Itertools;
use ordered_float::OrderedFloat;

use crate::{
    core::price_slot::PriceSlot,
    quantity::{cost::Cost, energy::KilowattHours},
};

/// Non-empty, temporally contiguous run of price slots.
///
/// The window remembers where it starts in the forecast, so that the callers never need
/// to look the slots up again.
#[derive(Copy, Clone, Debug)]
pub struct Window<'a> {
    /// Index of the first slot in the forecast.
    pub start_index: usize,

    pub slots: &'a [PriceSlot],

    /// Total cost at the finder's energy per slot.
    pub cost: Cost,
}

impl Window<'_> {
    /// Forecast indices covered by the window.
    pub const fn indices(&self) -> Range<usize> {
        self.start_index..(self.start_index + self.slots.len())
    }
}

/// Finds the cheapest contiguous window of a given length.
#[derive(Copy, Clone, Builder)]
pub struct WindowFinder<'a> {
    slots: &'a [PriceSlot],

    /// Energy paid for in each slot.
    energy_per_slot: KilowattHours,
}

impl<'a> WindowFinder<'a> {
    /// Find the cheapest valid window of exactly `n_slots` slots.
    ///
    /// A window is valid when none of its slots is excluded and it has no gaps in time.
    /// The earliest window wins a tie.
    pub fn find(&self, n_slots: usize, excluded: &BTreeSet<usize>) -> Option<Window<'a>> {
        if n_slots == 0 {
            return None;
        }
        let last_start_index = self.slots.len().checked_sub(n_slots)?;
        (0..=last_start_index)
            .filter(|start_index| self.is_valid(*start_index, n_slots, excluded))
            .map(|start_index| self.window_at(start_index, n_slots))
            .min_by_key(|window| OrderedFloat(window.cost.0))
    }

    fn is_valid(&self, start_index: usize, n_slots: usize, excluded: &BTreeSet<usize>) -> bool {
        let indices = start_index..(start_index + n_slots);
        excluded.range(indices.clone()).next().is_none()
            && self.slots[indices].iter().tuple_windows().all(|(lhs, rhs)| lhs.is_followed_by(rhs))
    }

    fn window_at(&self, start_index: usize, n_slots: usize) -> Window<'a> {
        let slots = &self.slots[start_index..(start_index + n_slots)];
        let cost = slots.iter().map(|slot| slot.cost(self.energy_per_slot)).sum();
        Window { start_index, slots, cost }
    }
}
