use serde::Serialize;

use crate::{
    core::interval::Interval,
    quantity::{cost::Cost, energy::KilowattHours, rate::KilowattHourRate},
};

/// Single forecast interval with its energy price.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, derive_more::Constructor)]
pub struct PriceSlot {
    #[serde(flatten)]
    pub interval: Interval,

    pub rate: KilowattHourRate,
}

impl PriceSlot {
    /// Whether the next slot starts exactly where this one ends.
    pub fn is_followed_by(&self, next: &Self) -> bool {
        self.interval.end == next.interval.start
    }

    pub fn cost(&self, energy: KilowattHours) -> Cost {
        energy * self.rate
    }
}
