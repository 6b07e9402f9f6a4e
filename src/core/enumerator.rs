use std::collections::BTreeSet;

use bon::Builder;

use crate::{
    core::{
        price_slot::PriceSlot,
        window::{Window, WindowFinder},
    },
    prelude::*,
    quantity::{cost::Cost, energy::KilowattHours},
};

/// Complete set of non-overlapping windows for one split count.
#[derive(Clone, Debug)]
pub struct Candidate<'a> {
    pub cost: Cost,

    /// Chronologically ordered windows.
    pub windows: Vec<Window<'a>>,
}

/// Builds one candidate per feasible split count.
#[derive(Builder)]
pub struct Enumerator<'a> {
    slots: &'a [PriceSlot],
    n_slots_to_charge: usize,
    max_windows: usize,
    min_slots_per_window: usize,

    /// Energy paid for in each slot.
    energy_per_slot: KilowattHours,
}

impl<'a> Enumerator<'a> {
    #[instrument(
        name = "Enumerating…",
        skip_all,
        fields(n_slots_to_charge = self.n_slots_to_charge, max_windows = self.max_windows),
    )]
    pub fn enumerate(&self) -> Vec<Candidate<'a>> {
        let finder = WindowFinder::builder()
            .slots(self.slots)
            .energy_per_slot(self.energy_per_slot)
            .build();
        (1..=self.n_slots_to_charge.min(self.max_windows))
            .filter_map(|n_windows| self.try_split(finder, n_windows))
            .collect()
    }

    /// Greedily place the blocks for the split count, the longest first.
    fn try_split(&self, finder: WindowFinder<'a>, n_windows: usize) -> Option<Candidate<'a>> {
        let Some(block_lengths) =
            block_lengths(self.n_slots_to_charge, n_windows, self.min_slots_per_window)
        else {
            trace!(n_windows, "the windows would be too long");
            return None;
        };

        let mut excluded = BTreeSet::new();
        let mut windows = Vec::with_capacity(n_windows);
        for n_slots in block_lengths {
            let Some(window) = finder.find(n_slots, &excluded) else {
                trace!(n_windows, n_slots, "no room left for the window");
                return None;
            };
            excluded.extend(window.indices());
            windows.push(window);
        }

        let cost = windows.iter().map(|window| window.cost).sum();
        windows.sort_by_key(|window| window.start_index);
        trace!(n_windows, cost = ?cost, "found a candidate");
        Some(Candidate { cost, windows })
    }
}

/// Split the slots into the specified number of blocks, as balanced as possible.
///
/// Every block gets the minimal length, and the rest is dealt out one slot at a time,
/// starting from the first block.
///
/// # Returns
///
/// [`None`] if the minimal lengths alone exceed the total.
pub fn block_lengths(
    n_slots: usize,
    n_blocks: usize,
    min_slots_per_block: usize,
) -> Option<Vec<usize>> {
    let remainder = n_slots.checked_sub(min_slots_per_block.checked_mul(n_blocks)?)?;
    let (quotient, modulo) = (remainder / n_blocks, remainder % n_blocks);
    Some(
        (0..n_blocks)
            .map(|index| min_slots_per_block + quotient + usize::from(index < modulo))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::core::testing::{quarter_hour_slots, slot_end, slot_start};

    fn enumerate(
        slots: &[PriceSlot],
        n_slots_to_charge: usize,
        max_windows: usize,
        min_slots_per_window: usize,
    ) -> Vec<Candidate<'_>> {
        Enumerator::builder()
            .slots(slots)
            .n_slots_to_charge(n_slots_to_charge)
            .max_windows(max_windows)
            .min_slots_per_window(min_slots_per_window)
            .energy_per_slot(KilowattHours::from(1.0))
            .build()
            .enumerate()
    }

    fn cheapest<'a, 'c>(candidates: &'c [Candidate<'a>]) -> &'c Candidate<'a> {
        candidates
            .iter()
            .min_by_key(|candidate| ordered_float::OrderedFloat(candidate.cost.0))
            .unwrap()
    }

    #[test]
    fn test_block_lengths_even() {
        assert_eq!(block_lengths(6, 3, 1), Some(vec![2, 2, 2]));
    }

    #[test]
    fn test_block_lengths_remainder_goes_first() {
        assert_eq!(block_lengths(7, 3, 1), Some(vec![3, 2, 2]));
        assert_eq!(block_lengths(8, 3, 2), Some(vec![3, 3, 2]));
    }

    #[test]
    fn test_block_lengths_too_short() {
        assert_eq!(block_lengths(3, 2, 2), None);
    }

    #[test]
    fn test_split_beats_single_window() {
        let slots = quarter_hour_slots(&[1.1, 1.2, 3.5, 1.3, 1.2, 1.1, 2.4]);
        let candidates = enumerate(&slots, 4, 2, 1);
        assert_eq!(candidates.len(), 2);

        let best = cheapest(&candidates);
        assert_eq!(best.windows.len(), 2);
        assert_eq!(best.windows[0].slots[0].interval.start, slot_start(1));
        assert_eq!(best.windows[0].slots[1].interval.end, slot_end(2));
        assert_eq!(best.windows[1].slots[0].interval.start, slot_start(5));
        assert_eq!(best.windows[1].slots[1].interval.end, slot_end(6));
    }

    #[test]
    fn test_split_with_cheapest_range_at_the_end() {
        let slots = quarter_hour_slots(&[1.5, 1.3, 1.2, 5.0, 1.3, 1.2, 1.1]);
        let candidates = enumerate(&slots, 4, 2, 1);

        let best = cheapest(&candidates);
        assert_eq!(best.windows.len(), 2);
        assert_eq!(best.windows[0].slots[0].interval.start, slot_start(2));
        assert_eq!(best.windows[0].slots[1].interval.end, slot_end(3));
        assert_eq!(best.windows[1].slots[0].interval.start, slot_start(6));
        assert_eq!(best.windows[1].slots[1].interval.end, slot_end(7));
    }

    #[test]
    fn test_uniform_prices_give_no_benefit() {
        let slots = quarter_hour_slots(&[2.0, 2.0, 2.0, 2.0]);
        let candidates = enumerate(&slots, 4, 2, 2);
        assert_eq!(candidates.len(), 2);
        assert_abs_diff_eq!(candidates[0].cost.0, 8.0, epsilon = 1e-9);
        assert_abs_diff_eq!(candidates[1].cost.0, 8.0, epsilon = 1e-9);
        assert_eq!(candidates[0].windows.len(), 1);
    }

    #[test]
    fn test_windows_never_overlap() {
        let slots = quarter_hour_slots(&[3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0, 5.0, 3.0]);
        for candidate in enumerate(&slots, 5, 3, 1) {
            let mut covered = BTreeSet::new();
            for window in &candidate.windows {
                for index in window.indices() {
                    assert!(covered.insert(index), "slot {index} is used twice");
                }
            }
            assert_eq!(covered.len(), 5);
            assert!(candidate.windows.is_sorted_by_key(|window| window.start_index));
        }
    }

    #[test]
    fn test_split_count_is_capped_by_slots() {
        let slots = quarter_hour_slots(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(enumerate(&slots, 2, 5, 1).len(), 2);
    }

    #[test]
    fn test_too_long_blocks_are_discarded() {
        // Two windows of at least two slots do not fit into three slots:
        let slots = quarter_hour_slots(&[1.0, 2.0, 3.0]);
        let candidates = enumerate(&slots, 3, 3, 2);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].windows.len(), 1);
    }

    #[test]
    fn test_fragmented_split_is_discarded() {
        // The cheapest pair in the middle leaves two separate slots behind:
        let slots = quarter_hour_slots(&[9.0, 1.0, 1.0, 9.0]);
        let candidates = enumerate(&slots, 4, 2, 1);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].windows.len(), 1);
        assert_abs_diff_eq!(candidates[0].cost.0, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_no_candidates() {
        let slots = quarter_hour_slots(&[1.0, 2.0]);
        assert!(enumerate(&slots, 3, 2, 1).is_empty());
    }
}
