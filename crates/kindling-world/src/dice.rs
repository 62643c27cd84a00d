//! Seeded randomness helpers shared by events, traps, and mortality.
//!
//! Every roll goes through a caller-supplied [`Rng`], so a game seeded with
//! the same value replays the same outcomes.

use rand::Rng;
use rust_decimal::Decimal;

use kindling_ledger::{Quantity, quantity};

/// Resolution of chance rolls: probabilities are quantized to basis points.
const BASIS_POINTS: u32 = 10_000;

/// A weighted list of outcomes.
///
/// Weights are summed and a random value in `[0, total_weight)` selects the
/// entry whose cumulative weight first exceeds it. Zero-weight entries are
/// never chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightTable<T> {
    /// `(outcome, weight)` pairs in selection order.
    entries: Vec<(T, u32)>,
}

impl<T: Copy> WeightTable<T> {
    /// Build a table from `(outcome, weight)` pairs.
    pub const fn new(entries: Vec<(T, u32)>) -> Self {
        Self { entries }
    }

    /// The entries in selection order.
    pub fn entries(&self) -> &[(T, u32)] {
        &self.entries
    }

    /// Sum of all weights.
    pub fn total_weight(&self) -> u32 {
        self.entries
            .iter()
            .fold(0_u32, |total, &(_, weight)| total.saturating_add(weight))
    }

    /// Select the outcome for a roll in `[0, total_weight)`.
    pub fn select(&self, roll: u32) -> Option<T> {
        let mut cumulative: u32 = 0;
        for &(outcome, weight) in &self.entries {
            cumulative = cumulative.saturating_add(weight);
            if roll < cumulative {
                return Some(outcome);
            }
        }
        None
    }

    /// Roll the table. Returns `None` only when every weight is zero.
    pub fn roll(&self, rng: &mut impl Rng) -> Option<T> {
        let total = self.total_weight();
        if total == 0 {
            return None;
        }
        self.select(rng.random_range(0..total))
    }
}

/// Draw a whole percentage in `[min, max]` and return it as a fraction.
///
/// The bounds are swapped if given in the wrong order.
pub fn roll_percent(rng: &mut impl Rng, min: u32, max: u32) -> Quantity {
    let (low, high) = if min <= max { (min, max) } else { (max, min) };
    quantity::percent(rng.random_range(low..=high))
}

/// Draw a whole number in `[min, max]`.
pub fn roll_between(rng: &mut impl Rng, min: u32, max: u32) -> u32 {
    let (low, high) = if min <= max { (min, max) } else { (max, min) };
    rng.random_range(low..=high)
}

/// Succeed with the given probability, quantized to basis points.
///
/// Probabilities at or below zero never succeed; at or above one always do.
pub fn roll_chance(rng: &mut impl Rng, probability: Quantity) -> bool {
    if probability <= Decimal::ZERO {
        return false;
    }
    if probability >= Decimal::ONE {
        return true;
    }
    let threshold = quantity::floor_count(probability.saturating_mul(Decimal::from(BASIS_POINTS)));
    rng.random_range(0..BASIS_POINTS) < threshold
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rust_decimal_macros::dec;

    #[test]
    fn select_walks_cumulative_weights() {
        let table = WeightTable::new(vec![('a', 50), ('b', 0), ('c', 30)]);
        assert_eq!(table.total_weight(), 80);
        assert_eq!(table.select(0), Some('a'));
        assert_eq!(table.select(49), Some('a'));
        assert_eq!(table.select(50), Some('c'));
        assert_eq!(table.select(79), Some('c'));
        assert_eq!(table.select(80), None);
    }

    #[test]
    fn empty_table_never_rolls() {
        let table: WeightTable<u8> = WeightTable::new(vec![(1, 0)]);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(table.roll(&mut rng), None);
    }

    #[test]
    fn percent_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let pct = roll_percent(&mut rng, 10, 30);
            assert!(pct >= dec!(0.10) && pct <= dec!(0.30), "{pct}");
        }
        assert_eq!(roll_percent(&mut rng, 5, 5), dec!(0.05));
        let swapped = roll_percent(&mut rng, 15, 5);
        assert!(swapped >= dec!(0.05) && swapped <= dec!(0.15));
    }

    #[test]
    fn chance_edges_are_certain() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(!roll_chance(&mut rng, Decimal::ZERO));
        assert!(roll_chance(&mut rng, Decimal::ONE));
    }

    #[test]
    fn same_seed_same_rolls() {
        let table = WeightTable::new(vec![(0_u8, 1), (1, 1), (2, 1)]);
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        let left: Vec<_> = (0..20).map(|_| table.roll(&mut a)).collect();
        let right: Vec<_> = (0..20).map(|_| table.roll(&mut b)).collect();
        assert_eq!(left, right);
    }
}
