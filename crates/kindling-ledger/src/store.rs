//! The resource store: keyed quantities with per-key storage caps.
//!
//! # Invariant
//!
//! After every mutation, `0 <= amount <= cap` holds for every resource.
//! Additions beyond the cap are discarded, not carried over; removals
//! below zero stop at zero. No operation on the store can fail, which is
//! why purchases check [`ResourceStore::can_afford`] before deducting.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kindling_types::ResourceKind;

use crate::quantity::{Quantity, non_negative};

/// A bundle of resource amounts: a price, a yield, or a batch transfer.
pub type CostMap = BTreeMap<ResourceKind, Quantity>;

/// The maximum amount a resource may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageCap {
    /// Amounts above this value are discarded.
    Limited(Quantity),
    /// No ceiling.
    Unlimited,
}

impl StorageCap {
    /// Clamp an amount into `[0, cap]`.
    pub fn clamp(self, amount: Quantity) -> Quantity {
        let floored = non_negative(amount);
        match self {
            Self::Limited(cap) => floored.min(non_negative(cap)),
            Self::Unlimited => floored,
        }
    }

    /// The cap as an optional ceiling (`None` for unlimited).
    pub const fn limit(self) -> Option<Quantity> {
        match self {
            Self::Limited(cap) => Some(cap),
            Self::Unlimited => None,
        }
    }
}

/// Keyed resource quantities with clamped mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceStore {
    /// Current amount per resource.
    amounts: BTreeMap<ResourceKind, Quantity>,
    /// Storage cap per resource.
    caps: BTreeMap<ResourceKind, StorageCap>,
}

impl ResourceStore {
    /// Create an empty store with the given caps.
    ///
    /// Every resource kind gets an entry; kinds missing from `caps` are
    /// unlimited.
    pub fn new(caps: &BTreeMap<ResourceKind, StorageCap>) -> Self {
        let mut store = Self {
            amounts: BTreeMap::new(),
            caps: BTreeMap::new(),
        };
        for kind in ResourceKind::ALL {
            store.amounts.insert(kind, Decimal::ZERO);
            store
                .caps
                .insert(kind, caps.get(&kind).copied().unwrap_or(StorageCap::Unlimited));
        }
        store
    }

    /// Current amount of a resource.
    pub fn amount(&self, kind: ResourceKind) -> Quantity {
        self.amounts.get(&kind).copied().unwrap_or(Decimal::ZERO)
    }

    /// Storage cap of a resource.
    pub fn cap(&self, kind: ResourceKind) -> StorageCap {
        self.caps.get(&kind).copied().unwrap_or(StorageCap::Unlimited)
    }

    /// Whether the resource has reached its cap.
    pub fn is_full(&self, kind: ResourceKind) -> bool {
        self.cap(kind).limit().is_some_and(|cap| self.amount(kind) >= cap)
    }

    /// All amounts, keyed by resource.
    pub const fn amounts(&self) -> &BTreeMap<ResourceKind, Quantity> {
        &self.amounts
    }

    /// All caps, keyed by resource.
    pub const fn caps(&self) -> &BTreeMap<ResourceKind, StorageCap> {
        &self.caps
    }

    /// Overwrite an amount, clamped to `[0, cap]`.
    pub fn set(&mut self, kind: ResourceKind, amount: Quantity) {
        let clamped = self.cap(kind).clamp(amount);
        self.amounts.insert(kind, clamped);
    }

    /// Add to a resource, discarding anything above the cap.
    ///
    /// Negative amounts are ignored. Returns the amount actually stored.
    pub fn add(&mut self, kind: ResourceKind, amount: Quantity) -> Quantity {
        let amount = non_negative(amount);
        let before = self.amount(kind);
        self.set(kind, before.saturating_add(amount));
        self.amount(kind).saturating_sub(before)
    }

    /// Remove from a resource, stopping at zero.
    ///
    /// Negative amounts are ignored. Returns the amount actually removed.
    pub fn remove(&mut self, kind: ResourceKind, amount: Quantity) -> Quantity {
        let amount = non_negative(amount);
        let before = self.amount(kind);
        self.set(kind, before.saturating_sub(amount));
        before.saturating_sub(self.amount(kind))
    }

    /// Add every entry of a batch.
    pub fn add_many(&mut self, batch: &CostMap) {
        for (kind, amount) in batch {
            self.add(*kind, *amount);
        }
    }

    /// Remove every entry of a batch.
    pub fn remove_many(&mut self, batch: &CostMap) {
        for (kind, amount) in batch {
            self.remove(*kind, *amount);
        }
    }

    /// Whether every entry of `cost` is covered by current stores.
    pub fn can_afford(&self, cost: &CostMap) -> bool {
        cost.iter().all(|(kind, amount)| self.amount(*kind) >= *amount)
    }

    /// Deduct `cost` if it is fully affordable.
    ///
    /// Returns `false` and leaves the store untouched otherwise, so no
    /// purchase is ever partially paid.
    pub fn try_spend(&mut self, cost: &CostMap) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.remove_many(cost);
        true
    }

    /// Replace the cap of a resource and re-clamp its amount.
    pub fn set_cap(&mut self, kind: ResourceKind, cap: StorageCap) {
        self.caps.insert(kind, cap);
        let amount = self.amount(kind);
        self.set(kind, amount);
    }

    /// Recompute caps as `base + bonus` for every limited resource.
    ///
    /// Unlimited base caps stay unlimited regardless of bonuses.
    pub fn recompute_caps(
        &mut self,
        base: &BTreeMap<ResourceKind, StorageCap>,
        bonuses: &CostMap,
    ) {
        for kind in ResourceKind::ALL {
            let cap = match base.get(&kind).copied().unwrap_or(StorageCap::Unlimited) {
                StorageCap::Limited(base_cap) => {
                    let bonus = bonuses.get(&kind).copied().unwrap_or(Decimal::ZERO);
                    StorageCap::Limited(base_cap.saturating_add(bonus))
                }
                StorageCap::Unlimited => StorageCap::Unlimited,
            };
            self.set_cap(kind, cap);
        }
        tracing::debug!(kinds = ResourceKind::ALL.len(), "Storage caps recomputed");
    }

    /// Re-apply every cap to the stored amounts.
    ///
    /// Used after rehydrating a saved document, whose amounts were written
    /// by a possibly different build.
    pub fn reclamp(&mut self) {
        for kind in ResourceKind::ALL {
            let amount = self.amount(kind);
            self.set(kind, amount);
        }
    }

    /// Per-resource change from `earlier` to `self`, omitting unchanged kinds.
    pub fn delta_since(&self, earlier: &Self) -> BTreeMap<ResourceKind, Decimal> {
        ResourceKind::ALL
            .iter()
            .filter_map(|kind| {
                let change = self.amount(*kind).saturating_sub(earlier.amount(*kind));
                (!change.is_zero()).then_some((*kind, change))
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn caps() -> BTreeMap<ResourceKind, StorageCap> {
        BTreeMap::from([
            (ResourceKind::Food, StorageCap::Limited(dec!(100))),
            (ResourceKind::Wood, StorageCap::Limited(dec!(50))),
            (ResourceKind::Ideas, StorageCap::Unlimited),
        ])
    }

    #[test]
    fn new_store_is_empty_with_every_kind() {
        let store = ResourceStore::new(&caps());
        assert_eq!(store.amounts().len(), ResourceKind::ALL.len());
        assert_eq!(store.amount(ResourceKind::Food), Decimal::ZERO);
        assert_eq!(store.cap(ResourceKind::Stone), StorageCap::Unlimited);
    }

    #[test]
    fn add_discards_overflow() {
        let mut store = ResourceStore::new(&caps());
        assert_eq!(store.add(ResourceKind::Wood, dec!(40)), dec!(40));
        assert_eq!(store.add(ResourceKind::Wood, dec!(40)), dec!(10));
        assert_eq!(store.amount(ResourceKind::Wood), dec!(50));
        assert!(store.is_full(ResourceKind::Wood));
    }

    #[test]
    fn remove_stops_at_zero() {
        let mut store = ResourceStore::new(&caps());
        store.add(ResourceKind::Food, dec!(5));
        assert_eq!(store.remove(ResourceKind::Food, dec!(8)), dec!(5));
        assert_eq!(store.amount(ResourceKind::Food), Decimal::ZERO);
    }

    #[test]
    fn negative_amounts_are_ignored() {
        let mut store = ResourceStore::new(&caps());
        store.add(ResourceKind::Food, dec!(5));
        assert_eq!(store.add(ResourceKind::Food, dec!(-3)), Decimal::ZERO);
        assert_eq!(store.remove(ResourceKind::Food, dec!(-3)), Decimal::ZERO);
        assert_eq!(store.amount(ResourceKind::Food), dec!(5));
    }

    #[test]
    fn unlimited_resources_grow_freely() {
        let mut store = ResourceStore::new(&caps());
        store.add(ResourceKind::Ideas, dec!(1000000));
        assert_eq!(store.amount(ResourceKind::Ideas), dec!(1000000));
        assert!(!store.is_full(ResourceKind::Ideas));
    }

    #[test]
    fn try_spend_is_all_or_nothing() {
        let mut store = ResourceStore::new(&caps());
        store.add(ResourceKind::Food, dec!(10));
        store.add(ResourceKind::Wood, dec!(3));
        let cost = CostMap::from([
            (ResourceKind::Food, dec!(5)),
            (ResourceKind::Wood, dec!(5)),
        ]);
        assert!(!store.try_spend(&cost));
        assert_eq!(store.amount(ResourceKind::Food), dec!(10));

        store.add(ResourceKind::Wood, dec!(2));
        assert!(store.try_spend(&cost));
        assert_eq!(store.amount(ResourceKind::Food), dec!(5));
        assert_eq!(store.amount(ResourceKind::Wood), Decimal::ZERO);
    }

    #[test]
    fn lowering_a_cap_discards_the_excess() {
        let mut store = ResourceStore::new(&caps());
        store.add(ResourceKind::Food, dec!(90));
        store.set_cap(ResourceKind::Food, StorageCap::Limited(dec!(60)));
        assert_eq!(store.amount(ResourceKind::Food), dec!(60));
    }

    #[test]
    fn recompute_caps_adds_bonuses_to_limited_caps_only() {
        let mut store = ResourceStore::new(&caps());
        let bonuses = CostMap::from([
            (ResourceKind::Wood, dec!(100)),
            (ResourceKind::Ideas, dec!(100)),
        ]);
        store.recompute_caps(&caps(), &bonuses);
        assert_eq!(store.cap(ResourceKind::Wood), StorageCap::Limited(dec!(150)));
        assert_eq!(store.cap(ResourceKind::Food), StorageCap::Limited(dec!(100)));
        assert_eq!(store.cap(ResourceKind::Ideas), StorageCap::Unlimited);
    }

    #[test]
    fn delta_since_reports_changes() {
        let before = ResourceStore::new(&caps());
        let mut after = before.clone();
        after.add(ResourceKind::Food, dec!(2.5));
        let delta = after.delta_since(&before);
        assert_eq!(delta.len(), 1);
        assert_eq!(delta.get(&ResourceKind::Food).copied(), Some(dec!(2.5)));
    }

    #[test]
    fn serializes_quantities_as_strings() {
        let mut store = ResourceStore::new(&caps());
        store.add(ResourceKind::Food, dec!(33.333333333333333333));
        let json = serde_json::to_value(&store).unwrap();
        assert_eq!(json["amounts"]["Food"], "33.333333333333333333");
        let back: ResourceStore = serde_json::from_value(json).unwrap();
        assert_eq!(back, store);
    }
}
