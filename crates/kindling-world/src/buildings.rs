//! Building blueprints and the per-kind count registry.
//!
//! - [`blueprint`] returns the static blueprint for each [`BuildingKind`]
//! - [`BuildingRegistry::cost`] prices the next unit as
//!   `base_cost * cost_multiplier ^ count`, per resource
//! - [`BuildingRegistry::try_build`] deducts the price atomically and bumps
//!   the count; refused builds leave every store untouched
//! - aggregate bonuses (storage caps, population cap, happiness, tax) are
//!   derived from counts on demand, never cached
//!
//! Counts only increase; nothing is ever demolished.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kindling_ledger::{CostMap, Quantity, ResourceStore, StorageCap, quantity};
use kindling_types::{BuildingCategory, BuildingKind, Effect, Era, ResourceKind, TechKind};

/// Static definition of a building kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blueprint {
    /// The kind this blueprint describes.
    pub kind: BuildingKind,
    /// Broad category; [`BuildingCategory::Wonder`] is capped at one unit.
    pub category: BuildingCategory,
    /// Earliest era the building can be raised in.
    pub era: Era,
    /// Price of the first unit.
    pub base_cost: CostMap,
    /// Growth factor applied per unit already built.
    pub cost_multiplier: Decimal,
    /// Technology that must be researched first, if any.
    pub required_tech: Option<TechKind>,
    /// Effects granted per unit built.
    pub effects: Vec<Effect>,
}

impl Blueprint {
    /// Whether this is a one-off wonder.
    pub fn is_wonder(&self) -> bool {
        self.category == BuildingCategory::Wonder
    }
}

fn cost(entries: &[(ResourceKind, i64)]) -> CostMap {
    entries
        .iter()
        .map(|&(kind, amount)| (kind, Decimal::from(amount)))
        .collect()
}

/// Return the canonical blueprint for a [`BuildingKind`].
#[allow(clippy::too_many_lines)] // One arm per kind; splitting would scatter the table.
pub fn blueprint(kind: BuildingKind) -> Blueprint {
    use ResourceKind::{Culture, Gold, Grain, Meat, Planks, Skins, Stone, Tools, Wood};

    let (category, era, base_cost, cost_multiplier, required_tech, effects) = match kind {
        // ---- Tribal ----
        BuildingKind::Hut => (
            BuildingCategory::Housing,
            Era::Tribal,
            cost(&[(Wood, 20)]),
            Decimal::new(115, 2),
            None,
            vec![Effect::PopulationBonus(Decimal::TWO)],
        ),
        BuildingKind::Storehouse => (
            BuildingCategory::Storage,
            Era::Tribal,
            cost(&[(Wood, 30), (Stone, 10)]),
            Decimal::new(12, 1),
            None,
            vec![
                Effect::StorageBonus { resource: Wood, amount: Decimal::new(50, 0) },
                Effect::StorageBonus { resource: Stone, amount: Decimal::new(50, 0) },
                Effect::StorageBonus { resource: Skins, amount: Decimal::new(25, 0) },
            ],
        ),
        BuildingKind::Granary => (
            BuildingCategory::Storage,
            Era::Tribal,
            cost(&[(Wood, 40), (Stone, 20)]),
            Decimal::new(12, 1),
            None,
            vec![
                Effect::StorageBonus { resource: ResourceKind::Food, amount: Decimal::ONE_HUNDRED },
                Effect::StorageBonus { resource: Meat, amount: Decimal::new(25, 0) },
                Effect::StorageBonus { resource: ResourceKind::CuredMeat, amount: Decimal::new(25, 0) },
            ],
        ),
        BuildingKind::Trap => (
            BuildingCategory::Production,
            Era::Tribal,
            cost(&[(Wood, 15)]),
            Decimal::new(11, 1),
            Some(TechKind::Trapping),
            vec![Effect::TrapCatch],
        ),
        BuildingKind::Smokehouse => (
            BuildingCategory::Production,
            Era::Tribal,
            cost(&[(Wood, 40), (Stone, 15)]),
            Decimal::new(125, 2),
            Some(TechKind::Smoking),
            vec![Effect::Conversion {
                input: Meat,
                input_per_tick: Decimal::new(2, 2),
                output: ResourceKind::CuredMeat,
                output_per_tick: Decimal::new(1, 2),
            }],
        ),
        BuildingKind::Shrine => (
            BuildingCategory::Civic,
            Era::Tribal,
            cost(&[(Stone, 40), (Wood, 20)]),
            Decimal::new(13, 1),
            Some(TechKind::Storytelling),
            vec![Effect::Passive { resource: Culture, per_tick: Decimal::new(5, 3) }],
        ),
        BuildingKind::BurialMound => (
            BuildingCategory::Civic,
            Era::Tribal,
            cost(&[(Stone, 60)]),
            Decimal::new(14, 1),
            Some(TechKind::Rituals),
            vec![Effect::MortalityConversion { culture_per_death: Decimal::new(5, 0) }],
        ),
        BuildingKind::Monolith => (
            BuildingCategory::Wonder,
            Era::Tribal,
            cost(&[(Stone, 150), (Wood, 150), (Culture, 50)]),
            Decimal::TWO,
            Some(TechKind::Monuments),
            Vec::new(),
        ),

        // ---- Kingdom ----
        BuildingKind::House => (
            BuildingCategory::Housing,
            Era::Kingdom,
            cost(&[(Planks, 10), (Stone, 10)]),
            Decimal::new(115, 2),
            None,
            vec![Effect::PopulationBonus(Decimal::new(4, 0))],
        ),
        BuildingKind::Farm => (
            BuildingCategory::Production,
            Era::Kingdom,
            cost(&[(Wood, 30)]),
            Decimal::new(115, 2),
            None,
            vec![Effect::Passive { resource: Grain, per_tick: Decimal::new(2, 2) }],
        ),
        BuildingKind::Bakery => (
            BuildingCategory::Production,
            Era::Kingdom,
            cost(&[(Planks, 20), (Stone, 20)]),
            Decimal::new(12, 1),
            Some(TechKind::Milling),
            vec![Effect::Conversion {
                input: Grain,
                input_per_tick: Decimal::new(2, 2),
                output: ResourceKind::Bread,
                output_per_tick: Decimal::new(2, 2),
            }],
        ),
        BuildingKind::Sawmill => (
            BuildingCategory::Production,
            Era::Kingdom,
            cost(&[(Stone, 40), (Wood, 40)]),
            Decimal::new(12, 1),
            None,
            vec![Effect::Conversion {
                input: Wood,
                input_per_tick: Decimal::new(2, 2),
                output: Planks,
                output_per_tick: Decimal::new(2, 2),
            }],
        ),
        BuildingKind::Smithy => (
            BuildingCategory::Production,
            Era::Kingdom,
            cost(&[(Planks, 30), (Stone, 30)]),
            Decimal::new(125, 2),
            Some(TechKind::Metallurgy),
            vec![Effect::Conversion {
                input: Stone,
                input_per_tick: Decimal::new(2, 2),
                output: Tools,
                output_per_tick: Decimal::new(1, 2),
            }],
        ),
        BuildingKind::Warehouse => (
            BuildingCategory::Storage,
            Era::Kingdom,
            cost(&[(Planks, 30), (Stone, 30)]),
            Decimal::new(12, 1),
            None,
            vec![
                Effect::StorageBonus { resource: Grain, amount: Decimal::ONE_HUNDRED },
                Effect::StorageBonus { resource: ResourceKind::Bread, amount: Decimal::ONE_HUNDRED },
                Effect::StorageBonus { resource: Planks, amount: Decimal::ONE_HUNDRED },
                Effect::StorageBonus { resource: Tools, amount: Decimal::new(50, 0) },
                Effect::StorageBonus { resource: Gold, amount: Decimal::new(200, 0) },
            ],
        ),
        BuildingKind::Market => (
            BuildingCategory::Civic,
            Era::Kingdom,
            cost(&[(Planks, 40), (Gold, 50)]),
            Decimal::new(13, 1),
            Some(TechKind::Currency),
            vec![Effect::TaxBonus(Decimal::new(1, 1))],
        ),
        BuildingKind::Tavern => (
            BuildingCategory::Civic,
            Era::Kingdom,
            cost(&[(Planks, 30), (Gold, 30)]),
            Decimal::new(13, 1),
            None,
            vec![Effect::HappinessBonus(Decimal::new(3, 0))],
        ),
        BuildingKind::GreatHall => (
            BuildingCategory::Wonder,
            Era::Kingdom,
            cost(&[(Planks, 200), (Stone, 200), (Gold, 150), (Tools, 20)]),
            Decimal::TWO,
            Some(TechKind::Architecture),
            Vec::new(),
        ),
    };

    Blueprint {
        kind,
        category,
        era,
        base_cost,
        cost_multiplier,
        required_tech,
        effects,
    }
}

/// A completed construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    /// What was built.
    pub kind: BuildingKind,
    /// Units of this kind after the build.
    pub count: u32,
    /// Resources deducted.
    pub paid: CostMap,
    /// Whether this build completed the current era.
    pub completes_era: bool,
}

/// Why a build was refused. Never surfaced as an error; used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildRefusal {
    /// A wonder that already stands.
    WonderAlreadyBuilt,
    /// The building belongs to a later era.
    WrongEra,
    /// The required technology is not researched.
    Locked,
    /// Stores do not cover the price.
    Unaffordable,
}

/// Number of units built per [`BuildingKind`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingRegistry {
    /// Units built per kind. Kinds never built may be absent.
    counts: BTreeMap<BuildingKind, u32>,
}

impl BuildingRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Units built of a kind.
    pub fn count(&self, kind: BuildingKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Every kind with at least one unit, in enum order.
    pub fn counts(&self) -> BTreeMap<BuildingKind, u32> {
        self.counts
            .iter()
            .filter(|&(_, &count)| count > 0)
            .map(|(&kind, &count)| (kind, count))
            .collect()
    }

    /// Price of the next unit: `base_cost * cost_multiplier ^ count`.
    pub fn cost(&self, kind: BuildingKind) -> CostMap {
        let print = blueprint(kind);
        let factor = quantity::pow(print.cost_multiplier, self.count(kind));
        print
            .base_cost
            .into_iter()
            .map(|(resource, amount)| (resource, amount.saturating_mul(factor)))
            .collect()
    }

    /// Check every precondition for building one more unit.
    ///
    /// `unlocked` reports whether the blueprint's required technology, if
    /// any, has been researched.
    pub fn check_build(
        &self,
        kind: BuildingKind,
        store: &ResourceStore,
        era: Era,
        unlocked: bool,
    ) -> Result<CostMap, BuildRefusal> {
        let print = blueprint(kind);
        if print.is_wonder() && self.count(kind) >= 1 {
            return Err(BuildRefusal::WonderAlreadyBuilt);
        }
        if print.era > era {
            return Err(BuildRefusal::WrongEra);
        }
        if !unlocked {
            return Err(BuildRefusal::Locked);
        }
        let price = self.cost(kind);
        if !store.can_afford(&price) {
            return Err(BuildRefusal::Unaffordable);
        }
        Ok(price)
    }

    /// Build one unit if every precondition holds.
    ///
    /// Deducts the price and increments the count together. The caller is
    /// responsible for refreshing storage caps afterwards (see
    /// [`BuildingRegistry::refresh_caps`]).
    pub fn try_build(
        &mut self,
        kind: BuildingKind,
        store: &mut ResourceStore,
        era: Era,
        unlocked: bool,
    ) -> Result<BuildOutcome, BuildRefusal> {
        let price = self.check_build(kind, store, era, unlocked)?;
        if !store.try_spend(&price) {
            return Err(BuildRefusal::Unaffordable);
        }
        let count = self.count(kind).saturating_add(1);
        self.counts.insert(kind, count);

        let completes_era = blueprint(kind).is_wonder();
        tracing::info!(?kind, count, completes_era, "Building completed");
        Ok(BuildOutcome {
            kind,
            count,
            paid: price,
            completes_era,
        })
    }

    /// Every effect of every built unit, paired with its unit count.
    pub fn effects(&self) -> Vec<(BuildingKind, u32, Effect)> {
        self.counts
            .iter()
            .filter(|&(_, &count)| count > 0)
            .flat_map(|(&kind, &count)| {
                blueprint(kind)
                    .effects
                    .into_iter()
                    .map(move |effect| (kind, count, effect))
            })
            .collect()
    }

    /// Sum a per-unit scalar effect over all buildings.
    fn sum_effects(&self, pick: impl Fn(&Effect) -> Option<Decimal>) -> Decimal {
        self.effects()
            .iter()
            .filter_map(|(_, count, effect)| {
                pick(effect).map(|per_unit| per_unit.saturating_mul(quantity::from_count(*count)))
            })
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Aggregate storage bonus per resource: `sum(bonus * count)`.
    pub fn storage_bonuses(&self) -> CostMap {
        let mut bonuses = CostMap::new();
        for (_, count, effect) in self.effects() {
            if let Effect::StorageBonus { resource, amount } = effect {
                let entry = bonuses.entry(resource).or_insert(Decimal::ZERO);
                *entry = entry.saturating_add(amount.saturating_mul(quantity::from_count(count)));
            }
        }
        bonuses
    }

    /// Recompute storage caps on `store` from `base` plus building bonuses.
    pub fn refresh_caps(&self, store: &mut ResourceStore, base: &BTreeMap<ResourceKind, StorageCap>) {
        store.recompute_caps(base, &self.storage_bonuses());
    }

    /// Population cap: `base + sum(population bonus * count)`.
    pub fn max_population(&self, base: u32) -> u32 {
        let bonus = self.sum_effects(|effect| match effect {
            Effect::PopulationBonus(amount) => Some(*amount),
            _ => None,
        });
        base.saturating_add(quantity::floor_count(bonus))
    }

    /// Total happiness bonus from buildings.
    pub fn happiness_bonus(&self) -> Quantity {
        self.sum_effects(|effect| match effect {
            Effect::HappinessBonus(points) => Some(*points),
            _ => None,
        })
    }

    /// Total fractional tax bonus from buildings.
    pub fn tax_bonus(&self) -> Quantity {
        self.sum_effects(|effect| match effect {
            Effect::TaxBonus(fraction) => Some(*fraction),
            _ => None,
        })
    }

    /// Culture granted per death by mortality-conversion buildings.
    pub fn culture_per_death(&self) -> Quantity {
        self.sum_effects(|effect| match effect {
            Effect::MortalityConversion { culture_per_death } => Some(*culture_per_death),
            _ => None,
        })
    }

    /// Whether the wonder of `era` has been raised.
    pub fn wonder_built(&self, era: Era) -> bool {
        BuildingKind::ALL
            .iter()
            .map(|&kind| blueprint(kind))
            .any(|print| print.is_wonder() && print.era == era && self.count(print.kind) > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rich_store() -> ResourceStore {
        let mut store = ResourceStore::new(&BTreeMap::new());
        for kind in ResourceKind::ALL {
            store.add(kind, dec!(10000));
        }
        store
    }

    #[test]
    fn every_kind_has_a_growing_price() {
        for kind in BuildingKind::ALL {
            let print = blueprint(kind);
            assert_eq!(print.kind, kind);
            assert!(print.cost_multiplier > Decimal::ONE, "{kind:?}");
            assert!(!print.base_cost.is_empty(), "{kind:?}");
        }
    }

    #[test]
    fn cost_follows_exponential_curve() {
        let mut registry = BuildingRegistry::new();
        let mut store = rich_store();
        assert_eq!(registry.cost(BuildingKind::Hut).get(&ResourceKind::Wood).copied(), Some(dec!(20)));

        registry.try_build(BuildingKind::Hut, &mut store, Era::Tribal, true).unwrap();
        registry.try_build(BuildingKind::Hut, &mut store, Era::Tribal, true).unwrap();
        assert_eq!(
            registry.cost(BuildingKind::Hut).get(&ResourceKind::Wood).copied(),
            Some(dec!(26.4500))
        );
    }

    #[test]
    fn build_deducts_exact_price_and_counts_once() {
        let mut registry = BuildingRegistry::new();
        let mut store = rich_store();
        registry.try_build(BuildingKind::Storehouse, &mut store, Era::Tribal, true).unwrap();
        let price = registry.cost(BuildingKind::Storehouse);
        let before = store.clone();

        let outcome = registry
            .try_build(BuildingKind::Storehouse, &mut store, Era::Tribal, true)
            .unwrap();
        assert_eq!(outcome.count, 2);
        assert_eq!(outcome.paid, price);
        for (kind, amount) in &price {
            assert_eq!(store.amount(*kind), before.amount(*kind).saturating_sub(*amount));
        }
    }

    #[test]
    fn unaffordable_build_changes_nothing() {
        let mut registry = BuildingRegistry::new();
        let mut store = ResourceStore::new(&BTreeMap::new());
        store.add(ResourceKind::Wood, dec!(30));
        store.add(ResourceKind::Stone, dec!(9));
        let before = store.clone();
        let refused = registry.try_build(BuildingKind::Storehouse, &mut store, Era::Tribal, true);
        assert_eq!(refused, Err(BuildRefusal::Unaffordable));
        assert_eq!(store, before);
        assert_eq!(registry.count(BuildingKind::Storehouse), 0);
    }

    #[test]
    fn wonder_is_capped_at_one() {
        let mut registry = BuildingRegistry::new();
        let mut store = rich_store();
        let outcome = registry
            .try_build(BuildingKind::Monolith, &mut store, Era::Tribal, true)
            .unwrap();
        assert!(outcome.completes_era);
        assert!(registry.wonder_built(Era::Tribal));
        let before = store.clone();
        assert_eq!(
            registry.try_build(BuildingKind::Monolith, &mut store, Era::Tribal, true),
            Err(BuildRefusal::WonderAlreadyBuilt)
        );
        assert_eq!(store, before);
        assert_eq!(registry.count(BuildingKind::Monolith), 1);
    }

    #[test]
    fn locked_and_future_buildings_are_refused() {
        let mut registry = BuildingRegistry::new();
        let mut store = rich_store();
        assert_eq!(
            registry.try_build(BuildingKind::Trap, &mut store, Era::Tribal, false),
            Err(BuildRefusal::Locked)
        );
        assert_eq!(
            registry.try_build(BuildingKind::House, &mut store, Era::Tribal, true),
            Err(BuildRefusal::WrongEra)
        );
        assert!(registry.try_build(BuildingKind::House, &mut store, Era::Kingdom, true).is_ok());
    }

    #[test]
    fn bonuses_scale_with_count() {
        let mut registry = BuildingRegistry::new();
        let mut store = rich_store();
        for _ in 0..3 {
            registry.try_build(BuildingKind::Hut, &mut store, Era::Tribal, true).unwrap();
        }
        registry.try_build(BuildingKind::Storehouse, &mut store, Era::Tribal, true).unwrap();
        registry.try_build(BuildingKind::Storehouse, &mut store, Era::Tribal, true).unwrap();

        assert_eq!(registry.max_population(5), 11);
        let bonuses = registry.storage_bonuses();
        assert_eq!(bonuses.get(&ResourceKind::Wood).copied(), Some(dec!(100)));
        assert_eq!(bonuses.get(&ResourceKind::Skins).copied(), Some(dec!(50)));
    }

    #[test]
    fn refresh_caps_raises_limited_caps() {
        let mut registry = BuildingRegistry::new();
        let mut store = rich_store();
        let base = BTreeMap::from([(ResourceKind::Food, StorageCap::Limited(dec!(200)))]);
        registry.try_build(BuildingKind::Granary, &mut store, Era::Tribal, true).unwrap();
        registry.refresh_caps(&mut store, &base);
        assert_eq!(store.cap(ResourceKind::Food), StorageCap::Limited(dec!(300)));
        assert_eq!(store.amount(ResourceKind::Food), dec!(300));
    }

    #[test]
    fn civic_bonuses() {
        let mut registry = BuildingRegistry::new();
        let mut store = rich_store();
        registry.try_build(BuildingKind::Market, &mut store, Era::Kingdom, true).unwrap();
        registry.try_build(BuildingKind::Tavern, &mut store, Era::Kingdom, true).unwrap();
        registry.try_build(BuildingKind::Tavern, &mut store, Era::Kingdom, true).unwrap();
        registry.try_build(BuildingKind::BurialMound, &mut store, Era::Kingdom, true).unwrap();
        assert_eq!(registry.tax_bonus(), dec!(0.1));
        assert_eq!(registry.happiness_bonus(), dec!(6));
        assert_eq!(registry.culture_per_death(), dec!(5));
    }

    #[test]
    fn serializes_counts_by_name() {
        let mut registry = BuildingRegistry::new();
        let mut store = rich_store();
        registry.try_build(BuildingKind::Hut, &mut store, Era::Tribal, true).unwrap();
        let json = serde_json::to_string(&registry).unwrap();
        assert_eq!(json, r#"{"counts":{"Hut":1}}"#);
    }
}
