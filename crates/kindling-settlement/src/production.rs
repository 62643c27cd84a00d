//! Output of workers, idle thinkers, and the player's own hands.
//!
//! Every producer follows the same shape: a base rate per head, scaled by
//! the season factor for the resource, the folded tech multiplier for the
//! producer, and the tick-wide [`OutputModifiers`].

use rust_decimal::Decimal;
use serde::Deserialize;

use kindling_ledger::{CostMap, Quantity, ResourceStore, quantity};
use kindling_types::{
    BonfireStatus, Job, ManualAction, ModifierKey, ResourceKind, Season, SocialClass,
};
use kindling_world::SeasonMultipliers;

use crate::error::SettlementError;
use crate::techs::TechRegistry;
use crate::workforce::Workforce;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Per-head production rates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProductionConfig {
    /// Food per gatherer per tick.
    pub gatherer_food: Quantity,
    /// Wood per woodcutter per tick.
    pub woodcutter_wood: Quantity,
    /// Meat per hunter per tick.
    pub hunter_meat: Quantity,
    /// Skins per hunter per tick.
    pub hunter_skins: Quantity,
    /// Stone per stone cutter per tick.
    pub stonecutter_stone: Quantity,
    /// Food per peasant per tick.
    pub peasant_food: Quantity,
    /// Grain per peasant per tick.
    pub peasant_grain: Quantity,
    /// Wood an artisan consumes per tick.
    pub artisan_wood: Quantity,
    /// Planks an artisan produces per tick at full input.
    pub artisan_planks: Quantity,
    /// Gold per merchant per tick.
    pub merchant_gold: Quantity,
    /// Culture per noble per tick.
    pub noble_culture: Quantity,
    /// Bread each class member eats per tick.
    pub bread_per_head: Quantity,
    /// Food per manual forage.
    pub forage_yield: Quantity,
    /// Wood per manual chop.
    pub chop_yield: Quantity,
    /// Stone per manual quarry.
    pub quarry_yield: Quantity,
}

impl Default for ProductionConfig {
    fn default() -> Self {
        Self {
            gatherer_food: Decimal::new(5, 2),
            woodcutter_wood: Decimal::new(4, 2),
            hunter_meat: Decimal::new(3, 2),
            hunter_skins: Decimal::new(1, 2),
            stonecutter_stone: Decimal::new(2, 2),
            peasant_food: Decimal::new(4, 2),
            peasant_grain: Decimal::new(2, 2),
            artisan_wood: Decimal::new(2, 2),
            artisan_planks: Decimal::new(2, 2),
            merchant_gold: Decimal::new(5, 3),
            noble_culture: Decimal::new(5, 3),
            bread_per_head: Decimal::new(2, 3),
            forage_yield: Decimal::ONE,
            chop_yield: Decimal::ONE,
            quarry_yield: Decimal::ONE,
        }
    }
}

impl ProductionConfig {
    /// Check that no rate is negative.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementError::InvalidConfig`] if any rate is negative.
    pub fn validate(&self) -> Result<(), SettlementError> {
        let rates = [
            self.gatherer_food,
            self.woodcutter_wood,
            self.hunter_meat,
            self.hunter_skins,
            self.stonecutter_stone,
            self.peasant_food,
            self.peasant_grain,
            self.artisan_wood,
            self.artisan_planks,
            self.merchant_gold,
            self.noble_culture,
            self.bread_per_head,
            self.forage_yield,
            self.chop_yield,
            self.quarry_yield,
        ];
        if rates.iter().any(|rate| *rate < Decimal::ZERO) {
            return Err(SettlementError::invalid("production rates must not be negative"));
        }
        Ok(())
    }

    /// Base yields of one worker in `job`.
    pub fn job_yields(&self, job: Job) -> Vec<(ResourceKind, Quantity)> {
        match job {
            Job::Gatherer => vec![(ResourceKind::Food, self.gatherer_food)],
            Job::Woodcutter => vec![(ResourceKind::Wood, self.woodcutter_wood)],
            Job::Hunter => vec![
                (ResourceKind::Meat, self.hunter_meat),
                (ResourceKind::Skins, self.hunter_skins),
            ],
            Job::StoneCutter => vec![(ResourceKind::Stone, self.stonecutter_stone)],
            Job::Scout => Vec::new(),
        }
    }

    /// Base yield of one manual action.
    pub const fn manual_yield(&self, action: ManualAction) -> (ResourceKind, Quantity) {
        match action {
            ManualAction::Forage => (ResourceKind::Food, self.forage_yield),
            ManualAction::ChopWood => (ResourceKind::Wood, self.chop_yield),
            ManualAction::QuarryStone => (ResourceKind::Stone, self.quarry_yield),
        }
    }
}

/// Idea generation tuning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IdeasConfig {
    /// Ideas per idle settler per tick.
    pub per_idle: Quantity,
    /// Factor while the bonfire is low.
    pub low_fuel_factor: Quantity,
    /// Factor while the bonfire is out.
    pub extinguished_factor: Quantity,
    /// Factor in winter.
    pub winter_factor: Quantity,
    /// Factor while starving.
    pub starving_factor: Quantity,
}

impl Default for IdeasConfig {
    fn default() -> Self {
        Self {
            per_idle: Decimal::new(1, 2),
            low_fuel_factor: Decimal::new(75, 2),
            extinguished_factor: Decimal::new(5, 1),
            winter_factor: Decimal::new(75, 2),
            starving_factor: Decimal::new(5, 1),
        }
    }
}

impl IdeasConfig {
    /// Check that no factor is negative.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementError::InvalidConfig`] on a negative factor.
    pub fn validate(&self) -> Result<(), SettlementError> {
        let factors = [
            self.per_idle,
            self.low_fuel_factor,
            self.extinguished_factor,
            self.winter_factor,
            self.starving_factor,
        ];
        if factors.iter().any(|factor| *factor < Decimal::ZERO) {
            return Err(SettlementError::invalid("ideas factors must not be negative"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Modifiers
// ---------------------------------------------------------------------------

/// Tick-wide factors applied on top of per-producer rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputModifiers {
    /// Season table row.
    pub season: SeasonMultipliers,
    /// Temporary factor for edible output (includes all-production effects).
    pub food: Quantity,
    /// Temporary factor for everything else.
    pub other: Quantity,
    /// Bonfire penalty.
    pub bonfire: Quantity,
}

impl OutputModifiers {
    /// Modifiers that change nothing.
    pub const fn neutral(season: Season) -> Self {
        Self {
            season: SeasonMultipliers::for_season(season),
            food: Decimal::ONE,
            other: Decimal::ONE,
            bonfire: Decimal::ONE,
        }
    }

    /// Combined factor for one unit of `kind`.
    ///
    /// Season and bonfire penalty compose multiplicatively.
    pub fn factor(&self, kind: ResourceKind) -> Quantity {
        let temporary = if is_edible(kind) { self.food } else { self.other };
        quantity::scale(self.season.for_resource(kind), &[temporary, self.bonfire])
    }
}

/// Whether `kind` counts as food production for temporary effects.
pub const fn is_edible(kind: ResourceKind) -> bool {
    matches!(
        kind,
        ResourceKind::Food
            | ResourceKind::Meat
            | ResourceKind::CuredMeat
            | ResourceKind::Grain
            | ResourceKind::Bread
    )
}

fn credit(store: &mut ResourceStore, produced: &mut CostMap, kind: ResourceKind, amount: Quantity) {
    let stored = store.add(kind, amount);
    if !stored.is_zero() {
        let entry = produced.entry(kind).or_insert(Decimal::ZERO);
        *entry = entry.saturating_add(stored);
    }
}

// ---------------------------------------------------------------------------
// Producers
// ---------------------------------------------------------------------------

/// Run tribal-era job production. Returns what was stored.
pub fn produce_jobs(
    workforce: &Workforce,
    techs: &TechRegistry,
    modifiers: &OutputModifiers,
    store: &mut ResourceStore,
    config: &ProductionConfig,
) -> CostMap {
    let mut produced = CostMap::new();
    for job in Job::ALL {
        let workers = workforce.job_count(job);
        if workers == 0 {
            continue;
        }
        let tech = techs.multiplier(ModifierKey::JobOutput(job));
        for (kind, base) in config.job_yields(job) {
            let amount = quantity::scale(
                base,
                &[quantity::from_count(workers), tech, modifiers.factor(kind)],
            );
            credit(store, &mut produced, kind, amount);
        }
    }
    produced
}

/// Ideas from idle settlers this tick.
pub fn idea_output(
    idle: u32,
    bonfire: BonfireStatus,
    season: Season,
    starving: bool,
    techs: &TechRegistry,
    config: &IdeasConfig,
) -> Quantity {
    let fire = match bonfire {
        BonfireStatus::Burning => Decimal::ONE,
        BonfireStatus::LowFuel => config.low_fuel_factor,
        BonfireStatus::Extinguished => config.extinguished_factor,
    };
    let winter = if season == Season::Winter {
        config.winter_factor
    } else {
        Decimal::ONE
    };
    let hunger = if starving {
        config.starving_factor
    } else {
        Decimal::ONE
    };
    quantity::scale(
        quantity::from_count(idle),
        &[
            config.per_idle,
            fire,
            winter,
            hunger,
            techs.multiplier(ModifierKey::IdeaGeneration),
        ],
    )
}

/// Yield of one manual action after tech multipliers.
pub fn manual_output(
    action: ManualAction,
    techs: &TechRegistry,
    config: &ProductionConfig,
) -> (ResourceKind, Quantity) {
    let (kind, base) = config.manual_yield(action);
    (
        kind,
        base.saturating_mul(techs.multiplier(ModifierKey::Manual(action))),
    )
}

/// Run kingdom-era class production, scaled by happiness `efficiency`.
///
/// Artisans convert wood to planks; a shortage of wood runs them at the
/// fraction the store can cover. Returns what was stored.
pub fn produce_classes(
    workforce: &Workforce,
    techs: &TechRegistry,
    modifiers: &OutputModifiers,
    efficiency: Quantity,
    store: &mut ResourceStore,
    config: &ProductionConfig,
) -> CostMap {
    let mut produced = CostMap::new();
    for class in SocialClass::ALL {
        let heads = workforce.class_count(class);
        if heads == 0 {
            continue;
        }
        let heads = quantity::from_count(heads);
        let output = |kind: ResourceKind, base: Quantity| {
            quantity::scale(
                base,
                &[
                    heads,
                    efficiency,
                    techs.multiplier(ModifierKey::ClassOutput(class)),
                    modifiers.factor(kind),
                ],
            )
        };
        match class {
            SocialClass::Peasant => {
                let food = output(ResourceKind::Food, config.peasant_food);
                let grain = output(ResourceKind::Grain, config.peasant_grain);
                credit(store, &mut produced, ResourceKind::Food, food);
                credit(store, &mut produced, ResourceKind::Grain, grain);
            }
            SocialClass::Artisan => {
                let required = config.artisan_wood.saturating_mul(heads);
                let drawn = store.remove(ResourceKind::Wood, required);
                let fraction = quantity::ratio(drawn, required);
                let planks = output(ResourceKind::Planks, config.artisan_planks).saturating_mul(fraction);
                credit(store, &mut produced, ResourceKind::Planks, planks);
            }
            SocialClass::Merchant => {
                let gold = output(ResourceKind::Gold, config.merchant_gold);
                credit(store, &mut produced, ResourceKind::Gold, gold);
            }
            SocialClass::Noble => {
                let culture = output(ResourceKind::Culture, config.noble_culture);
                credit(store, &mut produced, ResourceKind::Culture, culture);
            }
        }
    }
    produced
}

/// Class members eat bread when there is any. Returns the bread eaten.
pub fn consume_bread(workforce: &Workforce, store: &mut ResourceStore, config: &ProductionConfig) -> Quantity {
    let demand = quantity::from_count(workforce.in_classes()).saturating_mul(config.bread_per_head);
    store.remove(ResourceKind::Bread, demand)
}

/// Number of distinct food kinds in stock (food, meat, cured meat, bread).
pub fn diet_variety(store: &ResourceStore) -> u32 {
    let stocked = [
        ResourceKind::Food,
        ResourceKind::Meat,
        ResourceKind::CuredMeat,
        ResourceKind::Bread,
    ]
    .into_iter()
    .filter(|kind| store.amount(*kind) > Decimal::ZERO)
    .count();
    u32::try_from(stocked).unwrap_or(u32::MAX)
}
