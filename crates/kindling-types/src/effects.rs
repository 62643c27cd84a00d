//! Effect descriptors shared by technologies, buildings, and events.
//!
//! Every effect kind is a variant of [`Effect`], so the production pipeline
//! matches them exhaustively instead of probing optional fields.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{BuildingKind, Job, ModifierKey, ResourceKind, WorldEventKind};

/// A permanent effect granted by a researched technology or a completed
/// building.
///
/// Building effects scale with the number of units built; technology
/// effects apply once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Multiply a named output by `factor`.
    Multiplier {
        /// The output being scaled.
        key: ModifierKey,
        /// The multiplicative factor.
        factor: Decimal,
    },
    /// Allow settlers to take a job.
    UnlockJob(Job),
    /// Allow a building to be constructed.
    UnlockBuilding(BuildingKind),
    /// Raise the storage cap of a resource.
    StorageBonus {
        /// The resource whose cap is raised.
        resource: ResourceKind,
        /// Amount added per unit built.
        amount: Decimal,
    },
    /// Raise the population cap.
    PopulationBonus(Decimal),
    /// Produce a resource every tick.
    Passive {
        /// The resource produced.
        resource: ResourceKind,
        /// Amount per tick per unit built.
        per_tick: Decimal,
    },
    /// Turn one resource into another every tick.
    Conversion {
        /// Resource consumed.
        input: ResourceKind,
        /// Amount consumed per tick per unit built.
        input_per_tick: Decimal,
        /// Resource produced.
        output: ResourceKind,
        /// Amount produced per tick per unit built, at full input.
        output_per_tick: Decimal,
    },
    /// Occasionally catch game.
    TrapCatch,
    /// Turn each death into culture.
    MortalityConversion {
        /// Culture granted per settler lost.
        culture_per_death: Decimal,
    },
    /// Add happiness points to the kingdom's target.
    HappinessBonus(Decimal),
    /// Add a fraction to tax yield.
    TaxBonus(Decimal),
}

/// What a temporary effect changes while active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TemporaryEffectKind {
    /// Scale food production by the magnitude.
    FoodProduction,
    /// Scale every production source by the magnitude.
    AllProduction,
    /// Scale bonfire fuel consumption by the magnitude.
    FuelConsumption,
    /// Add the magnitude to the happiness target.
    Happiness,
}

/// A multiplier or bonus with an expiry tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TemporaryEffect {
    /// What the effect does while active.
    pub kind: TemporaryEffectKind,
    /// Factor for multipliers, points for happiness.
    #[ts(as = "String")]
    pub magnitude: Decimal,
    /// First tick at which the effect no longer applies.
    pub expires_at_tick: u64,
    /// The event that caused it.
    pub source: WorldEventKind,
}

impl TemporaryEffect {
    /// Whether the effect is still active at `tick`.
    pub const fn is_active(&self, tick: u64) -> bool {
        tick < self.expires_at_tick
    }
}

/// Fold the active effects matching `kinds` into one product.
fn product_of(effects: &[TemporaryEffect], tick: u64, kinds: &[TemporaryEffectKind]) -> Decimal {
    effects
        .iter()
        .filter(|effect| effect.is_active(tick) && kinds.contains(&effect.kind))
        .fold(Decimal::ONE, |acc, effect| acc.saturating_mul(effect.magnitude))
}

/// Fold every active food-production factor into one multiplier.
///
/// `AllProduction` effects also scale food.
pub fn food_production_factor(effects: &[TemporaryEffect], tick: u64) -> Decimal {
    product_of(
        effects,
        tick,
        &[TemporaryEffectKind::FoodProduction, TemporaryEffectKind::AllProduction],
    )
}

/// Fold every active all-production factor into one multiplier.
pub fn production_factor(effects: &[TemporaryEffect], tick: u64) -> Decimal {
    product_of(effects, tick, &[TemporaryEffectKind::AllProduction])
}

/// Fold every active fuel-consumption factor into one multiplier.
pub fn fuel_factor(effects: &[TemporaryEffect], tick: u64) -> Decimal {
    product_of(effects, tick, &[TemporaryEffectKind::FuelConsumption])
}

/// Sum every active happiness modifier.
pub fn happiness_modifier(effects: &[TemporaryEffect], tick: u64) -> Decimal {
    effects
        .iter()
        .filter(|effect| effect.is_active(tick) && effect.kind == TemporaryEffectKind::Happiness)
        .fold(Decimal::ZERO, |acc, effect| acc.saturating_add(effect.magnitude))
}
