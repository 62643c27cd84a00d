//! Per-tick building effects: traps, spoilage, passives, and conversions.
//!
//! Effects are matched exhaustively. Anything that is not a per-tick
//! production effect (caps, housing, happiness, tax, unlocks) is read by
//! other systems and skipped here.

use rand::Rng;
use rust_decimal::Decimal;
use serde::Deserialize;

use kindling_ledger::{CostMap, Quantity, ResourceStore, quantity};
use kindling_types::{Effect, ResourceKind};

use crate::buildings::BuildingRegistry;
use crate::dice;
use crate::error::WorldError;

/// Trap and spoilage tuning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SpecialsConfig {
    /// Chance per trap per tick of a catch.
    pub trap_catch_chance: Quantity,
    /// Meat per catch.
    pub trap_meat_yield: Quantity,
    /// Skins per catch.
    pub trap_skins_yield: Quantity,
    /// Fraction of raw meat that spoils each tick.
    pub meat_spoilage_rate: Quantity,
}

impl Default for SpecialsConfig {
    fn default() -> Self {
        Self {
            trap_catch_chance: Decimal::new(5, 2),
            trap_meat_yield: Decimal::TWO,
            trap_skins_yield: Decimal::ONE,
            meat_spoilage_rate: Decimal::new(5, 4),
        }
    }
}

impl SpecialsConfig {
    /// Check that chances and rates are fractions.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidConfig`] if a chance or rate falls
    /// outside `[0, 1]` or a yield is negative.
    pub fn validate(&self) -> Result<(), WorldError> {
        let fraction = |value: Quantity| value >= Decimal::ZERO && value <= Decimal::ONE;
        if !fraction(self.trap_catch_chance) || !fraction(self.meat_spoilage_rate) {
            return Err(WorldError::InvalidConfig {
                reason: "specials chances and rates must lie in [0, 1]".to_owned(),
            });
        }
        if self.trap_meat_yield < Decimal::ZERO || self.trap_skins_yield < Decimal::ZERO {
            return Err(WorldError::InvalidConfig {
                reason: "specials trap yields must not be negative".to_owned(),
            });
        }
        Ok(())
    }
}

/// What building effects did during one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecialsReport {
    /// Resources actually stored.
    pub produced: CostMap,
    /// Resources drawn as conversion input.
    pub consumed: CostMap,
    /// Traps that caught something.
    pub catches: u32,
    /// Raw meat lost to spoilage.
    pub spoiled: Quantity,
}

impl SpecialsReport {
    fn record(map: &mut CostMap, kind: ResourceKind, amount: Quantity) {
        if amount.is_zero() {
            return;
        }
        let entry = map.entry(kind).or_insert(Decimal::ZERO);
        *entry = entry.saturating_add(amount);
    }
}

/// Run every per-tick building effect against `store`.
///
/// `multiplier` scales all output (bonfire penalty and temporary
/// production modifiers). Conversion input is never scaled; a conversion
/// short on input runs at the fraction it can cover.
pub fn run_specials(
    registry: &BuildingRegistry,
    store: &mut ResourceStore,
    multiplier: Quantity,
    rng: &mut impl Rng,
    config: &SpecialsConfig,
) -> SpecialsReport {
    let mut report = SpecialsReport::default();

    for (kind, count, effect) in registry.effects() {
        let units = quantity::from_count(count);
        match effect {
            Effect::TrapCatch => {
                let catches = (0..count)
                    .filter(|_| dice::roll_chance(rng, config.trap_catch_chance))
                    .count();
                let catches = u32::try_from(catches).unwrap_or(u32::MAX);
                report.catches = report.catches.saturating_add(catches);
                let haul = quantity::scale(quantity::from_count(catches), &[multiplier]);
                let meat = store.add(ResourceKind::Meat, haul.saturating_mul(config.trap_meat_yield));
                let skins = store.add(ResourceKind::Skins, haul.saturating_mul(config.trap_skins_yield));
                SpecialsReport::record(&mut report.produced, ResourceKind::Meat, meat);
                SpecialsReport::record(&mut report.produced, ResourceKind::Skins, skins);
            }
            Effect::Passive { resource, per_tick } => {
                let amount = quantity::scale(per_tick, &[units, multiplier]);
                let stored = store.add(resource, amount);
                SpecialsReport::record(&mut report.produced, resource, stored);
            }
            Effect::Conversion {
                input,
                input_per_tick,
                output,
                output_per_tick,
            } => {
                let required = input_per_tick.saturating_mul(units);
                let drawn = store.remove(input, required);
                let fraction = quantity::ratio(drawn, required);
                let amount = quantity::scale(output_per_tick, &[units, fraction, multiplier]);
                let stored = store.add(output, amount);
                SpecialsReport::record(&mut report.consumed, input, drawn);
                SpecialsReport::record(&mut report.produced, output, stored);
                if drawn < required {
                    tracing::trace!(?kind, ?input, %drawn, %required, "Conversion short on input");
                }
            }
            Effect::Multiplier { .. }
            | Effect::UnlockJob(_)
            | Effect::UnlockBuilding(_)
            | Effect::StorageBonus { .. }
            | Effect::PopulationBonus(_)
            | Effect::MortalityConversion { .. }
            | Effect::HappinessBonus(_)
            | Effect::TaxBonus(_) => {}
        }
    }

    let rot = store
        .amount(ResourceKind::Meat)
        .saturating_mul(config.meat_spoilage_rate);
    report.spoiled = store.remove(ResourceKind::Meat, rot);

    report
}
