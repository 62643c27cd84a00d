//! The settlement bonfire: a depleting fuel counter with three states.
//!
//! Status is derived from fuel every time it is read:
//!
//! - `fuel == 0` is [`BonfireStatus::Extinguished`]
//! - `0 < fuel <= low_fuel_threshold` is [`BonfireStatus::LowFuel`]
//! - otherwise [`BonfireStatus::Burning`]
//!
//! Each tick the fire burns `base_consumption`, doubled in winter and scaled
//! by whatever multiplier the caller folds together (temporary events and
//! researched techs). Stoking spends wood for fuel and never overfills.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kindling_ledger::{Quantity, ResourceStore, quantity};
use kindling_types::{BonfireStatus, ResourceKind, Season};

use crate::error::WorldError;

/// Bonfire tuning values.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BonfireConfig {
    /// Fuel burned per tick outside winter.
    #[serde(default = "default_base_consumption")]
    pub base_consumption: Quantity,

    /// Consumption multiplier applied in winter.
    #[serde(default = "default_winter_multiplier")]
    pub winter_multiplier: Quantity,

    /// At or below this fuel level the fire is low.
    #[serde(default = "default_low_fuel_threshold")]
    pub low_fuel_threshold: Quantity,

    /// Maximum fuel the fire can hold.
    #[serde(default = "default_max_fuel")]
    pub max_fuel: Quantity,

    /// Fuel at the start of a new game.
    #[serde(default = "default_starting_fuel")]
    pub starting_fuel: Quantity,

    /// Wood spent per stoke.
    #[serde(default = "default_refuel_wood_cost")]
    pub refuel_wood_cost: Quantity,

    /// Fuel gained per stoke.
    #[serde(default = "default_refuel_amount")]
    pub refuel_amount: Quantity,

    /// Production multiplier while the fire is out.
    #[serde(default = "default_extinguished_penalty")]
    pub extinguished_penalty: Quantity,
}

impl Default for BonfireConfig {
    fn default() -> Self {
        Self {
            base_consumption: default_base_consumption(),
            winter_multiplier: default_winter_multiplier(),
            low_fuel_threshold: default_low_fuel_threshold(),
            max_fuel: default_max_fuel(),
            starting_fuel: default_starting_fuel(),
            refuel_wood_cost: default_refuel_wood_cost(),
            refuel_amount: default_refuel_amount(),
            extinguished_penalty: default_extinguished_penalty(),
        }
    }
}

impl BonfireConfig {
    /// Check that the fuel ladder is coherent.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidConfig`] if `max_fuel` is not positive,
    /// the low-fuel threshold or starting fuel exceed `max_fuel`, or any
    /// rate is negative.
    pub fn validate(&self) -> Result<(), WorldError> {
        if self.max_fuel <= Decimal::ZERO {
            return Err(invalid("bonfire.max_fuel must be positive"));
        }
        if self.low_fuel_threshold > self.max_fuel {
            return Err(invalid("bonfire.low_fuel_threshold must not exceed max_fuel"));
        }
        if self.starting_fuel > self.max_fuel {
            return Err(invalid("bonfire.starting_fuel must not exceed max_fuel"));
        }
        let rates = [
            self.base_consumption,
            self.winter_multiplier,
            self.refuel_wood_cost,
            self.refuel_amount,
            self.extinguished_penalty,
        ];
        if rates.iter().any(|rate| *rate < Decimal::ZERO) {
            return Err(invalid("bonfire rates must not be negative"));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> WorldError {
    WorldError::InvalidConfig {
        reason: reason.to_owned(),
    }
}

const fn default_base_consumption() -> Quantity {
    Decimal::from_parts(1, 0, 0, false, 1)
}

const fn default_winter_multiplier() -> Quantity {
    Decimal::TWO
}

const fn default_low_fuel_threshold() -> Quantity {
    Decimal::from_parts(30, 0, 0, false, 0)
}

const fn default_max_fuel() -> Quantity {
    Decimal::ONE_HUNDRED
}

const fn default_starting_fuel() -> Quantity {
    Decimal::from_parts(50, 0, 0, false, 0)
}

const fn default_refuel_wood_cost() -> Quantity {
    Decimal::from_parts(5, 0, 0, false, 0)
}

const fn default_refuel_amount() -> Quantity {
    Decimal::TEN
}

const fn default_extinguished_penalty() -> Quantity {
    Decimal::from_parts(1, 0, 0, false, 1)
}

/// What one tick did to the fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BonfireTick {
    /// Status before any fuel was burned.
    pub before: BonfireStatus,
    /// Status after consumption and auto-refuel.
    pub after: BonfireStatus,
    /// Fuel actually burned.
    pub consumed: Quantity,
    /// Whether auto-refuel stoked the fire.
    pub refueled: bool,
}

impl BonfireTick {
    /// Whether the status changed during the tick.
    pub fn status_changed(&self) -> bool {
        self.before != self.after
    }
}

/// The fire at the center of the settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bonfire {
    /// Current fuel.
    fuel: Quantity,
    /// Fuel ceiling.
    max_fuel: Quantity,
    /// Whether the fire feeds itself from the wood store.
    auto_refuel: bool,
}

impl Bonfire {
    /// Light a new fire with the configured starting fuel.
    pub fn new(config: &BonfireConfig) -> Self {
        Self {
            fuel: config.starting_fuel.min(config.max_fuel),
            max_fuel: config.max_fuel,
            auto_refuel: false,
        }
    }

    /// Current fuel.
    pub const fn fuel(&self) -> Quantity {
        self.fuel
    }

    /// Fuel ceiling.
    pub const fn max_fuel(&self) -> Quantity {
        self.max_fuel
    }

    /// Whether auto-refuel is on.
    pub const fn auto_refuel(&self) -> bool {
        self.auto_refuel
    }

    /// Turn auto-refuel on or off.
    pub const fn set_auto_refuel(&mut self, enabled: bool) {
        self.auto_refuel = enabled;
    }

    /// Overwrite the fuel level, clamped to `[0, max_fuel]`.
    pub fn set_fuel(&mut self, fuel: Quantity) {
        self.fuel = quantity::non_negative(fuel).min(self.max_fuel);
    }

    /// Derive the status from the current fuel.
    pub fn status(&self, config: &BonfireConfig) -> BonfireStatus {
        if self.fuel <= Decimal::ZERO {
            BonfireStatus::Extinguished
        } else if self.fuel <= config.low_fuel_threshold {
            BonfireStatus::LowFuel
        } else {
            BonfireStatus::Burning
        }
    }

    /// Whether the fire is burning at all.
    pub fn is_lit(&self) -> bool {
        self.fuel > Decimal::ZERO
    }

    /// Global production multiplier imposed by the fire.
    pub fn production_penalty(&self, config: &BonfireConfig) -> Quantity {
        if self.is_lit() {
            Decimal::ONE
        } else {
            config.extinguished_penalty
        }
    }

    /// Burn one tick of fuel.
    ///
    /// `multiplier` folds every external factor (events, techs). Returns the
    /// fuel actually burned, which is less than demanded when the fire runs
    /// dry.
    pub fn consume(&mut self, season: Season, multiplier: Quantity, config: &BonfireConfig) -> Quantity {
        let seasonal = if season == Season::Winter {
            config.winter_multiplier
        } else {
            Decimal::ONE
        };
        let demand = quantity::scale(config.base_consumption, &[seasonal, multiplier]);
        let burned = quantity::non_negative(demand).min(self.fuel);
        self.fuel = self.fuel.saturating_sub(burned);
        burned
    }

    /// Spend wood to add fuel.
    ///
    /// Refused when the fire is already full or the wood store cannot cover
    /// the cost. Added fuel is clamped to `max_fuel`.
    pub fn stoke(&mut self, store: &mut ResourceStore, config: &BonfireConfig) -> bool {
        if self.fuel >= self.max_fuel {
            return false;
        }
        if store.amount(ResourceKind::Wood) < config.refuel_wood_cost {
            return false;
        }
        store.remove(ResourceKind::Wood, config.refuel_wood_cost);
        self.set_fuel(self.fuel.saturating_add(config.refuel_amount));
        true
    }

    /// Stoke the fire if auto-refuel is on and fuel is at or below the
    /// low-fuel threshold.
    pub fn auto_stoke(&mut self, store: &mut ResourceStore, config: &BonfireConfig) -> bool {
        if !self.auto_refuel || self.fuel > config.low_fuel_threshold {
            return false;
        }
        self.stoke(store, config)
    }

    /// Run the bonfire phase of a tick: status, consumption, auto-refuel.
    pub fn tick(
        &mut self,
        season: Season,
        multiplier: Quantity,
        store: &mut ResourceStore,
        config: &BonfireConfig,
    ) -> BonfireTick {
        let before = self.status(config);
        let consumed = self.consume(season, multiplier, config);
        let refueled = self.auto_stoke(store, config);
        let after = self.status(config);
        if before != after {
            tracing::debug!(?before, ?after, fuel = %self.fuel, "Bonfire status changed");
        }
        BonfireTick {
            before,
            after,
            consumed,
            refueled,
        }
    }
}
