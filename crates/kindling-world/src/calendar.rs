//! Season clock for the Kindling simulation.
//!
//! The calendar advances by a fixed fraction of a day every tick. When the
//! days elapsed in the current season reach `days_per_season`, the season
//! rolls over and the overflow is carried into the new season, so no day is
//! ever gained or lost across transitions.
//!
//! # Season multipliers
//!
//! | Resource | Spring | Summer | Autumn | Winter |
//! |----------|--------|--------|--------|--------|
//! | Food     | 1.25   | 1.5    | 1.0    | 0.1    |
//! | Wood     | 1.0    | 1.0    | 1.25   | 0.75   |
//! | Skins    | 1.0    | 0.75   | 1.25   | 1.5    |
//! | Stone    | 1.0    | 1.25   | 1.0    | 0.5    |
//!
//! Meat follows the skins column (hunting is better in the cold) and grain
//! follows the food column. Everything else is unaffected by the season.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kindling_ledger::Quantity;
use kindling_types::{ResourceKind, Season};

use crate::error::WorldError;

/// Calendar configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CalendarConfig {
    /// Days that pass per tick.
    #[serde(default = "default_days_per_tick")]
    pub days_per_tick: Quantity,

    /// Days in each season.
    #[serde(default = "default_days_per_season")]
    pub days_per_season: Quantity,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            days_per_tick: default_days_per_tick(),
            days_per_season: default_days_per_season(),
        }
    }
}

impl CalendarConfig {
    /// Check that both durations are positive.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidConfig`] if either value is zero or
    /// negative.
    pub fn validate(&self) -> Result<(), WorldError> {
        if self.days_per_tick <= Decimal::ZERO {
            return Err(WorldError::InvalidConfig {
                reason: "calendar.days_per_tick must be positive".to_owned(),
            });
        }
        if self.days_per_season <= Decimal::ZERO {
            return Err(WorldError::InvalidConfig {
                reason: "calendar.days_per_season must be positive".to_owned(),
            });
        }
        Ok(())
    }
}

const fn default_days_per_tick() -> Quantity {
    Decimal::from_parts(5, 0, 0, false, 2)
}

const fn default_days_per_season() -> Quantity {
    Decimal::from_parts(30, 0, 0, false, 0)
}

/// Per-resource production factors for one season.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonMultipliers {
    /// Food and grain factor.
    pub food: Decimal,
    /// Wood factor.
    pub wood: Decimal,
    /// Skins and meat factor.
    pub skins: Decimal,
    /// Stone factor.
    pub stone: Decimal,
}

impl SeasonMultipliers {
    /// Return the hand-tuned multiplier table row for a season.
    pub const fn for_season(season: Season) -> Self {
        match season {
            Season::Spring => Self {
                food: Decimal::from_parts(125, 0, 0, false, 2),
                wood: Decimal::ONE,
                skins: Decimal::ONE,
                stone: Decimal::ONE,
            },
            Season::Summer => Self {
                food: Decimal::from_parts(15, 0, 0, false, 1),
                wood: Decimal::ONE,
                skins: Decimal::from_parts(75, 0, 0, false, 2),
                stone: Decimal::from_parts(125, 0, 0, false, 2),
            },
            Season::Autumn => Self {
                food: Decimal::ONE,
                wood: Decimal::from_parts(125, 0, 0, false, 2),
                skins: Decimal::from_parts(125, 0, 0, false, 2),
                stone: Decimal::ONE,
            },
            Season::Winter => Self {
                food: Decimal::from_parts(1, 0, 0, false, 1),
                wood: Decimal::from_parts(75, 0, 0, false, 2),
                skins: Decimal::from_parts(15, 0, 0, false, 1),
                stone: Decimal::from_parts(5, 0, 0, false, 1),
            },
        }
    }

    /// The factor applied to a given resource.
    pub const fn for_resource(&self, kind: ResourceKind) -> Decimal {
        match kind {
            ResourceKind::Food | ResourceKind::Grain => self.food,
            ResourceKind::Wood => self.wood,
            ResourceKind::Skins | ResourceKind::Meat => self.skins,
            ResourceKind::Stone => self.stone,
            ResourceKind::CuredMeat
            | ResourceKind::Ideas
            | ResourceKind::Culture
            | ResourceKind::Gold
            | ResourceKind::Bread
            | ResourceKind::Planks
            | ResourceKind::Tools => Decimal::ONE,
        }
    }
}

/// A season rollover produced by [`SeasonClock::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonChange {
    /// The season before the advance.
    pub from: Season,
    /// The season after the advance.
    pub to: Season,
    /// Number of boundaries crossed (more than one only for huge deltas).
    pub transitions: u32,
}

/// Cyclic day counter tracking the current season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonClock {
    /// Current season.
    season: Season,
    /// Days elapsed within the current season.
    day_in_season: Quantity,
    /// Days elapsed since the game started.
    total_days: Quantity,
    /// Length of every season in days.
    days_per_season: Quantity,
}

impl SeasonClock {
    /// Start a new calendar on day zero of spring.
    pub fn new(config: &CalendarConfig) -> Self {
        Self {
            season: Season::Spring,
            day_in_season: Decimal::ZERO,
            total_days: Decimal::ZERO,
            days_per_season: config.days_per_season,
        }
    }

    /// Current season.
    pub const fn season(&self) -> Season {
        self.season
    }

    /// Days elapsed within the current season.
    pub const fn day_in_season(&self) -> Quantity {
        self.day_in_season
    }

    /// Days elapsed since the game started.
    pub const fn total_days(&self) -> Quantity {
        self.total_days
    }

    /// Length of a season in days.
    pub const fn days_per_season(&self) -> Quantity {
        self.days_per_season
    }

    /// Progress through the current season as a percentage.
    pub fn progress_pct(&self) -> Quantity {
        kindling_ledger::quantity::ratio(self.day_in_season, self.days_per_season)
            .saturating_mul(Decimal::ONE_HUNDRED)
    }

    /// Multipliers for the current season.
    pub const fn multipliers(&self) -> SeasonMultipliers {
        SeasonMultipliers::for_season(self.season)
    }

    /// Advance the calendar by `days`, rolling seasons over as needed.
    ///
    /// Overflow past the end of a season is carried into the next one.
    /// Returns the rollover, if any occurred.
    pub fn advance(&mut self, days: Quantity) -> Option<SeasonChange> {
        let days = kindling_ledger::quantity::non_negative(days);
        self.total_days = self.total_days.saturating_add(days);
        self.day_in_season = self.day_in_season.saturating_add(days);

        if self.days_per_season <= Decimal::ZERO {
            return None;
        }

        let from = self.season;
        let mut transitions: u32 = 0;
        while self.day_in_season >= self.days_per_season {
            self.day_in_season = self.day_in_season.saturating_sub(self.days_per_season);
            self.season = self.season.next();
            transitions = transitions.saturating_add(1);
        }

        (transitions > 0).then_some(SeasonChange {
            from,
            to: self.season,
            transitions,
        })
    }
}
