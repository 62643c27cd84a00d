//! Population growth and stochastic mortality.
//!
//! Settlers are whole heads. Growth accumulates a fractional progress value
//! each tick the settlement is fed, warm, and below its cap; every crossing
//! of 1.0 yields one new settler. Any tick that fails a growth condition
//! resets progress to zero.
//!
//! Mortality draws a whole-percent fraction of the population from a fixed
//! range per cause, floors it to heads, and always leaves one survivor.
//! Each cause may roll at most once per `mortality_interval_ticks`.

use std::collections::BTreeMap;

use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kindling_ledger::{Quantity, quantity};
use kindling_types::MortalityCause;
use kindling_world::dice;

use crate::error::SettlementError;

/// Growth and mortality tuning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Settlers at the start of a new game.
    pub starting_settlers: u32,
    /// Population cap before any housing is built.
    pub base_max_population: u32,
    /// Growth progress gained per qualifying tick.
    pub growth_per_tick: Quantity,
    /// Smallest starvation death share, in whole percent.
    pub starvation_min_pct: u32,
    /// Largest starvation death share, in whole percent.
    pub starvation_max_pct: u32,
    /// Smallest freezing death share, in whole percent.
    pub freezing_min_pct: u32,
    /// Largest freezing death share, in whole percent.
    pub freezing_max_pct: u32,
    /// Minimum ticks between two mortality rolls of the same cause.
    pub mortality_interval_ticks: u64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            starting_settlers: 3,
            base_max_population: 5,
            growth_per_tick: Decimal::new(2, 3),
            starvation_min_pct: 10,
            starvation_max_pct: 30,
            freezing_min_pct: 5,
            freezing_max_pct: 15,
            mortality_interval_ticks: 100,
        }
    }
}

impl PopulationConfig {
    /// Check ranges and starting values.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementError::InvalidConfig`] for an inverted or
    /// out-of-range mortality band, a zero interval, or a starting
    /// population outside `[1, base_max_population]`.
    pub fn validate(&self) -> Result<(), SettlementError> {
        if self.starvation_min_pct > self.starvation_max_pct
            || self.freezing_min_pct > self.freezing_max_pct
        {
            return Err(SettlementError::invalid(
                "population mortality ranges must have min <= max",
            ));
        }
        if self.starvation_max_pct > 100 || self.freezing_max_pct > 100 {
            return Err(SettlementError::invalid(
                "population mortality percentages must not exceed 100",
            ));
        }
        if self.mortality_interval_ticks == 0 {
            return Err(SettlementError::invalid(
                "population.mortality_interval_ticks must be at least one",
            ));
        }
        if self.starting_settlers == 0 || self.starting_settlers > self.base_max_population {
            return Err(SettlementError::invalid(
                "population.starting_settlers must lie in [1, base_max_population]",
            ));
        }
        if self.growth_per_tick < Decimal::ZERO {
            return Err(SettlementError::invalid(
                "population.growth_per_tick must not be negative",
            ));
        }
        Ok(())
    }

    /// Death-share band for a cause, in whole percent.
    pub const fn band(&self, cause: MortalityCause) -> (u32, u32) {
        match cause {
            MortalityCause::Starvation => (self.starvation_min_pct, self.starvation_max_pct),
            MortalityCause::Freezing => (self.freezing_min_pct, self.freezing_max_pct),
        }
    }
}

/// Conditions checked by the growth phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthConditions {
    /// Any food-equivalent left after eating.
    pub fed: bool,
    /// The bonfire is burning.
    pub warm: bool,
    /// Current population cap.
    pub max_population: u32,
}

/// Number of deaths for a population and a drawn share.
///
/// `floor(population * share)`, raised to one when more than one settler
/// lives, and never more than `population - 1`.
pub fn deaths_for(population: u32, share: Quantity) -> u32 {
    if population <= 1 {
        return 0;
    }
    let drawn = quantity::floor_count(quantity::from_count(population).saturating_mul(share));
    drawn.max(1).min(population.saturating_sub(1))
}

/// The settlers and their growth accumulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Population {
    /// Living settlers.
    settlers: u32,
    /// Progress toward the next birth, in `[0, 1)`.
    growth_progress: Quantity,
    /// Tick of the last mortality roll per cause.
    last_mortality: BTreeMap<MortalityCause, u64>,
}

impl Population {
    /// Start a new settlement.
    pub fn new(config: &PopulationConfig) -> Self {
        Self {
            settlers: config.starting_settlers.max(1),
            growth_progress: Decimal::ZERO,
            last_mortality: BTreeMap::new(),
        }
    }

    /// Living settlers.
    pub const fn settlers(&self) -> u32 {
        self.settlers
    }

    /// Progress toward the next birth.
    pub const fn growth_progress(&self) -> Quantity {
        self.growth_progress
    }

    /// Add up to `n` settlers without exceeding `max_population`. Returns
    /// how many joined.
    pub fn add_settlers(&mut self, n: u32, max_population: u32) -> u32 {
        let room = max_population.saturating_sub(self.settlers);
        let joined = n.min(room);
        self.settlers = self.settlers.saturating_add(joined);
        joined
    }

    /// Advance the growth accumulator. Returns the number of births.
    pub fn grow(&mut self, conditions: GrowthConditions, config: &PopulationConfig) -> u32 {
        let below_cap = self.settlers < conditions.max_population;
        if !(conditions.fed && conditions.warm && below_cap) {
            self.growth_progress = Decimal::ZERO;
            return 0;
        }
        self.growth_progress = self.growth_progress.saturating_add(config.growth_per_tick);

        let mut births: u32 = 0;
        while self.growth_progress >= Decimal::ONE && self.settlers < conditions.max_population {
            self.growth_progress = self.growth_progress.saturating_sub(Decimal::ONE);
            self.settlers = self.settlers.saturating_add(1);
            births = births.saturating_add(1);
        }
        if self.settlers >= conditions.max_population {
            self.growth_progress = Decimal::ZERO;
        }
        if births > 0 {
            tracing::info!(births, settlers = self.settlers, "Settlers born");
        }
        births
    }

    /// Whether `cause` may roll mortality on `tick`.
    pub fn mortality_ready(&self, cause: MortalityCause, tick: u64, config: &PopulationConfig) -> bool {
        self.last_mortality
            .get(&cause)
            .is_none_or(|&last| tick.saturating_sub(last) >= config.mortality_interval_ticks)
    }

    /// Roll mortality for `cause` if its interval has elapsed.
    ///
    /// Returns the number of deaths (possibly zero). Never leaves fewer
    /// than one settler.
    pub fn roll_mortality(
        &mut self,
        cause: MortalityCause,
        tick: u64,
        rng: &mut impl Rng,
        config: &PopulationConfig,
    ) -> u32 {
        if !self.mortality_ready(cause, tick, config) {
            return 0;
        }
        self.last_mortality.insert(cause, tick);

        let (min, max) = config.band(cause);
        let share = dice::roll_percent(rng, min, max);
        let deaths = deaths_for(self.settlers, share);
        self.settlers = self.settlers.saturating_sub(deaths).max(1);
        if deaths > 0 {
            tracing::info!(?cause, deaths, %share, settlers = self.settlers, "Settlers died");
        }
        deaths
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rust_decimal_macros::dec;

    fn conditions(max_population: u32) -> GrowthConditions {
        GrowthConditions {
            fed: true,
            warm: true,
            max_population,
        }
    }

    #[test]
    fn deaths_floor_raise_and_cap() {
        assert_eq!(deaths_for(10, dec!(0.25)), 2);
        assert_eq!(deaths_for(3, dec!(0.10)), 1);
        assert_eq!(deaths_for(2, dec!(0.99)), 1);
        assert_eq!(deaths_for(1, dec!(0.30)), 0);
        assert_eq!(deaths_for(0, dec!(0.30)), 0);
    }

    #[test]
    fn one_birth_per_threshold_crossing() {
        let config = PopulationConfig {
            growth_per_tick: dec!(0.25),
            ..PopulationConfig::default()
        };
        let mut population = Population::new(&config);
        let mut births = 0;
        for _ in 0..8 {
            births += population.grow(conditions(10), &config);
        }
        assert_eq!(births, 2);
        assert_eq!(population.settlers(), 5);
        assert_eq!(population.growth_progress(), Decimal::ZERO);
    }

    #[test]
    fn failed_condition_resets_progress() {
        let config = PopulationConfig::default();
        let mut population = Population::new(&config);
        population.grow(conditions(10), &config);
        assert_eq!(population.growth_progress(), dec!(0.002));
        let cold = GrowthConditions {
            warm: false,
            ..conditions(10)
        };
        assert_eq!(population.grow(cold, &config), 0);
        assert_eq!(population.growth_progress(), Decimal::ZERO);
    }

    #[test]
    fn growth_stops_at_cap() {
        let config = PopulationConfig::default();
        let mut population = Population::new(&config);
        assert_eq!(population.grow(conditions(3), &config), 0);
        assert_eq!(population.growth_progress(), Decimal::ZERO);
    }

    #[test]
    fn arrivals_respect_cap() {
        let config = PopulationConfig::default();
        let mut population = Population::new(&config);
        assert_eq!(population.add_settlers(5, 4), 1);
        assert_eq!(population.settlers(), 4);
    }

    #[test]
    fn starvation_always_leaves_a_survivor() {
        let config = PopulationConfig {
            starting_settlers: 2,
            mortality_interval_ticks: 1,
            ..PopulationConfig::default()
        };
        let mut population = Population::new(&config);
        let mut rng = StdRng::seed_from_u64(4);
        for tick in 0..1_000 {
            population.roll_mortality(MortalityCause::Starvation, tick, &mut rng, &config);
            assert!(population.settlers() >= 1);
        }
        assert_eq!(population.settlers(), 1);
    }

    #[test]
    fn mortality_is_rate_limited_per_cause() {
        let config = PopulationConfig {
            starting_settlers: 5,
            ..PopulationConfig::default()
        };
        let mut population = Population::new(&config);
        let mut rng = StdRng::seed_from_u64(8);
        assert!(population.roll_mortality(MortalityCause::Freezing, 10, &mut rng, &config) >= 1);
        assert_eq!(population.roll_mortality(MortalityCause::Freezing, 50, &mut rng, &config), 0);
        assert!(population.mortality_ready(MortalityCause::Starvation, 50, &config));
        assert!(population.mortality_ready(MortalityCause::Freezing, 110, &config));
    }
}
