//! The single owned state tree of one game session.
//!
//! [`GameState`] bundles every subsystem. It is passed by `&mut` into the
//! tick orchestrator and the command interface; nothing else holds a
//! reference to it, and its serialized form is exactly what a save file
//! persists.

use serde::{Deserialize, Serialize};

use kindling_ledger::ResourceStore;
use kindling_settlement::{Economy, Population, TechRegistry, Workforce};
use kindling_types::{
    BonfireView, CalendarView, EconomyView, Era, GameSnapshot, PopulationView, TemporaryEffect,
};
use kindling_world::{Bonfire, BuildingRegistry, SeasonClock};

use crate::chronicle::Chronicle;
use crate::config::SimulationConfig;

/// Simulation speeds the scheduler accepts.
pub const SPEEDS: [u32; 4] = [1, 2, 5, 10];

/// Mutable state of one game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Whether the scheduler advances the simulation.
    pub running: bool,
    /// Speed factor, one of [`SPEEDS`].
    pub speed: u32,
    /// Ticks simulated so far.
    pub tick: u64,
    /// Current era.
    pub era: Era,
    /// Whether the current era's wonder stands.
    pub era_completed: bool,
    /// Stored resources and caps.
    pub resources: ResourceStore,
    /// Season clock.
    pub calendar: SeasonClock,
    /// The central fire.
    pub bonfire: Bonfire,
    /// Completed buildings.
    pub buildings: BuildingRegistry,
    /// Researched technologies.
    pub techs: TechRegistry,
    /// Job and class assignments.
    pub workforce: Workforce,
    /// Settlers and growth progress.
    pub population: Population,
    /// Kingdom taxes and happiness.
    pub economy: Economy,
    /// Active timed modifiers.
    pub temporary_effects: Vec<TemporaryEffect>,
    /// Recent player-facing log.
    pub chronicle: Chronicle,
}

impl GameState {
    /// A fresh, stopped game at tick zero.
    pub fn new(config: &SimulationConfig) -> Self {
        let mut resources = ResourceStore::new(&config.storage.caps());
        resources.add_many(&config.storage.starting);
        Self {
            running: false,
            speed: 1,
            tick: 0,
            era: Era::Tribal,
            era_completed: false,
            resources,
            calendar: SeasonClock::new(&config.calendar),
            bonfire: Bonfire::new(&config.bonfire),
            buildings: BuildingRegistry::new(),
            techs: TechRegistry::new(),
            workforce: Workforce::new(),
            population: Population::new(&config.population),
            economy: Economy::new(&config.economy),
            temporary_effects: Vec::new(),
            chronicle: Chronicle::new(config.world.log_capacity),
        }
    }

    /// Living settlers.
    pub const fn settlers(&self) -> u32 {
        self.population.settlers()
    }

    /// Settlers with no job or class.
    pub fn idle(&self) -> u32 {
        self.workforce.idle(self.settlers())
    }

    /// Current population cap.
    pub fn max_population(&self, config: &SimulationConfig) -> u32 {
        self.buildings
            .max_population(config.population.base_max_population)
    }

    /// Recompute storage caps from the base caps and building bonuses.
    pub fn refresh_caps(&mut self, config: &SimulationConfig) {
        self.buildings
            .refresh_caps(&mut self.resources, &config.storage.caps());
    }

    /// Build the read-only view of the current state.
    pub fn snapshot(&self, config: &SimulationConfig) -> GameSnapshot {
        let caps = self
            .resources
            .caps()
            .iter()
            .map(|(&kind, cap)| (kind, cap.limit()))
            .collect();

        GameSnapshot {
            tick: self.tick,
            running: self.running,
            speed: self.speed,
            era: self.era,
            era_completed: self.era_completed,
            resources: self.resources.amounts().clone(),
            storage_caps: caps,
            calendar: CalendarView {
                season: self.calendar.season(),
                day_in_season: self.calendar.day_in_season(),
                total_days: self.calendar.total_days(),
                progress_pct: self.calendar.progress_pct(),
            },
            population: PopulationView {
                settlers: self.settlers(),
                idle: self.idle(),
                max_population: self.max_population(config),
                growth_progress: self.population.growth_progress(),
                jobs: self.workforce.jobs(),
                classes: self.workforce.classes(),
                unlocked_jobs: self.techs.unlocked_jobs(),
            },
            researched: self.techs.researched(),
            buildings: self.buildings.counts(),
            bonfire: BonfireView {
                fuel: self.bonfire.fuel(),
                max_fuel: self.bonfire.max_fuel(),
                status: self.bonfire.status(&config.bonfire),
                auto_refuel: self.bonfire.auto_refuel(),
            },
            economy: EconomyView {
                happiness: self.economy.happiness(),
                target_happiness: self.economy.target_happiness(),
                tier: self.economy.tier(),
                efficiency: self.economy.efficiency(),
                tax_rate: self.economy.tax_rate(),
                last_tax_income: self.economy.last_tax_income(),
            },
            temporary_effects: self.temporary_effects.clone(),
            log: self.chronicle.entries(),
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(&SimulationConfig::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use kindling_types::{BonfireStatus, ResourceKind, Season};
    use rust_decimal_macros::dec;

    #[test]
    fn new_game_matches_config() {
        let config = SimulationConfig::default();
        let state = GameState::new(&config);
        assert!(!state.running);
        assert_eq!(state.speed, 1);
        assert_eq!(state.era, Era::Tribal);
        assert_eq!(state.settlers(), 3);
        assert_eq!(state.idle(), 3);
        assert_eq!(state.max_population(&config), 5);
        assert_eq!(state.resources.amount(ResourceKind::Food), dec!(20));
        assert_eq!(state.bonfire.fuel(), dec!(50));
    }

    #[test]
    fn snapshot_reflects_state() {
        let config = SimulationConfig::default();
        let state = GameState::new(&config);
        let snapshot = state.snapshot(&config);
        assert_eq!(snapshot.calendar.season, Season::Spring);
        assert_eq!(snapshot.bonfire.status, BonfireStatus::Burning);
        assert_eq!(snapshot.population.settlers, 3);
        assert_eq!(snapshot.storage_caps.get(&ResourceKind::Ideas), Some(&None));
        assert_eq!(snapshot.storage_caps.get(&ResourceKind::Food), Some(&Some(dec!(200))));
        assert!(snapshot.log.is_empty());
    }
}
