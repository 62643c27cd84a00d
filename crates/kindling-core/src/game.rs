//! The owner of one game session.
//!
//! [`Game`] ties the state tree to everything that drives it: the
//! validated configuration, the seeded random source, the fixed-step
//! [`Scheduler`], and the [`Chronicler`] that writes player-facing text.
//! Hosts call [`Game::frame`] from their loop and read back a
//! [`GameSnapshot`]; player input goes through the
//! [`Commands`](crate::commands::Commands) trait.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use kindling_types::GameSnapshot;

use crate::chronicle::{ChronicleEvent, Chronicler, DefaultChronicler};
use crate::config::{ConfigError, SimulationConfig};
use crate::scheduler::Scheduler;
use crate::state::GameState;
use crate::tick::{self, TickSummary};

/// A running game session.
pub struct Game {
    /// The state tree.
    pub(crate) state: GameState,
    /// Validated configuration.
    pub(crate) config: SimulationConfig,
    /// Seeded source for every stochastic roll.
    pub(crate) rng: StdRng,
    /// Frame-to-tick converter.
    pub(crate) scheduler: Scheduler,
    /// Turns chronicle events into text.
    pub(crate) chronicler: Box<dyn Chronicler>,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("tick", &self.state.tick)
            .field("running", &self.state.running)
            .field("speed", &self.state.speed)
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

impl Game {
    /// Start a fresh, stopped game.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the configuration fails
    /// validation.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = GameState::new(&config);
        let rng = StdRng::seed_from_u64(config.world.seed);
        let scheduler = Scheduler::new(&config.world);
        tracing::info!(seed = config.world.seed, "Game created");
        Ok(Self {
            state,
            config,
            rng,
            scheduler,
            chronicler: Box::new(DefaultChronicler::new()),
        })
    }

    /// Replace the chronicler used for new log entries.
    #[must_use]
    pub fn with_chronicler(mut self, chronicler: Box<dyn Chronicler>) -> Self {
        self.chronicler = chronicler;
        self
    }

    /// The state tree.
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// The configuration in force.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The scheduler.
    pub const fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Read-only view of the settled state.
    pub fn snapshot(&self) -> GameSnapshot {
        self.state.snapshot(&self.config)
    }

    /// Run exactly one tick, whether or not the game is running.
    pub fn step(&mut self) -> TickSummary {
        tick::run_tick(
            &mut self.state,
            &self.config,
            &mut self.rng,
            self.chronicler.as_ref(),
        )
    }

    /// Account for a host frame at `now_ms` and run the ticks it owes.
    ///
    /// Returns one summary per tick run, oldest first. A stopped game runs
    /// nothing.
    pub fn frame(&mut self, now_ms: u64) -> Vec<TickSummary> {
        let steps = self
            .scheduler
            .frame(now_ms, self.state.running, self.state.speed);
        (0..steps).map(|_| self.step()).collect()
    }

    /// Write a command-driven event to the chronicle.
    pub(crate) fn note(&mut self, event: &ChronicleEvent) {
        let roll = self.rng.random::<u32>();
        let day = self.state.calendar.total_days();
        self.state
            .chronicle
            .record(self.state.tick, day, event, self.chronicler.as_ref(), roll);
    }

    /// Reseed the random source from the configured seed and the current
    /// tick, and forget any frame timing.
    pub(crate) fn reseed(&mut self) {
        self.rng = StdRng::seed_from_u64(self.config.world.seed ^ self.state.tick);
        self.scheduler.reset();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn new_game_is_stopped() {
        let mut game = Game::new(SimulationConfig::default()).unwrap();
        assert!(!game.state().running);
        assert!(game.frame(0).is_empty());
        assert!(game.frame(10_000).is_empty());
        assert_eq!(game.state().tick, 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = SimulationConfig::default();
        config.world.tick_interval_ms = 0;
        assert!(matches!(Game::new(config), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn step_runs_while_stopped() {
        let mut game = Game::new(SimulationConfig::default()).unwrap();
        let summary = game.step();
        assert_eq!(summary.tick, 1);
        assert_eq!(game.snapshot().tick, 1);
    }

    #[test]
    fn same_seed_same_history() {
        let run = || {
            let mut game = Game::new(SimulationConfig::default()).unwrap();
            for _ in 0..1_500 {
                game.step();
            }
            game.snapshot()
        };
        assert_eq!(run(), run());
    }
}
