//! Headless driver for the Kindling simulation.
//!
//! Stands in for a browser host: a timer plays the role of animation
//! frames, each frame hands the wall clock to [`Game::frame`], and the
//! scheduler decides how many ticks that frame owes.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `KINDLING_CONFIG` or `kindling-config.yaml`
//! 3. Create the game and assign a starter workforce
//! 4. Drive frames until `KINDLING_RUN_SECONDS` of real time has passed
//! 5. Log the final state

mod error;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use kindling_core::{Commands, Game, SimulationConfig, TickSummary};
use kindling_ledger::quantity;
use kindling_types::{GameSnapshot, Job, ResourceKind};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Environment variable naming the config file.
const CONFIG_ENV: &str = "KINDLING_CONFIG";

/// Config file read when [`CONFIG_ENV`] is unset.
const DEFAULT_CONFIG_PATH: &str = "kindling-config.yaml";

/// Environment variable bounding the run, in seconds of real time.
const RUN_SECONDS_ENV: &str = "KINDLING_RUN_SECONDS";

/// Run length when [`RUN_SECONDS_ENV`] is unset.
const DEFAULT_RUN_SECONDS: u64 = 10;

/// Real-time gap between host frames.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or is invalid.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("kindling-engine starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        seed = config.world.seed,
        tick_interval_ms = config.world.tick_interval_ms,
        max_catch_up_steps = config.world.max_catch_up_steps,
        "Configuration loaded"
    );

    // 3. Create the game.
    let mut game = Game::new(config).map_err(EngineError::from)?;
    assign_starter_workforce(&mut game);
    game.start_game();

    // 4. Drive frames.
    let run_for = Duration::from_secs(run_seconds());
    info!(seconds = run_for.as_secs(), "Simulation running");
    drive(&mut game, run_for).await;

    // 5. Log the final state.
    log_summary("Simulation finished", &game.snapshot());
    Ok(())
}

/// Load configuration from the configured path, falling back to defaults
/// when no file exists.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let config_path = std::env::var(CONFIG_ENV)
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    Ok(SimulationConfig::load(&config_path)?)
}

/// Seconds of real time to run for.
fn run_seconds() -> u64 {
    match std::env::var(RUN_SECONDS_ENV) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(value = %raw, "Ignoring unparsable run length");
            DEFAULT_RUN_SECONDS
        }),
        Err(_) => DEFAULT_RUN_SECONDS,
    }
}

/// Put the founding settlers to work and keep the fire fed.
fn assign_starter_workforce(game: &mut Game) {
    for job in [Job::Gatherer, Job::Gatherer, Job::Woodcutter] {
        if !game.assign_worker(job) {
            warn!(?job, "Could not assign starter worker");
        }
    }
    game.set_auto_refuel(true);
}

/// Feed timer frames to the game until `run_for` has elapsed.
async fn drive(game: &mut Game, run_for: Duration) {
    let started = Instant::now();
    let mut frames = tokio::time::interval(FRAME_INTERVAL);
    let mut last_day = 0_u32;

    while started.elapsed() < run_for {
        frames.tick().await;
        let now_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let summaries = game.frame(now_ms);
        log_deaths(&summaries);

        let snapshot = game.snapshot();
        let day = quantity::floor_count(snapshot.calendar.total_days);
        if day > last_day {
            last_day = day;
            log_summary("Day complete", &snapshot);
        }
    }
}

/// Surface deaths as they happen.
fn log_deaths(summaries: &[TickSummary]) {
    for summary in summaries.iter().filter(|summary| summary.total_deaths() > 0) {
        warn!(
            tick = summary.tick,
            deaths = summary.total_deaths(),
            settlers = summary.settlers,
            "Settlers lost"
        );
    }
}

/// One-line status of the settlement.
fn log_summary(message: &str, snapshot: &GameSnapshot) {
    let food = snapshot
        .resources
        .get(&ResourceKind::Food)
        .copied()
        .unwrap_or_default();
    info!(
        tick = snapshot.tick,
        day = %snapshot.calendar.total_days,
        season = ?snapshot.calendar.season,
        settlers = snapshot.population.settlers,
        idle = snapshot.population.idle,
        bonfire = ?snapshot.bonfire.status,
        fuel = %snapshot.bonfire.fuel,
        food = %food,
        era = ?snapshot.era,
        "{message}"
    );
}
