//! Tick orchestration, scheduling, persistence, and commands for the
//! Kindling simulation.
//!
//! This crate owns the ten-phase tick cycle that advances the settlement
//! and the [`Game`] that wraps it for a host: a fixed-step scheduler fed
//! by wall-clock frames, a seeded random source, the [`Commands`]
//! interface for player input, and the save codec.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `kindling-config.yaml` into
//!   strongly-typed structs.
//! - [`state`] -- [`GameState`], the single owned state tree.
//! - [`tick`] -- The ten-phase tick cycle.
//! - [`scheduler`] -- Frame-to-tick conversion with a catch-up cap.
//! - [`chronicle`] -- Player-facing log and the [`Chronicler`] trait.
//! - [`persistence`] -- Versioned base64 saves and template rehydration.
//! - [`game`] -- [`Game`], the session owner.
//! - [`commands`] -- The [`Commands`] trait.
//!
//! [`Chronicler`]: chronicle::Chronicler
//! [`Commands`]: commands::Commands
//! [`Game`]: game::Game
//! [`GameState`]: state::GameState

pub mod chronicle;
pub mod commands;
pub mod config;
pub mod game;
pub mod persistence;
pub mod scheduler;
pub mod state;
pub mod tick;

pub use chronicle::{Chronicle, ChronicleEvent, Chronicler, DefaultChronicler};
pub use commands::Commands;
pub use config::{ConfigError, SimulationConfig};
pub use game::Game;
pub use persistence::{SAVE_VERSION, SaveError};
pub use scheduler::Scheduler;
pub use state::{GameState, SPEEDS};
pub use tick::{TickSummary, run_tick};
