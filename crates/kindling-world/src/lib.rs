//! World systems for the Kindling simulation.
//!
//! This crate owns everything about the settlement's surroundings: the
//! season clock, the bonfire, the buildings standing around it, and the
//! random events that reach it from outside.
//!
//! # Modules
//!
//! - [`calendar`] -- Season clock with lossless overflow carry and the
//!   per-season multiplier table
//! - [`bonfire`] -- Fuel counter, three-state status, stoking
//! - [`buildings`] -- Blueprint table, exponential costs, aggregate bonuses
//! - [`specials`] -- Per-tick building effects (traps, conversions, passives)
//! - [`events`] -- Scouting and world events, temporary effect pruning
//! - [`dice`] -- Weighted tables and chance rolls over a seeded RNG
//! - [`error`] -- Configuration validation errors

pub mod bonfire;
pub mod buildings;
pub mod calendar;
pub mod dice;
pub mod error;
pub mod events;
pub mod specials;

pub use bonfire::{Bonfire, BonfireConfig, BonfireTick};
pub use buildings::{BuildOutcome, BuildRefusal, BuildingRegistry, blueprint};
pub use calendar::{CalendarConfig, SeasonChange, SeasonClock, SeasonMultipliers};
pub use error::WorldError;
pub use events::{EventResolution, EventsConfig, ExplorationResolution};
pub use specials::{SpecialsConfig, SpecialsReport};
