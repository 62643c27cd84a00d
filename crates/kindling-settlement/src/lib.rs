//! The people of the Kindling settlement.
//!
//! Everything here concerns the settlers themselves: what they know, what
//! they work at, how many of them there are, what they eat, and, once the
//! kingdom is founded, how they are taxed and how happy they are.
//!
//! # Modules
//!
//! - [`techs`] -- Technology tree, research, and aggregate multipliers
//! - [`workforce`] -- Job and social class assignment
//! - [`population`] -- Growth accumulator and rate-limited mortality
//! - [`consumption`] -- Food demand and tiered draw-down
//! - [`production`] -- Job, class, manual, and idea output
//! - [`economy`] -- Taxes, happiness, and efficiency
//! - [`error`] -- Configuration validation errors

pub mod consumption;
pub mod economy;
pub mod error;
pub mod population;
pub mod production;
pub mod techs;
pub mod workforce;

pub use consumption::{FoodConfig, MealReport};
pub use economy::{Economy, EconomyConfig, HappinessInputs};
pub use error::SettlementError;
pub use population::{GrowthConditions, Population, PopulationConfig};
pub use production::{IdeasConfig, OutputModifiers, ProductionConfig};
pub use techs::{ResearchRefusal, TechNode, TechRegistry, tech};
pub use workforce::Workforce;
