//! Configuration loading and typed config structures for the Kindling
//! simulation.
//!
//! The canonical configuration lives in `kindling-config.yaml` at the
//! workspace root. Every section is optional and falls back to its
//! defaults, so an empty document is a valid configuration. Decimal values
//! may be written as strings (`"0.05"`) to keep them exact.
//!
//! Loading is two steps: deserialize with [`SimulationConfig::from_file`]
//! or [`SimulationConfig::parse`], then call [`SimulationConfig::validate`]
//! before constructing a game.

use std::collections::BTreeMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use kindling_ledger::{Quantity, StorageCap};
use kindling_settlement::{
    EconomyConfig, FoodConfig, IdeasConfig, PopulationConfig, ProductionConfig, SettlementError,
};
use kindling_types::ResourceKind;
use kindling_world::{BonfireConfig, CalendarConfig, EventsConfig, SpecialsConfig, WorldError};

/// Environment variable overriding `world.seed`.
pub const SEED_ENV: &str = "KINDLING_SEED";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value is out of its allowed range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

impl From<WorldError> for ConfigError {
    fn from(source: WorldError) -> Self {
        Self::Invalid {
            reason: source.to_string(),
        }
    }
}

impl From<SettlementError> for ConfigError {
    fn from(source: SettlementError) -> Self {
        Self::Invalid {
            reason: source.to_string(),
        }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `kindling-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Seed, timing, and log settings.
    #[serde(default)]
    pub world: WorldConfig,

    /// Storage caps and starting stock.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Season clock.
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Bonfire fuel model.
    #[serde(default)]
    pub bonfire: BonfireConfig,

    /// Growth and mortality.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Food demand.
    #[serde(default)]
    pub food: FoodConfig,

    /// Job, class, and manual output rates.
    #[serde(default)]
    pub production: ProductionConfig,

    /// Idea generation.
    #[serde(default)]
    pub ideas: IdeasConfig,

    /// Per-tick building effects.
    #[serde(default)]
    pub specials: SpecialsConfig,

    /// Exploration and world events.
    #[serde(default)]
    pub events: EventsConfig,

    /// Kingdom taxes and happiness.
    #[serde(default)]
    pub economy: EconomyConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `KINDLING_SEED`, when set to a valid integer, overrides
    /// `world.seed`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.world.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from `path`, or the defaults when no file exists
    /// there. `KINDLING_SEED` applies on both paths.
    ///
    /// # Errors
    ///
    /// Same as [`SimulationConfig::from_file`] when the file exists.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let seed = std::env::var(SEED_ENV).ok();
        Self::load_with_seed(path, seed.as_deref())
    }

    fn load_with_seed(path: &Path, seed: Option<&str>) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            Self::parse(&std::fs::read_to_string(path)?)?
        } else {
            tracing::info!(path = %path.display(), "Config file not found, using defaults");
            Self::default()
        };
        if let Some(raw) = seed {
            config.world.override_seed(raw);
        }
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// An empty document yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.world.validate()?;
        self.storage.validate()?;
        self.calendar.validate()?;
        self.bonfire.validate()?;
        self.population.validate()?;
        self.food.validate()?;
        self.production.validate()?;
        self.ideas.validate()?;
        self.specials.validate()?;
        self.events.validate()?;
        self.economy.validate()?;
        Ok(())
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Simulated milliseconds per tick at speed 1.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Most ticks a single frame may run before leftover time is dropped.
    #[serde(default = "default_max_catch_up_steps")]
    pub max_catch_up_steps: u32,

    /// Chronicle entries retained.
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            tick_interval_ms: default_tick_interval_ms(),
            max_catch_up_steps: default_max_catch_up_steps(),
            log_capacity: default_log_capacity(),
        }
    }
}

impl WorldConfig {
    /// Apply `KINDLING_SEED` if it is set and parses as an integer.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(raw) = std::env::var(SEED_ENV) {
            self.override_seed(&raw);
        }
    }

    fn override_seed(&mut self, raw: &str) {
        match raw.trim().parse::<u64>() {
            Ok(seed) => self.seed = seed,
            Err(e) => tracing::warn!(value = raw, error = %e, "Ignoring unparsable {SEED_ENV}"),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(invalid("world.tick_interval_ms must be at least 1"));
        }
        if self.max_catch_up_steps == 0 {
            return Err(invalid("world.max_catch_up_steps must be at least 1"));
        }
        if self.log_capacity == 0 {
            return Err(invalid("world.log_capacity must be at least 1"));
        }
        Ok(())
    }
}

/// Base storage caps and the stock a new game starts with.
///
/// Resources absent from `base_caps` are unlimited.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Cap per resource before any building bonus.
    pub base_caps: BTreeMap<ResourceKind, Quantity>,
    /// Stock at the start of a new game.
    pub starting: BTreeMap<ResourceKind, Quantity>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let hundred = Decimal::ONE_HUNDRED;
        let two_hundred = Decimal::new(200, 0);
        Self {
            base_caps: BTreeMap::from([
                (ResourceKind::Food, two_hundred),
                (ResourceKind::Wood, two_hundred),
                (ResourceKind::Stone, two_hundred),
                (ResourceKind::Skins, hundred),
                (ResourceKind::Meat, hundred),
                (ResourceKind::CuredMeat, hundred),
                (ResourceKind::Gold, Decimal::new(500, 0)),
                (ResourceKind::Grain, two_hundred),
                (ResourceKind::Bread, two_hundred),
                (ResourceKind::Planks, two_hundred),
                (ResourceKind::Tools, hundred),
            ]),
            starting: BTreeMap::from([
                (ResourceKind::Food, Decimal::new(20, 0)),
                (ResourceKind::Wood, Decimal::new(20, 0)),
            ]),
        }
    }
}

impl StorageConfig {
    /// Base caps as store caps; unlisted resources are unlimited.
    pub fn caps(&self) -> BTreeMap<ResourceKind, StorageCap> {
        ResourceKind::ALL
            .iter()
            .map(|&kind| {
                let cap = self
                    .base_caps
                    .get(&kind)
                    .map_or(StorageCap::Unlimited, |&limit| StorageCap::Limited(limit));
                (kind, cap)
            })
            .collect()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.base_caps.values().any(|cap| *cap < Decimal::ZERO) {
            return Err(invalid("storage.base_caps must not be negative"));
        }
        if self.starting.values().any(|amount| *amount < Decimal::ZERO) {
            return Err(invalid("storage.starting must not be negative"));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_owned(),
    }
}

const fn default_seed() -> u64 {
    42
}

const fn default_tick_interval_ms() -> u64 {
    100
}

const fn default_max_catch_up_steps() -> u32 {
    50
}

const fn default_log_capacity() -> usize {
    50
}
