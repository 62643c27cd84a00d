//! The read-only view handed to the UI after each settled tick.
//!
//! A [`GameSnapshot`] is a plain owned copy; nothing in it aliases the live
//! simulation state, so a renderer can hold it across frames.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::effects::TemporaryEffect;
use crate::enums::{
    BonfireStatus, BuildingKind, Era, HappinessTier, Job, LogCategory, ResourceKind, Season,
    SocialClass, TechKind,
};

/// One player-facing chronicle line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LogEntry {
    /// Tick at which the entry was written.
    pub tick: u64,
    /// Calendar day at which the entry was written.
    #[ts(as = "String")]
    pub day: Decimal,
    /// Entry category.
    pub category: LogCategory,
    /// Display text.
    pub message: String,
}

/// Calendar portion of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CalendarView {
    /// Current season.
    pub season: Season,
    /// Days elapsed within the season.
    #[ts(as = "String")]
    pub day_in_season: Decimal,
    /// Days elapsed since the game started.
    #[ts(as = "String")]
    pub total_days: Decimal,
    /// Progress through the season, 0 to 100.
    #[ts(as = "String")]
    pub progress_pct: Decimal,
}

/// Bonfire portion of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BonfireView {
    /// Remaining fuel.
    #[ts(as = "String")]
    pub fuel: Decimal,
    /// Fuel capacity.
    #[ts(as = "String")]
    pub max_fuel: Decimal,
    /// Derived status.
    pub status: BonfireStatus,
    /// Whether wood is fed automatically.
    pub auto_refuel: bool,
}

/// Population portion of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PopulationView {
    /// Living settlers.
    pub settlers: u32,
    /// Settlers with no job or class.
    pub idle: u32,
    /// Housing capacity.
    pub max_population: u32,
    /// Progress toward the next birth, 0 to 1.
    #[ts(as = "String")]
    pub growth_progress: Decimal,
    /// Tribal-era job assignments.
    pub jobs: BTreeMap<Job, u32>,
    /// Kingdom-era class assignments.
    pub classes: BTreeMap<SocialClass, u32>,
    /// Jobs currently open for assignment.
    pub unlocked_jobs: Vec<Job>,
}

/// Kingdom economy portion of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EconomyView {
    /// Current happiness, 0 to 100.
    #[ts(as = "String")]
    pub happiness: Decimal,
    /// Happiness the kingdom is drifting toward.
    #[ts(as = "String")]
    pub target_happiness: Decimal,
    /// Discretized happiness.
    pub tier: HappinessTier,
    /// Production multiplier for the current tier.
    #[ts(as = "String")]
    pub efficiency: Decimal,
    /// Current tax rate.
    #[ts(as = "String")]
    pub tax_rate: Decimal,
    /// Gold collected on the most recent tick.
    #[ts(as = "String")]
    pub last_tax_income: Decimal,
}

/// Immutable view of the whole settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GameSnapshot {
    /// Ticks simulated so far.
    pub tick: u64,
    /// Whether the scheduler is running.
    pub running: bool,
    /// Simulation speed factor.
    pub speed: u32,
    /// Current era.
    pub era: Era,
    /// Whether the current era's wonder is complete.
    pub era_completed: bool,
    /// Stored amount per resource.
    #[ts(as = "BTreeMap<ResourceKind, String>")]
    pub resources: BTreeMap<ResourceKind, Decimal>,
    /// Cap per resource; `None` means unlimited.
    #[ts(as = "BTreeMap<ResourceKind, Option<String>>")]
    pub storage_caps: BTreeMap<ResourceKind, Option<Decimal>>,
    /// Calendar state.
    pub calendar: CalendarView,
    /// Population state.
    pub population: PopulationView,
    /// Researched technologies.
    pub researched: Vec<TechKind>,
    /// Count per building kind.
    pub buildings: BTreeMap<BuildingKind, u32>,
    /// Bonfire state.
    pub bonfire: BonfireView,
    /// Tax and happiness figures.
    pub economy: EconomyView,
    /// Active temporary effects.
    pub temporary_effects: Vec<TemporaryEffect>,
    /// Most recent chronicle entries, oldest first.
    pub log: Vec<LogEntry>,
}
