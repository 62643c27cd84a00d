//! Shared type definitions for the Kindling simulation.
//!
//! This crate is the single source of truth for the closed sets and view
//! types used across the workspace. Types that reach the UI derive `TS`
//! so `ts-rs` can emit `TypeScript` bindings.
//!
//! # Modules
//!
//! - [`enums`] -- Resources, seasons, eras, jobs, classes, buildings, techs
//! - [`effects`] -- The [`Effect`] sum type and temporary effects
//! - [`snapshot`] -- The [`GameSnapshot`] read view

pub mod effects;
pub mod enums;
pub mod snapshot;

// Re-export all public types at crate root for convenience.
pub use effects::{
    Effect, TemporaryEffect, TemporaryEffectKind, food_production_factor, fuel_factor,
    happiness_modifier, production_factor,
};
pub use enums::{
    BonfireStatus, BuildingCategory, BuildingKind, Era, ExplorationOutcome, HappinessTier, Job,
    LogCategory, ManualAction, ModifierKey, MortalityCause, ResourceKind, Season, SocialClass,
    TechKind, WorldEventKind,
};
pub use snapshot::{BonfireView, CalendarView, EconomyView, GameSnapshot, LogEntry, PopulationView};

#[cfg(test)]
mod tests {
    //! Binding generation for the UI-facing types.

    #[test]
    fn export_bindings() {
        use ts_rs::TS;

        let _ = crate::snapshot::GameSnapshot::export_all();
        let _ = crate::effects::TemporaryEffect::export_all();
        let _ = crate::enums::ManualAction::export_all();
    }
}
