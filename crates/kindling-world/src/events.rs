//! Random event engine: scouting expeditions and periodic world events.
//!
//! Two timers drive this module. Every `exploration_interval_ticks` the
//! settlement's scouts (if any) return with a weighted outcome; every
//! `world_event_interval_ticks` a world event is drawn from a table filtered
//! by era and season.
//!
//! Rolling an event only *describes* what happens. The caller applies the
//! returned [`EventResolution`] to its stores, so population caps and
//! logging stay in one place.

use rand::Rng;
use rust_decimal::Decimal;
use serde::Deserialize;

use kindling_ledger::{CostMap, ResourceStore, quantity};
use kindling_types::{
    Era, ExplorationOutcome, ResourceKind, Season, TemporaryEffect, TemporaryEffectKind,
    WorldEventKind,
};

use crate::dice::{self, WeightTable};
use crate::error::WorldError;

/// Event timing and weights.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Ticks between scouting rolls.
    pub exploration_interval_ticks: u64,
    /// Ticks between world-event rolls.
    pub world_event_interval_ticks: u64,
    /// Base weight of an empty-handed expedition.
    pub nothing_weight: u32,
    /// Base weight of a resource find.
    pub resource_find_weight: u32,
    /// Extra resource-find weight per scout.
    pub resource_find_per_scout: u32,
    /// Base weight of finding a survivor.
    pub survivor_weight: u32,
    /// Extra survivor weight per scout.
    pub survivor_per_scout: u32,
    /// Smallest amount a resource find yields.
    pub resource_find_min: u32,
    /// Largest amount a resource find yields.
    pub resource_find_max: u32,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            exploration_interval_ticks: 50,
            world_event_interval_ticks: 600,
            nothing_weight: 50,
            resource_find_weight: 35,
            resource_find_per_scout: 2,
            survivor_weight: 15,
            survivor_per_scout: 1,
            resource_find_min: 5,
            resource_find_max: 20,
        }
    }
}

impl EventsConfig {
    /// Check intervals and ranges.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidConfig`] for a zero interval or an
    /// inverted resource-find range.
    pub fn validate(&self) -> Result<(), WorldError> {
        if self.exploration_interval_ticks == 0 || self.world_event_interval_ticks == 0 {
            return Err(WorldError::InvalidConfig {
                reason: "events intervals must be at least one tick".to_owned(),
            });
        }
        if self.resource_find_min > self.resource_find_max {
            return Err(WorldError::InvalidConfig {
                reason: "events.resource_find_min must not exceed resource_find_max".to_owned(),
            });
        }
        Ok(())
    }
}

/// Whether a periodic roll is due on `tick`. Tick zero never fires.
pub fn is_due(tick: u64, interval: u64) -> bool {
    tick > 0 && tick.checked_rem(interval).is_some_and(|rem| rem == 0)
}

/// The concrete consequences of a rolled event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventResolution {
    /// What happened.
    pub kind: WorldEventKind,
    /// Resources to add.
    pub gains: CostMap,
    /// Resources to remove.
    pub losses: CostMap,
    /// Settlers asking to join (subject to the population cap).
    pub settlers_joined: u32,
    /// A timed modifier to schedule.
    pub temporary: Option<TemporaryEffect>,
}

impl EventResolution {
    fn quiet(kind: WorldEventKind) -> Self {
        Self {
            kind,
            gains: CostMap::new(),
            losses: CostMap::new(),
            settlers_joined: 0,
            temporary: None,
        }
    }

    fn with_effect(
        kind: WorldEventKind,
        effect: TemporaryEffectKind,
        magnitude: Decimal,
        tick: u64,
        duration: u64,
    ) -> Self {
        Self {
            temporary: Some(TemporaryEffect {
                kind: effect,
                magnitude,
                expires_at_tick: tick.saturating_add(duration),
                source: kind,
            }),
            ..Self::quiet(kind)
        }
    }
}

/// The consequences of a scouting expedition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorationResolution {
    /// What the scouts found.
    pub outcome: ExplorationOutcome,
    /// Materials brought back.
    pub gains: CostMap,
    /// Survivors found (subject to the population cap).
    pub settlers_joined: u32,
}

/// Exploration weights for a given number of scouts.
pub fn exploration_table(scouts: u32, config: &EventsConfig) -> WeightTable<ExplorationOutcome> {
    WeightTable::new(vec![
        (ExplorationOutcome::Nothing, config.nothing_weight),
        (
            ExplorationOutcome::ResourceFind,
            config
                .resource_find_weight
                .saturating_add(scouts.saturating_mul(config.resource_find_per_scout)),
        ),
        (
            ExplorationOutcome::SurvivorFound,
            config
                .survivor_weight
                .saturating_add(scouts.saturating_mul(config.survivor_per_scout)),
        ),
    ])
}

/// Send the scouts out. Returns `None` when there are no scouts.
pub fn explore(
    scouts: u32,
    rng: &mut impl Rng,
    config: &EventsConfig,
) -> Option<ExplorationResolution> {
    if scouts == 0 {
        return None;
    }
    let outcome = exploration_table(scouts, config)
        .roll(rng)
        .unwrap_or(ExplorationOutcome::Nothing);

    let mut resolution = ExplorationResolution {
        outcome,
        gains: CostMap::new(),
        settlers_joined: 0,
    };
    match outcome {
        ExplorationOutcome::Nothing => {}
        ExplorationOutcome::ResourceFind => {
            let finds = [ResourceKind::Wood, ResourceKind::Stone, ResourceKind::Skins];
            let pick = dice::roll_between(rng, 0, 2);
            let resource = finds
                .get(usize::try_from(pick).unwrap_or(0))
                .copied()
                .unwrap_or(ResourceKind::Wood);
            let amount = dice::roll_between(rng, config.resource_find_min, config.resource_find_max);
            resolution.gains.insert(resource, quantity::from_count(amount));
        }
        ExplorationOutcome::SurvivorFound => resolution.settlers_joined = 1,
    }
    tracing::debug!(scouts, ?outcome, "Exploration resolved");
    Some(resolution)
}

/// World-event weights available in `era` during `season`.
pub fn world_event_table(era: Era, season: Season) -> WeightTable<WorldEventKind> {
    let mut entries = vec![
        (WorldEventKind::Calm, 40),
        (WorldEventKind::BountifulHarvest, 15),
        (WorldEventKind::Wanderers, 10),
        (WorldEventKind::WolfAttack, 10),
        (WorldEventKind::Sickness, 10),
    ];
    if season == Season::Winter {
        entries.push((WorldEventKind::Blizzard, 10));
    }
    if era == Era::Kingdom {
        entries.push((WorldEventKind::Celebration, 10));
        entries.push((WorldEventKind::Bandits, 10));
    }
    WeightTable::new(entries)
}

/// Roll and resolve one world event.
///
/// `store` is read to size losses; it is not modified.
pub fn roll_world_event(
    era: Era,
    season: Season,
    tick: u64,
    store: &ResourceStore,
    rng: &mut impl Rng,
) -> EventResolution {
    let kind = world_event_table(era, season)
        .roll(rng)
        .unwrap_or(WorldEventKind::Calm);
    let resolution = resolve_world_event(kind, tick, store, rng);
    tracing::debug!(tick, ?kind, "World event rolled");
    resolution
}

/// Describe the consequences of a specific world event.
pub fn resolve_world_event(
    kind: WorldEventKind,
    tick: u64,
    store: &ResourceStore,
    rng: &mut impl Rng,
) -> EventResolution {
    match kind {
        WorldEventKind::Calm | WorldEventKind::Festival => EventResolution::quiet(kind),
        WorldEventKind::BountifulHarvest => EventResolution::with_effect(
            kind,
            TemporaryEffectKind::FoodProduction,
            Decimal::new(15, 1),
            tick,
            600,
        ),
        WorldEventKind::Blizzard => EventResolution::with_effect(
            kind,
            TemporaryEffectKind::FuelConsumption,
            Decimal::new(15, 1),
            tick,
            300,
        ),
        WorldEventKind::Sickness => EventResolution::with_effect(
            kind,
            TemporaryEffectKind::AllProduction,
            Decimal::new(8, 1),
            tick,
            300,
        ),
        WorldEventKind::Celebration => EventResolution::with_effect(
            kind,
            TemporaryEffectKind::Happiness,
            Decimal::TEN,
            tick,
            600,
        ),
        WorldEventKind::Wanderers => EventResolution {
            settlers_joined: dice::roll_between(rng, 1, 2),
            ..EventResolution::quiet(kind)
        },
        WorldEventKind::WolfAttack => {
            let share = dice::roll_percent(rng, 20, 50);
            let lost = store.amount(ResourceKind::Meat).saturating_mul(share);
            EventResolution {
                losses: CostMap::from([(ResourceKind::Meat, lost)]),
                ..EventResolution::quiet(kind)
            }
        }
        WorldEventKind::Bandits => {
            let share = dice::roll_percent(rng, 10, 25);
            let lost = store.amount(ResourceKind::Gold).saturating_mul(share);
            EventResolution {
                losses: CostMap::from([(ResourceKind::Gold, lost)]),
                ..EventResolution::quiet(kind)
            }
        }
    }
}

/// Drop every temporary effect that has expired by `tick`.
///
/// Returns the number of effects removed.
pub fn prune_expired(effects: &mut Vec<TemporaryEffect>, tick: u64) -> usize {
    let before = effects.len();
    effects.retain(|effect| effect.is_active(tick));
    before.saturating_sub(effects.len())
}
