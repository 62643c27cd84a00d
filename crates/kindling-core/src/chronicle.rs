//! The player-facing chronicle and its pluggable message selection.
//!
//! Simulation code never writes prose. It reports a [`ChronicleEvent`];
//! a [`Chronicler`] turns the event into display text, and the bounded
//! [`Chronicle`] keeps the most recent entries. Swapping the chronicler
//! changes every message without touching the simulation.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use kindling_ledger::Quantity;
use kindling_types::{
    BonfireStatus, BuildingKind, Era, ExplorationOutcome, LogCategory, LogEntry, MortalityCause,
    Season, TechKind, WorldEventKind,
};

/// Something worth telling the player about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChronicleEvent {
    /// A new season began.
    SeasonChanged(Season),
    /// The bonfire moved into a new status.
    BonfireChanged(BonfireStatus),
    /// A building was completed.
    Built(BuildingKind),
    /// A technology was researched.
    Researched(TechKind),
    /// Settlers were born.
    Births(u32),
    /// Settlers died.
    Deaths {
        /// What killed them.
        cause: MortalityCause,
        /// How many died.
        count: u32,
    },
    /// Burial rites turned the dead into culture.
    Remembered(Quantity),
    /// Scouts came back.
    Exploration(ExplorationOutcome),
    /// A world event struck.
    WorldEvent(WorldEventKind),
    /// Settlers arrived from outside.
    Arrivals(u32),
    /// The wonder of an era was raised.
    EraCompleted(Era),
    /// The settlement entered a new era.
    EraAdvanced(Era),
    /// The crown paid for a festival.
    FestivalHeld,
}

impl ChronicleEvent {
    /// Display category of the event.
    pub const fn category(&self) -> LogCategory {
        match self {
            Self::SeasonChanged(_) => LogCategory::Season,
            Self::BonfireChanged(_) => LogCategory::Bonfire,
            Self::Built(_) | Self::Researched(_) => LogCategory::Progress,
            Self::Births(_) | Self::Deaths { .. } | Self::Remembered(_) | Self::Arrivals(_) => {
                LogCategory::Population
            }
            Self::Exploration(_) | Self::WorldEvent(_) => LogCategory::Event,
            Self::EraCompleted(_) | Self::EraAdvanced(_) => LogCategory::Milestone,
            Self::FestivalHeld => LogCategory::Economy,
        }
    }
}

/// Turns events into display text.
///
/// `roll` is a uniformly random number drawn from the game's seeded
/// source; implementations use it to pick among alternatives so replays
/// produce the same text.
pub trait Chronicler {
    /// Text for `event`.
    fn describe(&self, event: &ChronicleEvent, roll: u32) -> String;
}

/// The built-in message pools.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultChronicler;

impl DefaultChronicler {
    /// Create the default chronicler.
    pub const fn new() -> Self {
        Self
    }
}

/// Pick one line from a pool.
fn pick(pool: &[&str], roll: u32) -> String {
    let len = u32::try_from(pool.len()).unwrap_or(u32::MAX).max(1);
    let index = usize::try_from(roll.checked_rem(len).unwrap_or(0)).unwrap_or(0);
    pool.get(index).copied().unwrap_or_default().to_owned()
}

impl Chronicler for DefaultChronicler {
    #[allow(clippy::too_many_lines)]
    fn describe(&self, event: &ChronicleEvent, roll: u32) -> String {
        match *event {
            ChronicleEvent::SeasonChanged(season) => match season {
                Season::Spring => pick(
                    &["The snow melts. Spring has come.", "Green shoots break the thawing ground."],
                    roll,
                ),
                Season::Summer => pick(
                    &["Summer arrives, long and warm.", "The days stretch out. It is summer."],
                    roll,
                ),
                Season::Autumn => pick(
                    &["The leaves turn. Autumn is here.", "A chill creeps into the evenings."],
                    roll,
                ),
                Season::Winter => pick(
                    &["Winter sets in. Keep the fire fed.", "Frost bites. The long cold begins."],
                    roll,
                ),
            },
            ChronicleEvent::BonfireChanged(status) => match status {
                BonfireStatus::Burning => pick(&["The fire roars back to life."], roll),
                BonfireStatus::LowFuel => pick(
                    &["The fire is burning low.", "Embers glow where flames once danced."],
                    roll,
                ),
                BonfireStatus::Extinguished => pick(
                    &["The fire has gone out.", "Darkness falls over the camp. The fire is dead."],
                    roll,
                ),
            },
            ChronicleEvent::Built(kind) => format!("A new {kind:?} stands complete."),
            ChronicleEvent::Researched(kind) => format!("The people have learned {kind:?}."),
            ChronicleEvent::Births(1) => pick(
                &["A child is born.", "A newborn's cry rings out across the camp."],
                roll,
            ),
            ChronicleEvent::Births(count) => format!("{count} children are born."),
            ChronicleEvent::Deaths { cause, count } => match cause {
                MortalityCause::Starvation => {
                    format!("Hunger claims {count} of the settlers.")
                }
                MortalityCause::Freezing => {
                    format!("The cold takes {count} in the night.")
                }
            },
            ChronicleEvent::Remembered(culture) => {
                format!("The fallen are laid to rest. Tradition grows by {culture}.")
            }
            ChronicleEvent::Exploration(outcome) => match outcome {
                ExplorationOutcome::Nothing => pick(
                    &["The scouts return empty-handed.", "The scouts found nothing of note."],
                    roll,
                ),
                ExplorationOutcome::ResourceFind => pick(
                    &["The scouts return laden with materials.", "A cache is found beyond the ridge."],
                    roll,
                ),
                ExplorationOutcome::SurvivorFound => pick(
                    &["The scouts bring back a lost wanderer.", "A survivor is found and joins the camp."],
                    roll,
                ),
            },
            ChronicleEvent::WorldEvent(kind) => match kind {
                WorldEventKind::Calm => pick(&["The days pass quietly."], roll),
                WorldEventKind::BountifulHarvest => pick(
                    &["The land is generous this year.", "Berries and roots are everywhere."],
                    roll,
                ),
                WorldEventKind::Blizzard => {
                    pick(&["A blizzard howls through the camp. The fire hungers."], roll)
                }
                WorldEventKind::Wanderers => pick(
                    &["Wanderers approach the firelight.", "Strangers ask to share the fire."],
                    roll,
                ),
                WorldEventKind::WolfAttack => {
                    pick(&["Wolves raid the meat stores in the night."], roll)
                }
                WorldEventKind::Sickness => pick(&["A sickness spreads. Work slows."], roll),
                WorldEventKind::Celebration => {
                    pick(&["The kingdom celebrates. Spirits are high."], roll)
                }
                WorldEventKind::Bandits => pick(&["Bandits raid the treasury."], roll),
                WorldEventKind::Festival => pick(&["Music and feasting fill the streets."], roll),
            },
            ChronicleEvent::Arrivals(1) => pick(&["A newcomer joins the settlement."], roll),
            ChronicleEvent::Arrivals(count) => format!("{count} newcomers join the settlement."),
            ChronicleEvent::EraCompleted(era) => match era {
                Era::Tribal => pick(&["The Monolith rises. A new age beckons."], roll),
                Era::Kingdom => pick(&["The Great Hall is complete. The kingdom endures."], roll),
            },
            ChronicleEvent::EraAdvanced(era) => match era {
                Era::Tribal => pick(&["The tribe gathers around the fire."], roll),
                Era::Kingdom => pick(&["The tribe becomes a kingdom."], roll),
            },
            ChronicleEvent::FestivalHeld => pick(
                &["A festival is declared.", "The crown opens its coffers for a festival."],
                roll,
            ),
        }
    }
}

/// Bounded tail of log entries, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chronicle {
    /// Retained entries.
    entries: VecDeque<LogEntry>,
    /// Most entries retained.
    capacity: usize,
}

impl Chronicle {
    /// An empty chronicle retaining at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Append an entry, trimming the oldest beyond capacity.
    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Describe `event` with `chronicler` and append it.
    pub fn record(
        &mut self,
        tick: u64,
        day: Quantity,
        event: &ChronicleEvent,
        chronicler: &dyn Chronicler,
        roll: u32,
    ) {
        let message = chronicler.describe(event, roll);
        tracing::debug!(tick, category = ?event.category(), text = %message, "Chronicle entry");
        self.push(LogEntry {
            tick,
            day,
            category: event.category(),
            message,
        });
    }

    /// Retained entries, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most entries retained.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    struct Plain;

    impl Chronicler for Plain {
        fn describe(&self, event: &ChronicleEvent, _roll: u32) -> String {
            format!("{event:?}")
        }
    }

    #[test]
    fn trims_oldest_beyond_capacity() {
        let mut chronicle = Chronicle::new(3);
        for tick in 0..5 {
            chronicle.record(tick, Decimal::ZERO, &ChronicleEvent::Births(1), &Plain, 0);
        }
        assert_eq!(chronicle.len(), 3);
        let ticks: Vec<u64> = chronicle.entries().iter().map(|entry| entry.tick).collect();
        assert_eq!(ticks, vec![2, 3, 4]);
    }

    #[test]
    fn pluggable_chronicler_controls_text() {
        let mut chronicle = Chronicle::new(5);
        chronicle.record(1, Decimal::ONE, &ChronicleEvent::FestivalHeld, &Plain, 7);
        let entry = chronicle.entries().pop().unwrap();
        assert_eq!(entry.message, "FestivalHeld");
        assert_eq!(entry.category, LogCategory::Economy);
    }

    #[test]
    fn default_pools_pick_by_roll() {
        let chronicler = DefaultChronicler::new();
        let event = ChronicleEvent::BonfireChanged(BonfireStatus::Extinguished);
        assert_eq!(chronicler.describe(&event, 0), "The fire has gone out.");
        assert_ne!(chronicler.describe(&event, 1), chronicler.describe(&event, 0));
        assert_eq!(chronicler.describe(&event, 2), chronicler.describe(&event, 0));
    }

    #[test]
    fn counts_appear_in_text() {
        let chronicler = DefaultChronicler::new();
        let text = chronicler.describe(
            &ChronicleEvent::Deaths {
                cause: MortalityCause::Freezing,
                count: 3,
            },
            0,
        );
        assert!(text.contains('3'));
    }
}
