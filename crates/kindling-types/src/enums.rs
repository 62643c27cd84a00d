//! Enumeration types for the Kindling simulation.
//!
//! Every closed set the simulation reasons about lives here: resources,
//! seasons, eras, jobs, social classes, buildings, technologies, and the
//! outcome kinds the event engine can roll.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// A resource held in the settlement's stores.
///
/// The first eight kinds exist from the start of the tribal era; the
/// remainder appear once the settlement becomes a kingdom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ResourceKind {
    // --- Era 1 ---
    /// Plain food gathered from the land.
    Food,
    /// Lumber; also the bonfire's fuel source.
    Wood,
    /// Quarried stone.
    Stone,
    /// Animal hides.
    Skins,
    /// Raw meat from hunting and traps. Spoils slowly.
    Meat,
    /// Smoked meat, worth five units of plain food.
    CuredMeat,
    /// Knowledge produced by idle settlers, spent on technology.
    Ideas,
    /// Tradition accumulated through shrines and burial rites.
    Culture,

    // --- Era 2 ---
    /// Coin collected through taxes and trade.
    Gold,
    /// Harvested grain.
    Grain,
    /// Baked bread, a second food kind for a varied diet.
    Bread,
    /// Sawn planks.
    Planks,
    /// Forged tools.
    Tools,
}

impl ResourceKind {
    /// Every resource kind, in declaration order.
    pub const ALL: [Self; 13] = [
        Self::Food,
        Self::Wood,
        Self::Stone,
        Self::Skins,
        Self::Meat,
        Self::CuredMeat,
        Self::Ideas,
        Self::Culture,
        Self::Gold,
        Self::Grain,
        Self::Bread,
        Self::Planks,
        Self::Tools,
    ];

    /// The era in which this resource first becomes relevant.
    pub const fn era(self) -> Era {
        match self {
            Self::Food
            | Self::Wood
            | Self::Stone
            | Self::Skins
            | Self::Meat
            | Self::CuredMeat
            | Self::Ideas
            | Self::Culture => Era::Tribal,
            Self::Gold | Self::Grain | Self::Bread | Self::Planks | Self::Tools => Era::Kingdom,
        }
    }
}

// ---------------------------------------------------------------------------
// Seasons and eras
// ---------------------------------------------------------------------------

/// The current season of the settlement's calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Season {
    /// Food +25%.
    Spring,
    /// Food +50%, stone +25%, skins -25%.
    Summer,
    /// Wood and skins +25%.
    Autumn,
    /// Food -90%, stone -50%, fuel burns twice as fast.
    Winter,
}

impl Season {
    /// All seasons in calendar order.
    pub const ALL: [Self; 4] = [Self::Spring, Self::Summer, Self::Autumn, Self::Winter];

    /// The season that follows this one in the yearly cycle.
    pub const fn next(self) -> Self {
        match self {
            Self::Spring => Self::Summer,
            Self::Summer => Self::Autumn,
            Self::Autumn => Self::Winter,
            Self::Winter => Self::Spring,
        }
    }
}

/// A gameplay phase that unlocks a different economic layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Era {
    /// Bands of settlers around a bonfire; jobs and manual gathering.
    Tribal,
    /// A taxed kingdom organised into social classes.
    Kingdom,
}

/// Derived state of the central bonfire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum BonfireStatus {
    /// Fuel above the low-fuel threshold.
    Burning,
    /// Fuel positive but at or below the low-fuel threshold.
    LowFuel,
    /// No fuel left; a severe production penalty applies.
    Extinguished,
}

// ---------------------------------------------------------------------------
// Workforce
// ---------------------------------------------------------------------------

/// A tribal-era job a settler can be assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Job {
    /// Collects plain food.
    Gatherer,
    /// Cuts wood.
    Woodcutter,
    /// Hunts for meat and skins. Unlocked by Hunting.
    Hunter,
    /// Quarries stone. Unlocked by Masonry.
    StoneCutter,
    /// Explores the surroundings, finding resources and survivors.
    Scout,
}

impl Job {
    /// All jobs in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Gatherer,
        Self::Woodcutter,
        Self::Hunter,
        Self::StoneCutter,
        Self::Scout,
    ];

    /// Whether the job is available without any research.
    pub const fn unlocked_by_default(self) -> bool {
        matches!(self, Self::Gatherer | Self::Woodcutter | Self::Scout)
    }
}

/// A kingdom-era social class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum SocialClass {
    /// Farms food and grain.
    Peasant,
    /// Turns wood into planks.
    Artisan,
    /// Trades for gold and pays the most tax per head after nobles.
    Merchant,
    /// Patronises culture.
    Noble,
}

impl SocialClass {
    /// All classes in declaration order.
    pub const ALL: [Self; 4] = [Self::Peasant, Self::Artisan, Self::Merchant, Self::Noble];
}

// ---------------------------------------------------------------------------
// Buildings and technologies
// ---------------------------------------------------------------------------

/// Broad category of a building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum BuildingCategory {
    /// Raises the population cap.
    Housing,
    /// Raises storage caps.
    Storage,
    /// Produces or converts resources.
    Production,
    /// Culture and happiness.
    Civic,
    /// Unique; completing it ends the current era.
    Wonder,
}

/// A building type the settlement can construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum BuildingKind {
    // --- Era 1 ---
    /// Shelter for two more settlers.
    Hut,
    /// Extra wood, stone, and skin storage.
    Storehouse,
    /// Extra food and meat storage.
    Granary,
    /// Occasionally catches game.
    Trap,
    /// Cures raw meat.
    Smokehouse,
    /// Produces culture.
    Shrine,
    /// Turns the dead into tradition.
    BurialMound,
    /// Tribal-era wonder.
    Monolith,

    // --- Era 2 ---
    /// Shelter for four more subjects.
    House,
    /// Grows grain.
    Farm,
    /// Bakes grain into bread.
    Bakery,
    /// Saws wood into planks.
    Sawmill,
    /// Forges stone into tools.
    Smithy,
    /// Storage for kingdom goods.
    Warehouse,
    /// Raises tax yield.
    Market,
    /// Keeps subjects cheerful.
    Tavern,
    /// Kingdom-era wonder.
    GreatHall,
}

impl BuildingKind {
    /// Every building kind, in declaration order.
    pub const ALL: [Self; 17] = [
        Self::Hut,
        Self::Storehouse,
        Self::Granary,
        Self::Trap,
        Self::Smokehouse,
        Self::Shrine,
        Self::BurialMound,
        Self::Monolith,
        Self::House,
        Self::Farm,
        Self::Bakery,
        Self::Sawmill,
        Self::Smithy,
        Self::Warehouse,
        Self::Market,
        Self::Tavern,
        Self::GreatHall,
    ];
}

/// A researchable technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TechKind {
    // --- Era 1 ---
    /// Slower fuel burn.
    FireKeeping,
    /// Better gathering.
    Foraging,
    /// Unlocks hunters.
    Hunting,
    /// Unlocks traps.
    Trapping,
    /// Unlocks smokehouses.
    Smoking,
    /// Unlocks stone cutters; doubles manual quarrying.
    Masonry,
    /// Better woodcutting.
    Axes,
    /// More ideas; unlocks shrines.
    Storytelling,
    /// Unlocks burial mounds.
    Rituals,
    /// Unlocks the Monolith.
    Monuments,

    // --- Era 2 ---
    /// Better peasant yield.
    Agriculture,
    /// Unlocks bakeries.
    Milling,
    /// Better artisan yield.
    Carpentry,
    /// Unlocks smithies.
    Metallurgy,
    /// Better merchant yield; unlocks markets.
    Currency,
    /// Unlocks the Great Hall.
    Architecture,
}

impl TechKind {
    /// Every technology, in declaration order.
    pub const ALL: [Self; 16] = [
        Self::FireKeeping,
        Self::Foraging,
        Self::Hunting,
        Self::Trapping,
        Self::Smoking,
        Self::Masonry,
        Self::Axes,
        Self::Storytelling,
        Self::Rituals,
        Self::Monuments,
        Self::Agriculture,
        Self::Milling,
        Self::Carpentry,
        Self::Metallurgy,
        Self::Currency,
        Self::Architecture,
    ];
}

/// A named multiplier that technologies can scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ModifierKey {
    /// Output of the given job.
    JobOutput(Job),
    /// Output of the given social class.
    ClassOutput(SocialClass),
    /// Yield of a manual action.
    Manual(ManualAction),
    /// Idea generation by idle settlers.
    IdeaGeneration,
    /// Bonfire fuel consumption.
    FuelConsumption,
}

/// A hands-on action the player performs directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ManualAction {
    /// Forage for one unit of food.
    Forage,
    /// Chop one unit of wood.
    ChopWood,
    /// Quarry one unit of stone.
    QuarryStone,
}

// ---------------------------------------------------------------------------
// Events and mortality
// ---------------------------------------------------------------------------

/// A world event the random event engine can roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum WorldEventKind {
    /// Nothing happens.
    Calm,
    /// Food production boosted for a while.
    BountifulHarvest,
    /// Winter storm; the fire burns faster.
    Blizzard,
    /// A few wanderers ask to join.
    Wanderers,
    /// Wolves raid the meat stores.
    WolfAttack,
    /// Illness slows all work.
    Sickness,
    /// A kingdom-wide celebration lifts spirits.
    Celebration,
    /// Bandits steal from the treasury.
    Bandits,
    /// A festival paid for by the crown.
    Festival,
}

/// The outcome of a scouting expedition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ExplorationOutcome {
    /// The scouts return empty-handed.
    Nothing,
    /// The scouts bring back materials.
    ResourceFind,
    /// The scouts find a survivor who joins the settlement.
    SurvivorFound,
}

/// Why settlers died.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum MortalityCause {
    /// All food-equivalent stores ran out.
    Starvation,
    /// Winter with no wood left.
    Freezing,
}

/// Discretized happiness level of the kingdom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum HappinessTier {
    /// Below 20. Subjects refuse to work.
    Rebellious,
    /// 20 to 40.
    Unhappy,
    /// 40 to 60.
    Content,
    /// 60 to 80.
    Happy,
    /// 80 and above.
    Ecstatic,
}

/// Category of a player-facing chronicle entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum LogCategory {
    /// Calendar changes.
    Season,
    /// Bonfire status changes.
    Bonfire,
    /// Construction and research.
    Progress,
    /// Births, deaths, arrivals.
    Population,
    /// Random events and exploration.
    Event,
    /// Era transitions and other milestones.
    Milestone,
    /// Taxes and happiness.
    Economy,
}
