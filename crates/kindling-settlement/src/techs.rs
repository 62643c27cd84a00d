//! Technology table and the researched-set registry.
//!
//! - [`tech`] returns the static node for each [`TechKind`]
//! - [`TechRegistry::check_research`] gates on era, prerequisites, ideas,
//!   and resource costs
//! - [`TechRegistry::research`] deducts the full cost and records the tech
//! - [`TechRegistry::multiplier`] folds every researched multiplier for a
//!   key into one factor
//!
//! A tech is never forgotten. Researching it again is refused, so its
//! effects can never stack with themselves.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kindling_ledger::{CostMap, Quantity, ResourceStore};
use kindling_types::{
    BuildingKind, Effect, Era, Job, ManualAction, ModifierKey, ResourceKind, SocialClass, TechKind,
};

// ---------------------------------------------------------------------------
// Tech table
// ---------------------------------------------------------------------------

/// Static definition of a technology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechNode {
    /// The technology this node describes.
    pub kind: TechKind,
    /// Era in which it becomes researchable.
    pub era: Era,
    /// Ideas spent to research it.
    pub idea_cost: Quantity,
    /// Other resources spent to research it.
    pub resource_cost: CostMap,
    /// Technologies that must be researched first.
    pub prerequisites: Vec<TechKind>,
    /// Permanent effects granted once researched.
    pub effects: Vec<Effect>,
}

impl TechNode {
    /// Full price including ideas.
    pub fn total_cost(&self) -> CostMap {
        let mut cost = self.resource_cost.clone();
        let ideas = cost.entry(ResourceKind::Ideas).or_insert(Decimal::ZERO);
        *ideas = ideas.saturating_add(self.idea_cost);
        cost
    }
}

const fn scale(key: ModifierKey, factor: Decimal) -> Effect {
    Effect::Multiplier { key, factor }
}

/// Return the canonical node for a [`TechKind`].
#[allow(clippy::too_many_lines)] // One arm per tech; the table reads best in one place.
pub fn tech(kind: TechKind) -> TechNode {
    let one_and_half = Decimal::new(15, 1);
    let one_and_quarter = Decimal::new(125, 2);

    let (era, ideas, resource_cost, prerequisites, effects): (_, i64, CostMap, Vec<TechKind>, _) =
        match kind {
            TechKind::FireKeeping => (
                Era::Tribal,
                10,
                CostMap::new(),
                vec![],
                vec![scale(ModifierKey::FuelConsumption, Decimal::new(75, 2))],
            ),
            TechKind::Foraging => (
                Era::Tribal,
                15,
                CostMap::new(),
                vec![],
                vec![
                    scale(ModifierKey::JobOutput(Job::Gatherer), one_and_half),
                    scale(ModifierKey::Manual(ManualAction::Forage), Decimal::TWO),
                ],
            ),
            TechKind::Hunting => (
                Era::Tribal,
                20,
                CostMap::from([(ResourceKind::Wood, Decimal::TEN)]),
                vec![],
                vec![Effect::UnlockJob(Job::Hunter)],
            ),
            TechKind::Trapping => (
                Era::Tribal,
                30,
                CostMap::from([(ResourceKind::Skins, Decimal::new(5, 0))]),
                vec![TechKind::Hunting],
                vec![Effect::UnlockBuilding(BuildingKind::Trap)],
            ),
            TechKind::Smoking => (
                Era::Tribal,
                40,
                CostMap::new(),
                vec![TechKind::Trapping],
                vec![Effect::UnlockBuilding(BuildingKind::Smokehouse)],
            ),
            TechKind::Masonry => (
                Era::Tribal,
                25,
                CostMap::new(),
                vec![],
                vec![
                    scale(ModifierKey::Manual(ManualAction::QuarryStone), Decimal::TWO),
                    Effect::UnlockJob(Job::StoneCutter),
                ],
            ),
            TechKind::Axes => (
                Era::Tribal,
                25,
                CostMap::from([(ResourceKind::Stone, Decimal::TEN)]),
                vec![],
                vec![
                    scale(ModifierKey::JobOutput(Job::Woodcutter), one_and_half),
                    scale(ModifierKey::Manual(ManualAction::ChopWood), Decimal::TWO),
                ],
            ),
            TechKind::Storytelling => (
                Era::Tribal,
                50,
                CostMap::new(),
                vec![],
                vec![
                    scale(ModifierKey::IdeaGeneration, one_and_quarter),
                    Effect::UnlockBuilding(BuildingKind::Shrine),
                ],
            ),
            TechKind::Rituals => (
                Era::Tribal,
                60,
                CostMap::from([(ResourceKind::Skins, Decimal::TEN)]),
                vec![TechKind::Storytelling],
                vec![Effect::UnlockBuilding(BuildingKind::BurialMound)],
            ),
            TechKind::Monuments => (
                Era::Tribal,
                100,
                CostMap::from([(ResourceKind::Stone, Decimal::new(30, 0))]),
                vec![TechKind::Masonry, TechKind::Rituals],
                vec![Effect::UnlockBuilding(BuildingKind::Monolith)],
            ),
            TechKind::Agriculture => (
                Era::Kingdom,
                60,
                CostMap::new(),
                vec![],
                vec![scale(ModifierKey::ClassOutput(SocialClass::Peasant), one_and_quarter)],
            ),
            TechKind::Milling => (
                Era::Kingdom,
                80,
                CostMap::from([(ResourceKind::Planks, Decimal::TEN)]),
                vec![TechKind::Agriculture],
                vec![Effect::UnlockBuilding(BuildingKind::Bakery)],
            ),
            TechKind::Carpentry => (
                Era::Kingdom,
                60,
                CostMap::new(),
                vec![],
                vec![scale(ModifierKey::ClassOutput(SocialClass::Artisan), one_and_quarter)],
            ),
            TechKind::Metallurgy => (
                Era::Kingdom,
                100,
                CostMap::from([(ResourceKind::Stone, Decimal::new(40, 0))]),
                vec![TechKind::Carpentry],
                vec![Effect::UnlockBuilding(BuildingKind::Smithy)],
            ),
            TechKind::Currency => (
                Era::Kingdom,
                80,
                CostMap::from([(ResourceKind::Gold, Decimal::new(20, 0))]),
                vec![],
                vec![
                    scale(ModifierKey::ClassOutput(SocialClass::Merchant), one_and_quarter),
                    Effect::UnlockBuilding(BuildingKind::Market),
                ],
            ),
            TechKind::Architecture => (
                Era::Kingdom,
                200,
                CostMap::from([(ResourceKind::Planks, Decimal::new(50, 0))]),
                vec![TechKind::Milling, TechKind::Metallurgy],
                vec![Effect::UnlockBuilding(BuildingKind::GreatHall)],
            ),
        };

    TechNode {
        kind,
        era,
        idea_cost: Decimal::from(ideas),
        resource_cost,
        prerequisites,
        effects,
    }
}

// ---------------------------------------------------------------------------
// TechRegistry
// ---------------------------------------------------------------------------

/// Why research was refused. Never surfaced as an error; used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResearchRefusal {
    /// Already in the researched set.
    AlreadyResearched,
    /// The tech belongs to a later era.
    WrongEra,
    /// A prerequisite is missing.
    MissingPrerequisite(TechKind),
    /// Ideas or resources fall short.
    Unaffordable,
}

/// The set of researched technologies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechRegistry {
    /// Every tech researched so far.
    researched: BTreeSet<TechKind>,
}

impl TechRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `kind` has been researched.
    pub fn is_researched(&self, kind: TechKind) -> bool {
        self.researched.contains(&kind)
    }

    /// Every researched tech, in enum order.
    pub fn researched(&self) -> Vec<TechKind> {
        self.researched.iter().copied().collect()
    }

    /// Check every precondition for researching `kind`.
    ///
    /// Returns the full price on success.
    pub fn check_research(
        &self,
        kind: TechKind,
        store: &ResourceStore,
        era: Era,
    ) -> Result<CostMap, ResearchRefusal> {
        if self.is_researched(kind) {
            return Err(ResearchRefusal::AlreadyResearched);
        }
        let node = tech(kind);
        if node.era > era {
            return Err(ResearchRefusal::WrongEra);
        }
        if let Some(missing) = node
            .prerequisites
            .iter()
            .find(|prerequisite| !self.is_researched(**prerequisite))
        {
            return Err(ResearchRefusal::MissingPrerequisite(*missing));
        }
        let price = node.total_cost();
        if !store.can_afford(&price) {
            return Err(ResearchRefusal::Unaffordable);
        }
        Ok(price)
    }

    /// Whether `kind` could be researched right now.
    pub fn can_research(&self, kind: TechKind, store: &ResourceStore, era: Era) -> bool {
        self.check_research(kind, store, era).is_ok()
    }

    /// Research `kind` if every precondition holds, deducting its price.
    pub fn research(
        &mut self,
        kind: TechKind,
        store: &mut ResourceStore,
        era: Era,
    ) -> Result<CostMap, ResearchRefusal> {
        let price = self.check_research(kind, store, era)?;
        if !store.try_spend(&price) {
            return Err(ResearchRefusal::Unaffordable);
        }
        self.researched.insert(kind);
        tracing::info!(?kind, "Technology researched");
        Ok(price)
    }

    /// Every effect granted by researched techs.
    fn effects(&self) -> impl Iterator<Item = Effect> + '_ {
        self.researched.iter().flat_map(|&kind| tech(kind).effects)
    }

    /// Product of every researched multiplier for `key`.
    ///
    /// One when nothing applies. Multiplication is commutative, so the
    /// result does not depend on research order.
    pub fn multiplier(&self, key: ModifierKey) -> Decimal {
        self.effects()
            .filter_map(|effect| match effect {
                Effect::Multiplier { key: applies_to, factor } if applies_to == key => Some(factor),
                _ => None,
            })
            .fold(Decimal::ONE, Decimal::saturating_mul)
    }

    /// Whether settlers may take `job`.
    pub fn job_unlocked(&self, job: Job) -> bool {
        job.unlocked_by_default()
            || self
                .effects()
                .any(|effect| effect == Effect::UnlockJob(job))
    }

    /// Every job settlers may take, in enum order.
    pub fn unlocked_jobs(&self) -> Vec<Job> {
        Job::ALL
            .into_iter()
            .filter(|job| self.job_unlocked(*job))
            .collect()
    }

    /// Whether `kind` may be built: it needs no tech, or a researched tech
    /// unlocks it.
    pub fn building_unlocked(&self, kind: BuildingKind) -> bool {
        kindling_world::blueprint(kind).required_tech.is_none()
            || self
                .effects()
                .any(|effect| effect == Effect::UnlockBuilding(kind))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use rust_decimal_macros::dec;

    fn store_with(entries: &[(ResourceKind, Decimal)]) -> ResourceStore {
        let mut store = ResourceStore::new(&BTreeMap::new());
        for (kind, amount) in entries {
            store.add(*kind, *amount);
        }
        store
    }

    #[test]
    fn every_gated_building_has_an_unlocking_tech() {
        for kind in BuildingKind::ALL {
            if let Some(required) = kindling_world::blueprint(kind).required_tech {
                assert!(
                    tech(required).effects.contains(&Effect::UnlockBuilding(kind)),
                    "{required:?} should unlock {kind:?}"
                );
            }
        }
    }

    #[test]
    fn prerequisites_belong_to_same_or_earlier_era() {
        for kind in TechKind::ALL {
            let node = tech(kind);
            for prerequisite in &node.prerequisites {
                assert!(tech(*prerequisite).era <= node.era, "{kind:?}");
            }
        }
    }

    #[test]
    fn research_deducts_ideas_and_resources() {
        let mut registry = TechRegistry::new();
        let mut store = store_with(&[(ResourceKind::Ideas, dec!(25)), (ResourceKind::Wood, dec!(12))]);
        registry.research(TechKind::Hunting, &mut store, Era::Tribal).unwrap();
        assert!(registry.is_researched(TechKind::Hunting));
        assert_eq!(store.amount(ResourceKind::Ideas), dec!(5));
        assert_eq!(store.amount(ResourceKind::Wood), dec!(2));
        assert!(registry.job_unlocked(Job::Hunter));
    }

    #[test]
    fn research_is_refused_when_short() {
        let mut registry = TechRegistry::new();
        let mut store = store_with(&[(ResourceKind::Ideas, dec!(19))]);
        assert_eq!(
            registry.research(TechKind::Hunting, &mut store, Era::Tribal),
            Err(ResearchRefusal::Unaffordable)
        );
        assert_eq!(store.amount(ResourceKind::Ideas), dec!(19));
    }

    #[test]
    fn research_twice_is_a_no_op() {
        let mut registry = TechRegistry::new();
        let mut store = store_with(&[(ResourceKind::Ideas, dec!(100))]);
        registry.research(TechKind::Masonry, &mut store, Era::Tribal).unwrap();
        let key = ModifierKey::Manual(ManualAction::QuarryStone);
        assert_eq!(registry.multiplier(key), dec!(2));

        assert_eq!(
            registry.research(TechKind::Masonry, &mut store, Era::Tribal),
            Err(ResearchRefusal::AlreadyResearched)
        );
        assert_eq!(registry.multiplier(key), dec!(2));
        assert_eq!(store.amount(ResourceKind::Ideas), dec!(75));
    }

    #[test]
    fn prerequisites_and_era_gate_research() {
        let mut registry = TechRegistry::new();
        let mut store = store_with(&[
            (ResourceKind::Ideas, dec!(1000)),
            (ResourceKind::Skins, dec!(100)),
        ]);
        assert_eq!(
            registry.research(TechKind::Trapping, &mut store, Era::Tribal),
            Err(ResearchRefusal::MissingPrerequisite(TechKind::Hunting))
        );
        assert_eq!(
            registry.research(TechKind::Agriculture, &mut store, Era::Tribal),
            Err(ResearchRefusal::WrongEra)
        );
        assert!(registry.research(TechKind::Agriculture, &mut store, Era::Kingdom).is_ok());
    }

    #[test]
    fn multipliers_fold_across_techs() {
        let mut registry = TechRegistry::new();
        let mut store = store_with(&[
            (ResourceKind::Ideas, dec!(1000)),
            (ResourceKind::Stone, dec!(100)),
        ]);
        registry.research(TechKind::Axes, &mut store, Era::Tribal).unwrap();
        registry.research(TechKind::FireKeeping, &mut store, Era::Tribal).unwrap();
        assert_eq!(registry.multiplier(ModifierKey::JobOutput(Job::Woodcutter)), dec!(1.5));
        assert_eq!(registry.multiplier(ModifierKey::FuelConsumption), dec!(0.75));
        assert_eq!(registry.multiplier(ModifierKey::JobOutput(Job::Gatherer)), Decimal::ONE);
    }

    #[test]
    fn buildings_unlock_through_research() {
        let mut registry = TechRegistry::new();
        assert!(registry.building_unlocked(BuildingKind::Hut));
        assert!(!registry.building_unlocked(BuildingKind::Shrine));
        let mut store = store_with(&[(ResourceKind::Ideas, dec!(50))]);
        registry.research(TechKind::Storytelling, &mut store, Era::Tribal).unwrap();
        assert!(registry.building_unlocked(BuildingKind::Shrine));
    }

    #[test]
    fn default_jobs_are_open() {
        let registry = TechRegistry::new();
        assert_eq!(
            registry.unlocked_jobs(),
            vec![Job::Gatherer, Job::Woodcutter, Job::Scout]
        );
    }
}
