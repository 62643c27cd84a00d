//! Tick cycle: the ten-phase step that drives the Kindling simulation.
//!
//! Each tick runs these phases in a fixed order. Later phases read what
//! earlier ones wrote, so the order is part of the contract:
//!
//! 1. **Season** -- advance the calendar, log transitions.
//! 2. **Bonfire** -- read status, burn fuel, auto-refuel, log changes.
//! 3. **Jobs** -- tribal-era job output.
//! 4. **Ideas** -- idle settlers think.
//! 5. **Specials** -- traps, spoilage, conversions, passives.
//! 6. **Meal** -- tiered food draw-down.
//! 7. **Mortality** -- starvation and freezing, burial culture.
//! 8. **Growth** -- the birth accumulator.
//! 9. **Events** -- exploration, world events, effect expiry.
//! 10. **Kingdom** -- taxes, happiness, class output, bread, wonder check.
//!
//! The cycle is deterministic given the same state and the same random
//! source. It never fails: every mutation clamps.

use std::collections::BTreeMap;

use rand::Rng;
use rust_decimal::Decimal;
use tracing::{debug, info};

use kindling_ledger::{CostMap, Quantity, quantity};
use kindling_settlement::economy::{self, HappinessInputs};
use kindling_settlement::{GrowthConditions, OutputModifiers, consumption, production};
use kindling_types::{
    BonfireStatus, Era, ExplorationOutcome, Job, ModifierKey, MortalityCause, ResourceKind, Season,
    WorldEventKind, food_production_factor, fuel_factor, happiness_modifier, production_factor,
};
use kindling_world::events;
use kindling_world::specials;

use crate::chronicle::{ChronicleEvent, Chronicler};
use crate::config::SimulationConfig;
use crate::state::GameState;

/// Summary of a single tick's execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// The season at the end of the tick.
    pub season: Season,
    /// Bonfire status after consumption and refuelling.
    pub bonfire: BonfireStatus,
    /// Deaths by cause.
    pub deaths: BTreeMap<MortalityCause, u32>,
    /// Settlers born.
    pub births: u32,
    /// Settlers who joined from outside.
    pub arrivals: u32,
    /// Scouting outcome, if scouts went out.
    pub exploration: Option<ExplorationOutcome>,
    /// World event, if one was rolled.
    pub world_event: Option<WorldEventKind>,
    /// Living settlers at the end of the tick.
    pub settlers: u32,
}

impl TickSummary {
    fn new(tick: u64, season: Season, bonfire: BonfireStatus) -> Self {
        Self {
            tick,
            season,
            bonfire,
            deaths: BTreeMap::new(),
            births: 0,
            arrivals: 0,
            exploration: None,
            world_event: None,
            settlers: 0,
        }
    }

    /// Total deaths across every cause.
    pub fn total_deaths(&self) -> u32 {
        self.deaths.values().fold(0_u32, |sum, n| sum.saturating_add(*n))
    }
}

/// Per-tick scratch shared by the phases.
struct TickContext<'a, R: Rng> {
    /// Configuration in force.
    config: &'a SimulationConfig,
    /// Seeded random source.
    rng: &'a mut R,
    /// Events to write to the chronicle once the tick settles.
    notes: Vec<ChronicleEvent>,
}

impl<R: Rng> TickContext<'_, R> {
    fn note(&mut self, event: ChronicleEvent) {
        self.notes.push(event);
    }
}

/// Execute one complete tick of the simulation.
///
/// Runs every phase in order, then writes the tick's chronicle entries.
pub fn run_tick(
    state: &mut GameState,
    config: &SimulationConfig,
    rng: &mut impl Rng,
    chronicler: &dyn Chronicler,
) -> TickSummary {
    state.tick = state.tick.saturating_add(1);
    let tick = state.tick;
    let mut ctx = TickContext {
        config,
        rng,
        notes: Vec::new(),
    };

    // --- Phase 1: Season ---
    phase_season(state, &mut ctx);

    // --- Phase 2: Bonfire ---
    let bonfire = phase_bonfire(state, &mut ctx);
    let mut summary = TickSummary::new(tick, state.calendar.season(), bonfire);

    // --- Phase 3: Jobs ---
    let modifiers = output_modifiers(state, config);
    phase_jobs(state, &modifiers, config);

    // --- Phase 4: Ideas ---
    phase_ideas(state, config);

    // --- Phase 5: Specials ---
    phase_specials(state, &mut ctx);

    // --- Phase 6: Meal ---
    let demand = phase_meal(state, config);

    // --- Phase 7: Mortality ---
    phase_mortality(state, demand, &mut summary, &mut ctx);

    // --- Phase 8: Growth ---
    summary.births = phase_growth(state, config);
    if summary.births > 0 {
        ctx.note(ChronicleEvent::Births(summary.births));
    }

    // --- Phase 9: Events ---
    phase_events(state, &mut summary, &mut ctx);

    // --- Phase 10: Kingdom ---
    if state.era == Era::Kingdom {
        phase_kingdom(state, &modifiers, &mut ctx);
    }

    summary.settlers = state.settlers();
    let day = state.calendar.total_days();
    for event in std::mem::take(&mut ctx.notes) {
        let roll = ctx.rng.random::<u32>();
        state.chronicle.record(tick, day, &event, chronicler, roll);
    }

    debug!(
        tick,
        season = ?summary.season,
        bonfire = ?summary.bonfire,
        settlers = summary.settlers,
        "Tick complete"
    );
    summary
}

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

fn phase_season<R: Rng>(state: &mut GameState, ctx: &mut TickContext<'_, R>) {
    if let Some(change) = state.calendar.advance(ctx.config.calendar.days_per_tick) {
        info!(
            tick = state.tick,
            from = ?change.from,
            to = ?change.to,
            total_days = %state.calendar.total_days(),
            "Season changed"
        );
        ctx.note(ChronicleEvent::SeasonChanged(change.to));
    }
}

fn phase_bonfire<R: Rng>(state: &mut GameState, ctx: &mut TickContext<'_, R>) -> BonfireStatus {
    let multiplier = fuel_factor(&state.temporary_effects, state.tick)
        .saturating_mul(state.techs.multiplier(ModifierKey::FuelConsumption));
    let outcome = state.bonfire.tick(
        state.calendar.season(),
        multiplier,
        &mut state.resources,
        &ctx.config.bonfire,
    );
    if outcome.status_changed() {
        info!(tick = state.tick, before = ?outcome.before, after = ?outcome.after, "Bonfire status changed");
        ctx.note(ChronicleEvent::BonfireChanged(outcome.after));
    }
    outcome.after
}

/// Tick-wide output factors: season row, temporary effects, bonfire.
fn output_modifiers(state: &GameState, config: &SimulationConfig) -> OutputModifiers {
    OutputModifiers {
        season: state.calendar.multipliers(),
        food: food_production_factor(&state.temporary_effects, state.tick),
        other: production_factor(&state.temporary_effects, state.tick),
        bonfire: state.bonfire.production_penalty(&config.bonfire),
    }
}

fn phase_jobs(state: &mut GameState, modifiers: &OutputModifiers, config: &SimulationConfig) {
    if state.era != Era::Tribal {
        return;
    }
    let produced = production::produce_jobs(
        &state.workforce,
        &state.techs,
        modifiers,
        &mut state.resources,
        &config.production,
    );
    debug!(tick = state.tick, kinds = produced.len(), "Job production");
}

fn phase_ideas(state: &mut GameState, config: &SimulationConfig) {
    let demand = current_demand(state, config);
    let starving = consumption::is_starving(&state.resources, demand, &config.food);
    let ideas = production::idea_output(
        state.idle(),
        state.bonfire.status(&config.bonfire),
        state.calendar.season(),
        starving,
        &state.techs,
        &config.ideas,
    );
    state.resources.add(ResourceKind::Ideas, ideas);
}

fn phase_specials<R: Rng>(state: &mut GameState, ctx: &mut TickContext<'_, R>) {
    let multiplier = state
        .bonfire
        .production_penalty(&ctx.config.bonfire)
        .saturating_mul(production_factor(&state.temporary_effects, state.tick));
    let report = specials::run_specials(
        &state.buildings,
        &mut state.resources,
        multiplier,
        &mut *ctx.rng,
        &ctx.config.specials,
    );
    if report.catches > 0 {
        debug!(tick = state.tick, catches = report.catches, "Traps caught game");
    }
}

/// Returns the food demand of the tick.
fn phase_meal(state: &mut GameState, config: &SimulationConfig) -> Quantity {
    let demand = current_demand(state, config);
    let meal = consumption::consume_food(&mut state.resources, demand, &config.food);
    if !meal.satisfied() {
        debug!(tick = state.tick, shortfall = %meal.shortfall, "Food shortfall");
    }
    demand
}

fn phase_mortality<R: Rng>(
    state: &mut GameState,
    demand: Quantity,
    summary: &mut TickSummary,
    ctx: &mut TickContext<'_, R>,
) {
    let starving = consumption::is_starving(&state.resources, demand, &ctx.config.food);
    let freezing =
        state.calendar.season() == Season::Winter && state.resources.amount(ResourceKind::Wood).is_zero();

    let mut causes = Vec::new();
    if starving {
        causes.push(MortalityCause::Starvation);
    }
    if freezing {
        causes.push(MortalityCause::Freezing);
    }

    for cause in causes {
        let deaths = state
            .population
            .roll_mortality(cause, state.tick, &mut *ctx.rng, &ctx.config.population);
        if deaths == 0 {
            continue;
        }
        summary.deaths.insert(cause, deaths);
        let survivors = state.settlers();
        state.workforce.shed(survivors);
        ctx.note(ChronicleEvent::Deaths {
            cause,
            count: deaths,
        });

        let culture = quantity::from_count(deaths).saturating_mul(state.buildings.culture_per_death());
        if !culture.is_zero() {
            state.resources.add(ResourceKind::Culture, culture);
            ctx.note(ChronicleEvent::Remembered(culture));
        }
    }
}

fn phase_growth(state: &mut GameState, config: &SimulationConfig) -> u32 {
    let conditions = GrowthConditions {
        fed: consumption::food_equivalent(&state.resources, &config.food) > Decimal::ZERO,
        warm: state.bonfire.is_lit(),
        max_population: state.max_population(config),
    };
    state.population.grow(conditions, &config.population)
}

fn phase_events<R: Rng>(state: &mut GameState, summary: &mut TickSummary, ctx: &mut TickContext<'_, R>) {
    let tick = state.tick;
    let max_population = state.max_population(ctx.config);

    let scouts = state.workforce.job_count(Job::Scout);
    if state.era == Era::Tribal && events::is_due(tick, ctx.config.events.exploration_interval_ticks) {
        if let Some(found) = events::explore(scouts, &mut *ctx.rng, &ctx.config.events) {
            state.resources.add_many(&found.gains);
            let joined = state.population.add_settlers(found.settlers_joined, max_population);
            summary.arrivals = summary.arrivals.saturating_add(joined);
            summary.exploration = Some(found.outcome);
            ctx.note(ChronicleEvent::Exploration(found.outcome));
        }
    }

    if events::is_due(tick, ctx.config.events.world_event_interval_ticks) {
        let resolution = events::roll_world_event(
            state.era,
            state.calendar.season(),
            tick,
            &state.resources,
            &mut *ctx.rng,
        );
        apply_resolution(state, &resolution.gains, &resolution.losses);
        let joined = state.population.add_settlers(resolution.settlers_joined, max_population);
        if joined > 0 {
            summary.arrivals = summary.arrivals.saturating_add(joined);
            ctx.note(ChronicleEvent::Arrivals(joined));
        }
        if let Some(effect) = resolution.temporary {
            state.temporary_effects.push(effect);
        }
        summary.world_event = Some(resolution.kind);
        info!(tick, kind = ?resolution.kind, "World event");
        ctx.note(ChronicleEvent::WorldEvent(resolution.kind));
    }

    let expired = events::prune_expired(&mut state.temporary_effects, tick);
    if expired > 0 {
        debug!(tick, expired, "Temporary effects expired");
    }
}

fn phase_kingdom<R: Rng>(
    state: &mut GameState,
    modifiers: &OutputModifiers,
    ctx: &mut TickContext<'_, R>,
) {
    let config = ctx.config;
    let income = state.economy.collect_tax(
        &state.workforce,
        state.buildings.tax_bonus(),
        &mut state.resources,
        &config.economy,
    );

    let inputs = HappinessInputs {
        tax_rate: state.economy.tax_rate(),
        diet_variety: production::diet_variety(&state.resources),
        settlers: state.settlers(),
        max_population: state.max_population(config),
        building_bonus: state.buildings.happiness_bonus(),
        temporary_bonus: happiness_modifier(&state.temporary_effects, state.tick),
    };
    let target = economy::target_happiness(&inputs, &state.workforce, &config.economy);
    state.economy.converge(target, &config.economy);

    production::produce_classes(
        &state.workforce,
        &state.techs,
        modifiers,
        state.economy.efficiency(),
        &mut state.resources,
        &config.production,
    );
    production::consume_bread(&state.workforce, &mut state.resources, &config.production);

    debug!(
        tick = state.tick,
        income = %income,
        happiness = %state.economy.happiness(),
        tier = ?state.economy.tier(),
        "Kingdom phase"
    );

    if !state.era_completed && state.buildings.wonder_built(state.era) {
        state.era_completed = true;
        info!(tick = state.tick, era = ?state.era, "Era completed");
        ctx.note(ChronicleEvent::EraCompleted(state.era));
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn current_demand(state: &GameState, config: &SimulationConfig) -> Quantity {
    consumption::food_demand(
        state.settlers(),
        state.calendar.season(),
        state.bonfire.is_lit(),
        &config.food,
    )
}

fn apply_resolution(state: &mut GameState, gains: &CostMap, losses: &CostMap) {
    state.resources.add_many(gains);
    state.resources.remove_many(losses);
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use crate::chronicle::DefaultChronicler;
    use kindling_ledger::StorageCap;
    use kindling_types::{BuildingKind, SocialClass};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rust_decimal_macros::dec;

    fn game() -> (GameState, SimulationConfig, StdRng) {
        let config = SimulationConfig::default();
        (GameState::new(&config), config, StdRng::seed_from_u64(1))
    }

    fn step(state: &mut GameState, config: &SimulationConfig, rng: &mut StdRng) -> TickSummary {
        run_tick(state, config, rng, &DefaultChronicler::new())
    }

    #[test]
    fn tick_counter_and_calendar_advance() {
        let (mut state, config, mut rng) = game();
        let summary = step(&mut state, &config, &mut rng);
        assert_eq!(summary.tick, 1);
        assert_eq!(state.calendar.total_days(), dec!(0.05));
    }

    #[test]
    fn winter_bonfire_burns_double() {
        let (mut state, config, mut rng) = game();
        while state.calendar.season() != Season::Winter {
            state.calendar.advance(dec!(1));
        }
        state.bonfire.set_fuel(dec!(5));
        let summary = step(&mut state, &config, &mut rng);
        assert_eq!(state.bonfire.fuel(), dec!(4.8));
        assert_eq!(summary.bonfire, BonfireStatus::LowFuel);
    }

    #[test]
    fn gatherers_produce_food_and_settlers_eat() {
        let (mut state, config, mut rng) = game();
        state.workforce.assign_job(Job::Gatherer, 2, 3);
        let before = state.resources.amount(ResourceKind::Food);
        step(&mut state, &config, &mut rng);
        // 2 * 0.05 * 1.25 (spring) - 3 * 0.01
        assert_eq!(state.resources.amount(ResourceKind::Food), before + dec!(0.125) - dec!(0.03));
    }

    #[test]
    fn idle_settlers_produce_ideas() {
        let (mut state, config, mut rng) = game();
        step(&mut state, &config, &mut rng);
        assert_eq!(state.resources.amount(ResourceKind::Ideas), dec!(0.03));
    }

    #[test]
    fn extinguished_fire_slows_work() {
        let (mut state, config, mut rng) = game();
        state.bonfire.set_fuel(Decimal::ZERO);
        state.workforce.assign_job(Job::Woodcutter, 1, 3);
        let before = state.resources.amount(ResourceKind::Wood);
        step(&mut state, &config, &mut rng);
        // 0.04 * 1.0 (spring wood) * 0.1 (penalty)
        assert_eq!(state.resources.amount(ResourceKind::Wood), before + dec!(0.004));
    }

    #[test]
    fn resources_stay_within_caps() {
        let (mut state, config, mut rng) = game();
        state.resources.set_cap(ResourceKind::Food, StorageCap::Limited(dec!(20.05)));
        state.workforce.assign_job(Job::Gatherer, 3, 3);
        for _ in 0..2_000 {
            step(&mut state, &config, &mut rng);
            for kind in ResourceKind::ALL {
                let amount = state.resources.amount(kind);
                assert!(amount >= Decimal::ZERO);
                if let Some(cap) = state.resources.cap(kind).limit() {
                    assert!(amount <= cap, "{kind:?} exceeded its cap");
                }
            }
        }
    }

    #[test]
    fn starvation_kills_but_leaves_a_survivor() {
        let (mut state, config, mut rng) = game();
        for kind in [ResourceKind::Food, ResourceKind::Meat, ResourceKind::CuredMeat] {
            state.resources.set(kind, Decimal::ZERO);
        }
        let mut died = 0;
        for _ in 0..1_000 {
            died += step(&mut state, &config, &mut rng).total_deaths();
            assert!(state.settlers() >= 1);
        }
        assert!(died >= 1);
        assert_eq!(state.settlers(), 1);
        assert!(state.chronicle.entries().iter().any(|entry| entry.message.contains("Hunger")));
    }

    #[test]
    fn winter_without_wood_freezes_settlers() {
        let (mut state, config, mut rng) = game();
        while state.calendar.season() != Season::Winter {
            state.calendar.advance(dec!(1));
        }
        state.resources.set(ResourceKind::Food, dec!(200));
        state.resources.set(ResourceKind::Wood, Decimal::ZERO);

        let first = step(&mut state, &config, &mut rng);
        assert_eq!(first.deaths.get(&MortalityCause::Freezing), Some(&1));
        assert_eq!(first.deaths.get(&MortalityCause::Starvation), None);
        assert_eq!(state.settlers(), 2);

        for _ in 0..300 {
            step(&mut state, &config, &mut rng);
            assert!(state.settlers() >= 1);
        }
        assert_eq!(state.settlers(), 1);
    }

    #[test]
    fn burial_mounds_turn_deaths_into_culture() {
        let (mut state, config, mut rng) = game();
        state.resources.set(ResourceKind::Stone, dec!(60));
        state
            .buildings
            .try_build(BuildingKind::BurialMound, &mut state.resources, Era::Tribal, true)
            .unwrap();
        for kind in [ResourceKind::Food, ResourceKind::Meat, ResourceKind::CuredMeat] {
            state.resources.set(kind, Decimal::ZERO);
        }

        let before = state.resources.amount(ResourceKind::Culture);
        let mut died = 0;
        for _ in 0..1_000 {
            died += step(&mut state, &config, &mut rng).total_deaths();
        }
        assert!(died >= 1);
        assert_eq!(
            state.resources.amount(ResourceKind::Culture) - before,
            Decimal::from(died) * dec!(5)
        );
        assert!(state.chronicle.entries().iter().any(|entry| entry.message.contains("laid to rest")));
    }

    #[test]
    fn fed_and_warm_settlement_grows() {
        let (mut state, config, mut rng) = game();
        state.bonfire.set_auto_refuel(true);
        state.resources.set(ResourceKind::Food, dec!(200));
        state.resources.set(ResourceKind::Wood, dec!(200));
        let mut births = 0;
        for _ in 0..600 {
            births += step(&mut state, &config, &mut rng).births;
        }
        assert!(births >= 1);
        assert!(state.settlers() <= state.max_population(&config));
    }

    #[test]
    fn kingdom_collects_taxes() {
        let (mut state, config, mut rng) = game();
        state.era = Era::Kingdom;
        state.workforce.assign_class(SocialClass::Peasant, 3, 3);
        step(&mut state, &config, &mut rng);
        assert_eq!(state.economy.last_tax_income(), dec!(0.003));
        assert!(state.resources.amount(ResourceKind::Gold) >= dec!(0.003));
    }

    #[test]
    fn world_events_fire_on_schedule() {
        let (mut state, config, mut rng) = game();
        state.bonfire.set_auto_refuel(true);
        state.resources.set(ResourceKind::Wood, dec!(200));
        let mut fired = Vec::new();
        for _ in 0..config.events.world_event_interval_ticks {
            if let Some(kind) = step(&mut state, &config, &mut rng).world_event {
                fired.push((state.tick, kind));
            }
        }
        assert_eq!(fired.len(), 1);
        assert_eq!(fired.first().map(|(tick, _)| *tick), Some(config.events.world_event_interval_ticks));
    }
}
