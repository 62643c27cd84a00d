//! Integration tests driving a whole game through the public interface.
//!
//! Every test builds a [`Game`] from the default configuration and talks
//! to it only through [`Commands`], [`Game::step`], [`Game::frame`], and
//! the read snapshot, the same way a host would.

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

use kindling_core::{Commands, Game, SimulationConfig};
use kindling_types::{
    BuildingKind, Era, Job, ManualAction, ResourceKind, Season, SocialClass, TechKind,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn new_game() -> Game {
    Game::new(SimulationConfig::default()).unwrap()
}

fn amount(game: &Game, kind: ResourceKind) -> Decimal {
    game.state().resources.amount(kind)
}

/// Research and build everything the tribal wonder needs.
fn complete_tribal_era(game: &mut Game) {
    game.add_resource(ResourceKind::Ideas, dec!(1000));
    game.add_resource(ResourceKind::Skins, dec!(10));
    game.add_resource(ResourceKind::Stone, dec!(180));
    game.add_resource(ResourceKind::Wood, dec!(130));
    game.add_resource(ResourceKind::Culture, dec!(50));
    for tech in [
        TechKind::Masonry,
        TechKind::Storytelling,
        TechKind::Rituals,
        TechKind::Monuments,
    ] {
        assert!(game.research(tech), "{tech:?} should be researchable");
    }
    assert!(game.build(BuildingKind::Monolith));
}

#[test]
fn resources_never_leave_their_bounds() {
    let mut game = new_game();
    game.set_auto_refuel(true);
    assert!(game.assign_worker(Job::Gatherer));
    assert!(game.assign_worker(Job::Woodcutter));
    assert!(game.assign_worker(Job::Scout));

    for _ in 0..5_000 {
        game.step();
        let snapshot = game.snapshot();
        for (kind, value) in &snapshot.resources {
            assert!(*value >= Decimal::ZERO, "{kind:?} went negative");
            if let Some(Some(cap)) = snapshot.storage_caps.get(kind) {
                assert!(value <= cap, "{kind:?} exceeded its cap");
            }
        }
    }
}

#[test]
fn season_rollover_carries_the_remainder() {
    let mut game = new_game();
    game.set_auto_refuel(true);
    for _ in 0..610 {
        game.step();
    }
    let calendar = game.snapshot().calendar;
    assert_eq!(calendar.season, Season::Summer);
    assert_eq!(calendar.day_in_season, dec!(0.5));
    assert_eq!(calendar.total_days, dec!(30.5));
}

#[test]
fn starvation_never_kills_the_last_settler() {
    let mut game = new_game();
    for kind in [ResourceKind::Food, ResourceKind::Meat, ResourceKind::CuredMeat] {
        game.remove_resource(kind, dec!(1000));
    }
    for _ in 0..2_000 {
        game.step();
        assert!(game.state().settlers() >= 1);
    }
    assert_eq!(game.state().settlers(), 1);
}

#[test]
fn save_round_trip_keeps_exact_quantities() {
    let mut game = new_game();
    game.add_resource(ResourceKind::Food, dec!(13.333333333333333333));
    assert_eq!(amount(&game, ResourceKind::Food), dec!(33.333333333333333333));
    assert!(game.assign_worker(Job::Gatherer));
    let text = game.export_save().unwrap();
    let saved = game.snapshot();

    game.reset_save();
    game.import_save(&text).unwrap();
    let restored = game.snapshot();
    assert_eq!(restored, saved);
    assert_eq!(
        restored.resources.get(&ResourceKind::Food).map(ToString::to_string),
        Some("33.333333333333333333".to_owned())
    );
}

#[test]
fn building_costs_grow_geometrically() {
    let mut game = new_game();
    game.add_resource(ResourceKind::Wood, dec!(180));
    assert_eq!(amount(&game, ResourceKind::Wood), dec!(200));

    assert!(game.build(BuildingKind::Hut));
    assert_eq!(amount(&game, ResourceKind::Wood), dec!(180));
    assert!(game.build(BuildingKind::Hut));
    assert_eq!(amount(&game, ResourceKind::Wood), dec!(157));
    assert!(game.build(BuildingKind::Hut));
    assert_eq!(amount(&game, ResourceKind::Wood), dec!(130.55));

    let snapshot = game.snapshot();
    assert_eq!(snapshot.buildings.get(&BuildingKind::Hut), Some(&3));
    assert_eq!(snapshot.population.max_population, 11);
}

#[test]
fn unaffordable_build_changes_nothing() {
    let mut game = new_game();
    game.remove_resource(ResourceKind::Wood, dec!(5));
    let before = game.state().clone();
    assert!(!game.build(BuildingKind::Hut));
    assert_eq!(game.state(), &before);
}

#[test]
fn wonder_is_built_once_and_opens_the_kingdom() {
    let mut game = new_game();
    assert!(!game.advance_to_era2());
    complete_tribal_era(&mut game);
    assert!(game.state().era_completed);

    game.add_resource(ResourceKind::Stone, dec!(200));
    game.add_resource(ResourceKind::Wood, dec!(200));
    assert!(!game.build(BuildingKind::Monolith));
    assert_eq!(game.snapshot().buildings.get(&BuildingKind::Monolith), Some(&1));

    assert!(game.advance_to_era2());
    assert_eq!(game.state().era, Era::Kingdom);
    assert!(!game.assign_worker(Job::Gatherer));
}

#[test]
fn researched_multiplier_applies_exactly_once() {
    let mut game = new_game();
    game.add_resource(ResourceKind::Ideas, dec!(100));
    assert_eq!(game.perform(ManualAction::QuarryStone), dec!(1));
    assert!(game.research(TechKind::Masonry));
    assert_eq!(game.perform(ManualAction::QuarryStone), dec!(2));
    assert!(!game.research(TechKind::Masonry));
    assert_eq!(game.perform(ManualAction::QuarryStone), dec!(2));
    assert_eq!(amount(&game, ResourceKind::Ideas), dec!(75));
}

#[test]
fn peasants_pay_exact_tax() {
    let mut game = new_game();
    complete_tribal_era(&mut game);
    assert!(game.advance_to_era2());
    for _ in 0..3 {
        assert!(game.assign_social_class(SocialClass::Peasant));
    }
    assert_eq!(game.set_tax_rate(dec!(0.1)), dec!(0.1));

    let gold = amount(&game, ResourceKind::Gold);
    game.step();
    assert_eq!(game.snapshot().economy.last_tax_income, dec!(0.003));
    assert!(amount(&game, ResourceKind::Gold) >= gold + dec!(0.003));
}

#[test]
fn frames_drive_ticks_only_while_running() {
    let mut game = new_game();
    assert!(game.frame(0).is_empty());
    assert!(game.frame(1_000).is_empty());

    game.start_game();
    assert!(game.frame(1_050).is_empty());
    assert_eq!(game.frame(1_150).len(), 1);
    assert_eq!(game.frame(70_000).len(), 50, "catch-up is capped");

    assert!(game.set_game_speed(10));
    assert_eq!(game.frame(70_100).len(), 10);

    assert!(!game.toggle_game());
    assert!(game.frame(80_000).is_empty());
    assert_eq!(game.state().tick, 61);
}

#[test]
fn import_of_garbage_is_rejected_without_damage() {
    let mut game = new_game();
    game.step();
    let before = game.state().clone();
    assert!(game.import_save("%%% not base64 %%%").is_err());
    assert_eq!(game.state(), &before);
}
