//! Multi-turn integration tests for the scheduler and sessions.
//!
//! These tests drive whole games through the public API and check that
//! turn order, deaths and termination stay consistent over many turns.
//!
//! Run with: cargo test --release game_integration

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::sync::mpsc;

use drift::config::BeltConfig;
use drift::game::invariants::check_invariants;
use drift::game::{
    ActorKind, ActorState, Asteroid, Belt, Command, Game, GoalThresholds, Hazard, Material,
    Outcome, Rules, SiteGraph, SiteId, Verdict,
};
use drift::session::{run_batch, run_game, setup_game};
use drift::GameConfig;

/// A ring of `n` asteroids, each with `mantle` layers over a coal core.
fn ring(n: u32, mantle: u32) -> Belt {
    let mut belt = Belt::new();
    for _ in 0..n {
        belt.add(Asteroid::new(mantle, Some(Material::Coal)));
    }
    for i in 0..n {
        belt.link(SiteId(i), SiteId((i + 1) % n));
    }
    belt
}

#[test]
fn test_ufos_roam_without_breaking_invariants() {
    let mut game = Game::new(ring(10, 2), Rules::default(), 42);
    game.spawn(ActorKind::Player, SiteId(0)).unwrap();
    for i in 0..5 {
        game.spawn(ActorKind::Autonomous, SiteId(i * 2)).unwrap();
    }

    for _ in 0..500 {
        assert_eq!(game.advance_turn(), Outcome::Ongoing);
        assert!(check_invariants(&game).is_empty());
    }
    assert_eq!(game.turn(), 500);
}

#[test]
fn test_storms_and_explosions_end_the_game() {
    let (tx, rx) = mpsc::channel();
    let mut game = Game::new(ring(4, 3), Rules::default(), 1);
    game.add_observer(Box::new(tx));
    let a = game.spawn(ActorKind::Player, SiteId(0)).unwrap();
    let b = game.spawn(ActorKind::Player, SiteId(2)).unwrap();
    let ufo = game.spawn(ActorKind::Autonomous, SiteId(1)).unwrap();

    game.storm(SiteId(0));
    assert_eq!(
        game.actor(a).unwrap().state(),
        ActorState::Destroyed(Hazard::Storm)
    );
    assert_eq!(game.advance_turn(), Outcome::Ongoing);

    game.sites_mut().detonate(SiteId(2));
    game.settle_site_events();
    assert_eq!(
        game.actor(b).unwrap().state(),
        ActorState::Destroyed(Hazard::Explosion)
    );
    assert!(game.actor(ufo).unwrap().is_active());

    assert_eq!(game.advance_turn(), Outcome::Ended(Verdict::DefendersLost));
    assert!(check_invariants(&game).is_empty());
    assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![Verdict::DefendersLost]);
}

#[test]
fn test_settlers_win_by_meeting_up() {
    let rules = Rules {
        goal: GoalThresholds::new([(Material::Coal, 2)]),
        ..Rules::default()
    };
    let mut game = Game::new(ring(4, 0), rules, 1);
    let a = game.spawn(ActorKind::Player, SiteId(0)).unwrap();
    let b = game.spawn(ActorKind::Player, SiteId(2)).unwrap();

    // Each settler mines its own coal
    assert!(game.perform(a, Command::Mine));
    assert!(game.perform(b, Command::Mine));
    assert_eq!(game.advance_turn(), Outcome::Ongoing);

    // Coal on two asteroids does not count
    assert!(game.perform(b, Command::Move { to: SiteId(1) }));
    assert_eq!(game.advance_turn(), Outcome::Ongoing);

    assert!(game.perform(b, Command::Move { to: SiteId(0) }));
    assert_eq!(game.advance_turn(), Outcome::Ended(Verdict::DefendersWon));
    assert_eq!(game.site_totals()[&SiteId(0)][&Material::Coal], 2);
}

#[test]
fn test_ufo_killed_by_uranium_leaves_rotation() {
    let mut belt = Belt::new();
    let home = belt.add(Asteroid::new(0, None));
    let hot = belt.add(Asteroid::new(0, None).near_sun());
    let far = belt.add(Asteroid::new(5, None));
    belt.link(home, hot);
    let mut game = Game::new(belt, Rules::default(), 1);

    let settler = game.spawn(ActorKind::Player, far).unwrap();
    let ufo = game.spawn(ActorKind::Autonomous, home).unwrap();

    game.advance_turn();
    game.advance_turn();
    assert_eq!(game.actor(ufo).unwrap().site(), Some(hot));

    // Uranium in a hollow asteroid near the sun blows it up with the UFO on it
    game.actor_mut(ufo).unwrap().ledger.add_resource(Material::Iron, 1);
    assert!(game.sites_mut().place_resource(hot, Material::Uranium));
    game.settle_site_events();

    let actor = game.actor(ufo).unwrap();
    assert_eq!(actor.state(), ActorState::Destroyed(Hazard::Explosion));
    assert!(actor.ledger.is_empty());
    assert_eq!(game.queue().iter().copied().collect::<Vec<_>>(), vec![settler]);
    assert!(check_invariants(&game).is_empty());
}

#[test]
fn test_sessions_complete_across_seeds() {
    let config = GameConfig {
        belt: BeltConfig {
            asteroids: 12,
            ..BeltConfig::default()
        },
        max_turns: 500,
        ..GameConfig::default()
    };

    for seed in 0..20 {
        let result = run_game(seed, &config).unwrap();
        assert!(result.turns <= 500);
        if result.verdict == Some(Verdict::DefendersLost) {
            assert_eq!(result.settlers_alive, 0);
        }
    }
}

#[test]
fn test_session_setup_holds_invariants() {
    for seed in 0..20 {
        let game = setup_game(seed, &GameConfig::default()).unwrap();
        assert!(check_invariants(&game).is_empty(), "seed {seed}");
    }
}

#[test]
fn test_batch_matches_sequential_runs() {
    let config = GameConfig {
        max_turns: 200,
        ..GameConfig::default()
    };
    let summary = run_batch(100, 8, &config).unwrap();

    let wins = (100..108)
        .map(|seed| run_game(seed, &config).unwrap())
        .filter(|result| result.verdict == Some(Verdict::DefendersWon))
        .count();
    assert_eq!(summary.games_played, 8);
    assert_eq!(summary.wins, wins as u64);
}

#[test]
fn test_batch_rejects_invalid_config() {
    let config = GameConfig {
        settlers: 0,
        ..GameConfig::default()
    };
    assert!(run_batch(0, 4, &config).is_err());
}
