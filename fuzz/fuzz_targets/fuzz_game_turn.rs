#![no_main]

//! Full game turn fuzzer.
//!
//! This fuzz target interleaves everything that can happen to a game:
//! 1. Settler commands (move, wander, mine, drill, place, craft, install gates)
//! 2. Material grants
//! 3. Solar storms and detonations
//! 4. Turn advances
//!
//! After every event the game invariants must hold and a given verdict must
//! never change.

use arbitrary::Arbitrary;
use drift::game::invariants::check_invariants;
use drift::game::{
    ActorId, ActorKind, Asteroid, Belt, Command, Game, Material, Outcome, Rules, SiteId,
};
use libfuzzer_sys::fuzz_target;

const SITES: u32 = 8;

/// A fuzzer-generated event.
#[derive(Arbitrary, Debug, Clone)]
enum FuzzEvent {
    Move { settler: u8, to: u8 },
    Wander { settler: u8 },
    Mine { settler: u8 },
    Drill { settler: u8 },
    Place { settler: u8, material: u8 },
    Craft { settler: u8 },
    InstallGate { settler: u8 },
    CraftRobot { settler: u8 },
    Grant { settler: u8, material: u8, amount: u8 },
    Storm { site: u8 },
    Detonate { site: u8 },
    Turn,
}

/// Structured input for full game fuzzing.
#[derive(Arbitrary, Debug)]
struct GameInput {
    /// Mantle thickness and core per asteroid.
    asteroids: [(u8, u8, bool); SITES as usize],
    /// Extra links across the ring.
    links: Vec<(u8, u8)>,
    /// Number of settlers and UFOs.
    settlers: u8,
    ufos: u8,
    events: Vec<FuzzEvent>,
    seed: u64,
}

fn material(index: u8) -> Material {
    Material::ALL[usize::from(index) % Material::ALL.len()]
}

fn site(index: u8) -> SiteId {
    SiteId(u32::from(index) % SITES)
}

fn build_belt(input: &GameInput) -> Belt {
    let mut belt = Belt::new();
    for (mantle, core, near_sun) in input.asteroids {
        let core = (core % 5 < 4).then(|| material(core));
        let mut asteroid = Asteroid::new(u32::from(mantle % 4), core);
        if near_sun {
            asteroid = asteroid.near_sun();
        }
        belt.add(asteroid);
    }
    for i in 0..SITES {
        belt.link(SiteId(i), SiteId((i + 1) % SITES));
    }
    for (a, b) in input.links.iter().take(16) {
        belt.link(site(*a), site(*b));
    }
    belt
}

fuzz_target!(|input: GameInput| {
    // Cap sizes to avoid excessive runtime
    let events: Vec<_> = input.events.iter().take(256).cloned().collect();

    let mut game = Game::new(build_belt(&input), Rules::default(), input.seed);
    let settlers: Vec<ActorId> = (0..(input.settlers % 4).max(1))
        .filter_map(|i| game.spawn(ActorKind::Player, site(i)))
        .collect();
    for i in 0..input.ufos % 4 {
        game.spawn(ActorKind::Autonomous, site(i + 3));
    }
    if settlers.is_empty() {
        return;
    }

    let pick = |n: u8| settlers[usize::from(n) % settlers.len()];
    let mut verdict = None;

    for event in events {
        match event {
            FuzzEvent::Move { settler, to } => {
                game.perform(pick(settler), Command::Move { to: site(to) });
            }
            FuzzEvent::Wander { settler } => {
                game.perform(pick(settler), Command::Wander);
            }
            FuzzEvent::Mine { settler } => {
                game.perform(pick(settler), Command::Mine);
            }
            FuzzEvent::Drill { settler } => {
                game.perform(pick(settler), Command::Drill);
            }
            FuzzEvent::Place { settler, material: m } => {
                game.perform(pick(settler), Command::PlaceResource { material: material(m) });
            }
            FuzzEvent::Craft { settler } => {
                game.perform(pick(settler), Command::CraftTeleportGates);
            }
            FuzzEvent::InstallGate { settler } => {
                game.perform(pick(settler), Command::PlaceTeleportGate);
            }
            FuzzEvent::CraftRobot { settler } => {
                game.perform(pick(settler), Command::CraftRobot);
            }
            FuzzEvent::Grant { settler, material: m, amount } => {
                if let Some(actor) = game.actor_mut(pick(settler))
                    && actor.is_active()
                {
                    actor.ledger.add_resource(material(m), u32::from(amount % 8));
                }
            }
            FuzzEvent::Storm { site: s } => {
                game.storm(site(s));
            }
            FuzzEvent::Detonate { site: s } => {
                game.sites_mut().detonate(site(s));
                game.settle_site_events();
            }
            FuzzEvent::Turn => {
                let outcome = game.advance_turn();
                if let Some(previous) = verdict {
                    assert_eq!(outcome, Outcome::Ended(previous), "verdict changed");
                }
                verdict = outcome.verdict();
            }
        }

        let violations = check_invariants(&game);
        if !violations.is_empty() {
            panic!("Invariant violations after {event:?}: {violations:?}");
        }
    }
});
