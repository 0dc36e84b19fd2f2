//! Game invariants - consistency checks that detect bugs.
//!
//! None of these should ever trigger, whatever commands the settlers issue
//! and whatever hazards strike. They are bug detectors, not gameplay rules.

use std::collections::{BTreeSet, HashSet};

use crate::game::{Belt, Game, ItemId};

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl InvariantViolation {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all game invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(game: &Game<Belt>) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    // Activation queue
    let mut queued = BTreeSet::new();
    for id in game.queue() {
        if !queued.insert(*id) {
            violations.push(InvariantViolation::new(format!("{id} is queued twice")));
        }
        match game.actor(*id) {
            Some(actor) if actor.is_active() && actor.site().is_some() => {}
            Some(actor) => violations.push(InvariantViolation::new(format!(
                "{id} is queued but {:?} at {:?}",
                actor.state(),
                actor.site()
            ))),
            None => violations.push(InvariantViolation::new(format!("{id} is queued but unknown"))),
        }
    }

    // Player registry
    let mut registered = BTreeSet::new();
    for id in game.players() {
        if !registered.insert(*id) {
            violations.push(InvariantViolation::new(format!("{id} is registered twice")));
        }
        if !game
            .actor(*id)
            .is_some_and(|actor| actor.is_active() && actor.is_player())
        {
            violations.push(InvariantViolation::new(format!(
                "{id} is registered but not a live settler"
            )));
        }
    }

    for actor in game.actors() {
        let id = actor.id();
        if actor.is_active() {
            if !queued.contains(&id) {
                violations.push(InvariantViolation::new(format!("live {id} is not queued")));
            }
            if actor.is_player() && !registered.contains(&id) {
                violations.push(InvariantViolation::new(format!(
                    "live settler {id} is not registered"
                )));
            }
        } else if actor.site().is_some() {
            violations.push(InvariantViolation::new(format!(
                "{id} left the game but still stands on {:?}",
                actor.site()
            )));
        }

        // Occupancy as seen from the actor
        if let Some(site) = actor.site() {
            match game.sites().get(site) {
                Some(asteroid) if asteroid.is_destroyed() => violations.push(
                    InvariantViolation::new(format!("{id} stands on destroyed asteroid {site}")),
                ),
                Some(asteroid) if !asteroid.occupants().contains(&id) => violations.push(
                    InvariantViolation::new(format!("{id} thinks it is on {site} but is not listed")),
                ),
                Some(_) => {}
                None => violations.push(InvariantViolation::new(format!(
                    "{id} stands on unknown asteroid {site}"
                ))),
            }
        }
    }

    // Occupancy as seen from the asteroid
    for (site, asteroid) in game.sites().iter() {
        for id in asteroid.occupants() {
            if game.actor(*id).and_then(|actor| actor.site()) != Some(site) {
                violations.push(InvariantViolation::new(format!(
                    "asteroid {site} lists {id} who is elsewhere"
                )));
            }
        }
    }

    // Item identities
    let mut items: HashSet<ItemId> = HashSet::new();
    let held = game.actors().flat_map(|actor| actor.ledger.items());
    let installed = game.sites().iter().flat_map(|(_, asteroid)| asteroid.gates());
    for item in held.chain(installed) {
        if !items.insert(item.id) {
            violations.push(InvariantViolation::new(format!(
                "item {} exists twice",
                item.id.0
            )));
        }
    }

    violations
}

/// Assert all game invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(game: &Game<Belt>) {
    let violations = check_invariants(game);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Game invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_game: &Game<Belt>) {}
