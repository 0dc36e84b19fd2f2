//! Game layer for Drift.
//!
//! Implements the rules of the asteroid belt:
//! - Ledgers of carried materials and items
//! - The site graph contract and the in-memory belt
//! - Actors (settlers and UFOs) and their moves
//! - The turn scheduler, settler commands and termination

mod actor;
mod belt;
mod crafting;
pub mod invariants;
mod ledger;
mod scheduler;
mod site;

pub use actor::{
    Actor, ActorId, ActorKind, ActorState, Destination, Hazard, attempt_extract, attempt_relocate,
};
pub use belt::{Asteroid, Belt};
pub use crafting::Recipe;
pub use ledger::{Item, ItemId, ItemKind, Ledger, Material, ResourceSink};
pub use scheduler::{
    Command, DEFAULT_GOAL_AMOUNT, Game, GoalThresholds, MAX_GATES_BEFORE_CRAFTING, Outcome,
    OutcomeObserver, Rules, Verdict,
};
pub use site::{SiteEvent, SiteGraph, SiteId};
