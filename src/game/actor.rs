//! Actors: the turn-taking entities standing on sites.
//!
//! Settlers, UFOs and robots share one record. What differs is the
//! capability tag, which the scheduler matches on when it steps an actor or
//! settles a hazard. Moving and mining are free functions so any actor with
//! a ledger can use them.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::game::{Ledger, SiteGraph, SiteId};

/// Identity of an actor. Ids are never reused within a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u32);

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "actor {}", self.0)
    }
}

/// Capability tag deciding how an actor takes its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    /// A settler, driven by the player through commands.
    Player,
    /// A UFO, driven by a fixed greedy policy.
    Autonomous,
    /// A robot built by a settler. Drills where it stands, wanders when it
    /// cannot, and flees its asteroid when it blows up.
    Robot,
}

/// Environmental hazard that can end an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hazard {
    /// The actor's asteroid blew up.
    Explosion,
    /// A solar storm swept the actor's asteroid.
    Storm,
}

/// Lifecycle of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorState {
    /// On a site and taking turns.
    Active,
    /// Killed by a hazard.
    Destroyed(Hazard),
    /// Blown off the map by a storm; alive but out of the game.
    Adrift,
}

/// Where an actor wants to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Any neighbor, picked uniformly at random.
    Random,
    /// A specific neighbor.
    Site(SiteId),
}

/// A turn-taking entity.
#[derive(Debug, Clone)]
pub struct Actor {
    id: ActorId,
    kind: ActorKind,
    state: ActorState,
    site: Option<SiteId>,
    /// Everything the actor carries.
    pub ledger: Ledger,
}

impl Actor {
    /// Create an active actor standing on `site`.
    ///
    /// Only the scheduler creates actors, after the site accepted them.
    pub(crate) fn new(id: ActorId, kind: ActorKind, site: SiteId) -> Self {
        Self {
            id,
            kind,
            state: ActorState::Active,
            site: Some(site),
            ledger: Ledger::new(),
        }
    }

    /// Identity of this actor.
    #[must_use]
    pub const fn id(&self) -> ActorId {
        self.id
    }

    /// Capability tag.
    #[must_use]
    pub const fn kind(&self) -> ActorKind {
        self.kind
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ActorState {
        self.state
    }

    /// Current site. `None` once the actor has left the game.
    #[must_use]
    pub const fn site(&self) -> Option<SiteId> {
        self.site
    }

    /// Whether the actor is still in play.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == ActorState::Active
    }

    /// Whether this is a settler.
    #[must_use]
    pub fn is_player(&self) -> bool {
        self.kind == ActorKind::Player
    }

    /// Take the actor out of play, leaving its site.
    pub(crate) fn retire<S: SiteGraph + ?Sized>(&mut self, sites: &mut S, state: ActorState) {
        if let Some(site) = self.site.take() {
            sites.depart(site, self.id);
        }
        self.state = state;
    }
}

/// Try to move `actor` to a neighbor of its current site.
///
/// An explicit destination is only honored when it is currently a neighbor.
/// On success the destination has accepted the actor and the origin has
/// been told it left. On failure nothing changes.
pub fn attempt_relocate<S, R>(
    actor: &mut Actor,
    sites: &mut S,
    destination: Destination,
    rng: &mut R,
) -> bool
where
    S: SiteGraph + ?Sized,
    R: Rng + ?Sized,
{
    if !actor.is_active() {
        return false;
    }
    let Some(origin) = actor.site else {
        return false;
    };

    let neighbors = sites.neighbors(origin);
    let target = match destination {
        Destination::Random => match neighbors.choose(rng) {
            Some(site) => *site,
            None => return false,
        },
        Destination::Site(site) if neighbors.contains(&site) => site,
        Destination::Site(_) => return false,
    };

    if !sites.attempt_enter(target, actor.id) {
        return false;
    }
    sites.depart(origin, actor.id);
    actor.site = Some(target);
    true
}

/// Try to extract material from the actor's site into its ledger.
pub fn attempt_extract<S: SiteGraph + ?Sized>(actor: &mut Actor, sites: &mut S) -> bool {
    if !actor.is_active() {
        return false;
    }
    let Some(site) = actor.site else {
        return false;
    };
    sites.attempt_extract(site, actor.id, &mut actor.ledger)
}
