//! Turn scheduling and game termination.
//!
//! The [`Game`] owns the activation queue, the registry of live settlers and
//! every actor record. Each call to [`Game::advance_turn`] moves the head of
//! the queue to the tail *before* stepping it, so an actor that dies during
//! its own step removes that fresh tail entry by identity.

mod commands;

pub use commands::{Command, MAX_GATES_BEFORE_CRAFTING};

use std::collections::{BTreeMap, VecDeque};
use std::sync::mpsc::Sender;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::game::{
    Actor, ActorId, ActorKind, ActorState, Belt, Destination, Hazard, ItemId, Material, Recipe,
    SiteEvent, SiteGraph, SiteId, attempt_extract, attempt_relocate,
};

/// Units of each material the settlers need on one asteroid to win.
pub const DEFAULT_GOAL_AMOUNT: u32 = 3;

/// Minimum amount of each material required on a single site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoalThresholds(BTreeMap<Material, u32>);

impl GoalThresholds {
    /// Create thresholds from `(material, amount)` pairs.
    #[must_use]
    pub fn new(parts: impl IntoIterator<Item = (Material, u32)>) -> Self {
        Self(parts.into_iter().collect())
    }

    /// The same threshold for every material.
    #[must_use]
    pub fn uniform(amount: u32) -> Self {
        Self::new(Material::ALL.map(|material| (material, amount)))
    }

    /// Required amounts.
    #[must_use]
    pub fn amounts(&self) -> &BTreeMap<Material, u32> {
        &self.0
    }

    /// Whether `totals` meets every threshold at once.
    #[must_use]
    pub fn is_met_by(&self, totals: &BTreeMap<Material, u32>) -> bool {
        self.0
            .iter()
            .all(|(material, needed)| totals.get(material).copied().unwrap_or(0) >= *needed)
    }
}

impl Default for GoalThresholds {
    fn default() -> Self {
        Self::uniform(DEFAULT_GOAL_AMOUNT)
    }
}

/// Fixed rules of one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// What the settlers must gather on one asteroid.
    pub goal: GoalThresholds,
    /// What a pair of teleport gates costs.
    pub gate_recipe: Recipe,
    /// What a robot costs.
    pub robot_recipe: Recipe,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            goal: GoalThresholds::default(),
            gate_recipe: Recipe::teleport_gates(),
            robot_recipe: Recipe::robot(),
        }
    }
}

/// Terminal verdict of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The settlers gathered everything on one asteroid.
    DefendersWon,
    /// No settler is left.
    DefendersLost,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DefendersWon => write!(f, "defenders won"),
            Self::DefendersLost => write!(f, "defenders lost"),
        }
    }
}

/// State of the game after an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Nobody has won or lost yet.
    Ongoing,
    /// The game is over.
    Ended(Verdict),
}

impl Outcome {
    /// The verdict, if the game is over.
    #[must_use]
    pub const fn verdict(self) -> Option<Verdict> {
        match self {
            Self::Ongoing => None,
            Self::Ended(verdict) => Some(verdict),
        }
    }

    /// Whether the game is over.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ended(_))
    }
}

/// Receives the end of a game.
pub trait OutcomeObserver {
    /// Called once, right after the turn that ended the game.
    fn on_game_ended(&mut self, verdict: Verdict);
}

impl OutcomeObserver for Sender<Verdict> {
    fn on_game_ended(&mut self, verdict: Verdict) {
        // A dropped receiver just means nobody is listening any more
        let _ = self.send(verdict);
    }
}

impl<F: FnMut(Verdict)> OutcomeObserver for F {
    fn on_game_ended(&mut self, verdict: Verdict) {
        self(verdict);
    }
}

/// The turn scheduler and authoritative game state.
pub struct Game<S = Belt> {
    sites: S,
    rules: Rules,
    actors: BTreeMap<ActorId, Actor>,
    queue: VecDeque<ActorId>,
    players: Vec<ActorId>,
    rng: StdRng,
    next_actor: u32,
    next_item: u32,
    turn: u64,
    verdict: Option<Verdict>,
    observers: Vec<Box<dyn OutcomeObserver>>,
}

impl<S: std::fmt::Debug> std::fmt::Debug for Game<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("sites", &self.sites)
            .field("rules", &self.rules)
            .field("actors", &self.actors)
            .field("queue", &self.queue)
            .field("players", &self.players)
            .field("turn", &self.turn)
            .field("verdict", &self.verdict)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl<S: SiteGraph> Game<S> {
    /// Create a game over `sites` with no actors yet.
    ///
    /// `seed` drives every random relocation: robots wandering or fleeing
    /// an explosion, and settlers told to [`Command::Wander`].
    #[must_use]
    pub fn new(sites: S, rules: Rules, seed: u64) -> Self {
        Self {
            sites,
            rules,
            actors: BTreeMap::new(),
            queue: VecDeque::new(),
            players: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
            next_actor: 0,
            next_item: 0,
            turn: 0,
            verdict: None,
            observers: Vec::new(),
        }
    }

    /// Attach an observer for the end of the game.
    pub fn add_observer(&mut self, observer: Box<dyn OutcomeObserver>) {
        self.observers.push(observer);
    }

    /// Create an actor on `site` and put it in the activation queue.
    ///
    /// Settlers are also added to the player registry. Returns `None` when
    /// the site refuses the newcomer.
    pub fn spawn(&mut self, kind: ActorKind, site: SiteId) -> Option<ActorId> {
        let id = ActorId(self.next_actor);
        if !self.sites.attempt_enter(site, id) {
            return None;
        }
        self.next_actor += 1;
        self.actors.insert(id, Actor::new(id, kind, site));
        self.register(id);
        if kind == ActorKind::Player {
            self.register_player(id);
        }
        debug!(actor = %id, ?kind, %site, "spawned");
        Some(id)
    }

    /// Append an active actor to the activation queue.
    ///
    /// Returns `false` if the actor is unknown, inactive or already queued.
    pub fn register(&mut self, id: ActorId) -> bool {
        if !self.actors.get(&id).is_some_and(Actor::is_active) || self.queue.contains(&id) {
            return false;
        }
        self.queue.push_back(id);
        true
    }

    /// Remove an actor from the activation queue.
    ///
    /// Removing an absent actor is a no-op and returns `false`.
    pub fn deregister(&mut self, id: ActorId) -> bool {
        let before = self.queue.len();
        self.queue.retain(|queued| *queued != id);
        self.queue.len() != before
    }

    /// Add an active settler to the player registry.
    pub fn register_player(&mut self, id: ActorId) -> bool {
        let eligible = self
            .actors
            .get(&id)
            .is_some_and(|actor| actor.is_active() && actor.is_player());
        if !eligible || self.players.contains(&id) {
            return false;
        }
        self.players.push(id);
        true
    }

    /// Remove a settler from the player registry. Absent ids are a no-op.
    pub fn deregister_player(&mut self, id: ActorId) -> bool {
        let before = self.players.len();
        self.players.retain(|player| *player != id);
        self.players.len() != before
    }

    /// Play one actor's turn and evaluate the game.
    ///
    /// Once the game has ended this returns the stored verdict without
    /// stepping anyone or notifying observers again.
    pub fn advance_turn(&mut self) -> Outcome {
        if let Some(verdict) = self.verdict {
            return Outcome::Ended(verdict);
        }

        let Some(id) = self.queue.pop_front() else {
            debug!(turn = self.turn, "activation queue is empty");
            self.finish(Verdict::DefendersLost);
            return Outcome::Ended(Verdict::DefendersLost);
        };
        self.queue.push_back(id);
        self.turn += 1;
        debug!(turn = self.turn, actor = %id, "turn");

        self.step(id);

        let outcome = self.evaluate_outcome();
        if let Outcome::Ended(verdict) = outcome {
            self.finish(verdict);
        }
        outcome
    }

    /// Judge the current state without changing it.
    ///
    /// Settlers lose when none is registered. They win when the settlers
    /// standing on some single site together hold every goal amount.
    #[must_use]
    pub fn evaluate_outcome(&self) -> Outcome {
        if self.players.is_empty() {
            return Outcome::Ended(Verdict::DefendersLost);
        }
        let won = self
            .site_totals()
            .values()
            .any(|totals| self.rules.goal.is_met_by(totals));
        if won {
            Outcome::Ended(Verdict::DefendersWon)
        } else {
            Outcome::Ongoing
        }
    }

    /// Sum of registered settlers' materials, per site they stand on.
    #[must_use]
    pub fn site_totals(&self) -> BTreeMap<SiteId, BTreeMap<Material, u32>> {
        let mut totals: BTreeMap<SiteId, BTreeMap<Material, u32>> = BTreeMap::new();
        for actor in self.players.iter().filter_map(|id| self.actors.get(id)) {
            let Some(site) = actor.site() else {
                continue;
            };
            let site_total = totals.entry(site).or_default();
            for (material, amount) in actor.ledger.resources() {
                let sum = site_total.entry(*material).or_insert(0);
                *sum = sum.saturating_add(*amount);
            }
        }
        totals
    }

    /// React to the actor's asteroid exploding.
    ///
    /// Settlers die. UFOs are destroyed along with what they carried.
    /// Robots are thrown onto a random neighbor, and destroyed only when
    /// none will take them.
    pub fn react_to_explosion(&mut self, id: ActorId) {
        let Some(kind) = self.active_kind(id) else {
            return;
        };
        match kind {
            ActorKind::Player => self.kill_settler(id, Hazard::Explosion),
            ActorKind::Robot => {
                if self.relocate_randomly(id) {
                    info!(actor = %id, "robot thrown clear of explosion");
                } else {
                    self.blow_up(id, kind);
                }
            }
            ActorKind::Autonomous => self.blow_up(id, kind),
        }
    }

    /// React to a solar storm sweeping the actor's asteroid.
    ///
    /// Settlers die. UFOs and robots are blown off the map and leave the
    /// game alive.
    pub fn react_to_storm(&mut self, id: ActorId) {
        let Some(kind) = self.active_kind(id) else {
            return;
        };
        match kind {
            ActorKind::Player => self.kill_settler(id, Hazard::Storm),
            ActorKind::Autonomous | ActorKind::Robot => {
                self.deregister(id);
                if let Some(actor) = self.actors.get_mut(&id) {
                    actor.retire(&mut self.sites, ActorState::Adrift);
                }
                info!(actor = %id, ?kind, "swept away by storm");
            }
        }
    }

    /// Sweep `site` with a solar storm.
    ///
    /// Returns how many actors were hit. Sheltered sites protect everyone.
    pub fn storm(&mut self, site: SiteId) -> usize {
        if self.sites.is_sheltered(site) {
            debug!(%site, "storm passed over a sheltered asteroid");
            return 0;
        }
        let victims = self.actors_at(site);
        for id in &victims {
            self.react_to_storm(*id);
        }
        victims.len()
    }

    /// Settle every hazard the site graph has raised.
    pub fn settle_site_events(&mut self) {
        loop {
            let events = self.sites.take_events();
            if events.is_empty() {
                return;
            }
            for event in events {
                match event {
                    SiteEvent::Exploded(site) => {
                        let victims = self.actors_at(site);
                        info!(%site, victims = victims.len(), "asteroid exploded");
                        for id in victims {
                            self.react_to_explosion(id);
                        }
                    }
                }
            }
        }
    }

    /// Number of turns played so far.
    #[must_use]
    pub const fn turn(&self) -> u64 {
        self.turn
    }

    /// The verdict, once the game has ended.
    #[must_use]
    pub const fn verdict(&self) -> Option<Verdict> {
        self.verdict
    }

    /// The rules this game is played by.
    #[must_use]
    pub const fn rules(&self) -> &Rules {
        &self.rules
    }

    /// What the settlers must gather to win.
    #[must_use]
    pub const fn goal(&self) -> &GoalThresholds {
        &self.rules.goal
    }

    /// Look up an actor, live or not.
    #[must_use]
    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    /// Look up an actor mutably.
    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    /// Every actor ever spawned, in spawn order.
    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    /// The activation queue, head first.
    #[must_use]
    pub const fn queue(&self) -> &VecDeque<ActorId> {
        &self.queue
    }

    /// The actor whose turn comes next.
    #[must_use]
    pub fn next_actor(&self) -> Option<ActorId> {
        self.queue.front().copied()
    }

    /// The player registry.
    #[must_use]
    pub fn players(&self) -> &[ActorId] {
        &self.players
    }

    /// The site graph.
    #[must_use]
    pub const fn sites(&self) -> &S {
        &self.sites
    }

    /// The site graph, mutably. Call [`Game::settle_site_events`] after
    /// anything that may raise a hazard.
    pub fn sites_mut(&mut self) -> &mut S {
        &mut self.sites
    }

    /// Active actors standing on `site`, in spawn order.
    #[must_use]
    pub fn actors_at(&self, site: SiteId) -> Vec<ActorId> {
        self.actors
            .values()
            .filter(|actor| actor.is_active() && actor.site() == Some(site))
            .map(Actor::id)
            .collect()
    }

    fn active_kind(&self, id: ActorId) -> Option<ActorKind> {
        self.actors
            .get(&id)
            .filter(|actor| actor.is_active())
            .map(Actor::kind)
    }

    fn step(&mut self, id: ActorId) {
        match self.active_kind(id) {
            // Settlers act through commands between turns
            Some(ActorKind::Player) | None => {}
            Some(ActorKind::Autonomous) => self.step_ufo(id),
            Some(ActorKind::Robot) => self.step_robot(id),
        }
    }

    /// Drill one layer if possible, otherwise wander to a random neighbor.
    fn step_robot(&mut self, id: ActorId) {
        let Some(site) = self.actors.get(&id).and_then(Actor::site) else {
            return;
        };
        let drilled = self.sites.drill_one_layer(site);
        if drilled {
            trace!(actor = %id, %site, "robot drilled");
        } else if self.relocate_randomly(id) {
            trace!(actor = %id, "robot wandered");
        }
        self.settle_site_events();
    }

    /// Move an active actor to a random neighbor of its site.
    fn relocate_randomly(&mut self, id: ActorId) -> bool {
        let Some(actor) = self.actors.get_mut(&id).filter(|actor| actor.is_active()) else {
            return false;
        };
        attempt_relocate(actor, &mut self.sites, Destination::Random, &mut self.rng)
    }

    /// Mine if possible, otherwise take the first neighbor that lets us in.
    fn step_ufo(&mut self, id: ActorId) {
        let Some(actor) = self.actors.get_mut(&id) else {
            return;
        };
        let mined = attempt_extract(actor, &mut self.sites);
        let origin = actor.site();
        self.settle_site_events();
        if mined {
            trace!(actor = %id, "ufo mined");
            return;
        }
        let Some(origin) = origin else {
            return;
        };

        for destination in self.sites.neighbors(origin) {
            let Some(actor) = self.actors.get_mut(&id).filter(|actor| actor.is_active()) else {
                return;
            };
            let moved = attempt_relocate(
                actor,
                &mut self.sites,
                Destination::Site(destination),
                &mut self.rng,
            );
            self.settle_site_events();
            if moved {
                trace!(actor = %id, site = %destination, "ufo moved");
                return;
            }
        }
    }

    fn kill_settler(&mut self, id: ActorId, hazard: Hazard) {
        let Some(actor) = self.actors.get_mut(&id) else {
            return;
        };
        // A held gate strands its installed twin
        let stranded: Vec<ItemId> = actor.ledger.items().filter_map(|item| item.pair).collect();
        for gate in stranded {
            if self.sites.withdraw_teleport_device(gate) {
                debug!(actor = %id, gate = gate.0, "withdrew stranded gate");
            }
        }
        actor.ledger.clear();
        actor.retire(&mut self.sites, ActorState::Destroyed(hazard));

        self.deregister(id);
        self.deregister_player(id);
        info!(actor = %id, ?hazard, "settler died");
    }

    fn blow_up(&mut self, id: ActorId, kind: ActorKind) {
        self.deregister(id);
        if let Some(actor) = self.actors.get_mut(&id) {
            actor.ledger.clear();
            actor.retire(&mut self.sites, ActorState::Destroyed(Hazard::Explosion));
        }
        info!(actor = %id, ?kind, "destroyed in explosion");
    }

    fn allocate_item(&mut self) -> ItemId {
        let id = ItemId(self.next_item);
        self.next_item += 1;
        id
    }

    fn finish(&mut self, verdict: Verdict) {
        if self.verdict.is_some() {
            return;
        }
        self.verdict = Some(verdict);
        info!(turn = self.turn, %verdict, "game ended");
        for observer in &mut self.observers {
            observer.on_game_ended(verdict);
        }
    }
}
