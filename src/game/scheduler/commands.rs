//! Settler commands.
//!
//! Settlers do nothing on their own turn. Whoever drives them (a human, the
//! autopilot, a fuzzer) issues commands between turns through
//! [`Game::perform`].

use tracing::{debug, trace};

use crate::game::{
    ActorId, ActorKind, Destination, Game, Item, ItemKind, Material, SiteGraph, SiteId,
    attempt_extract, attempt_relocate,
};

/// Most gates a settler may hold and still craft another pair.
pub const MAX_GATES_BEFORE_CRAFTING: usize = 1;

/// An action a settler can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Move to a neighboring asteroid.
    Move {
        /// Destination; must be a neighbor of the current asteroid.
        to: SiteId,
    },
    /// Move to a random neighbor, picked with the game's seeded generator.
    Wander,
    /// Mine the exposed core of the current asteroid.
    Mine,
    /// Drill one layer of the current asteroid's mantle.
    Drill,
    /// Put a carried material into the hollow core of the current asteroid.
    PlaceResource {
        /// Material to give up.
        material: Material,
    },
    /// Build a linked pair of teleport gates from carried materials.
    CraftTeleportGates,
    /// Install one carried teleport gate on the current asteroid.
    PlaceTeleportGate,
    /// Build a robot from carried materials; it joins the turn order on the
    /// current asteroid.
    CraftRobot,
}

impl<S: SiteGraph> Game<S> {
    /// Have a settler carry out `command`.
    ///
    /// Returns whether the command took effect. Commands for unknown,
    /// inactive or autonomous actors are refused. Hazards the command
    /// triggers are settled before returning, so the settler itself may be
    /// dead afterwards.
    pub fn perform(&mut self, id: ActorId, command: Command) -> bool {
        let site = self
            .actors
            .get(&id)
            .filter(|actor| actor.is_active() && actor.is_player())
            .and_then(|actor| actor.site());
        let Some(site) = site else {
            trace!(actor = %id, ?command, "command refused");
            return false;
        };

        let done = match command {
            Command::Move { to } => self.move_settler(id, Destination::Site(to)),
            Command::Wander => self.move_settler(id, Destination::Random),
            Command::Mine => self.mine(id),
            Command::Drill => self.sites.drill_one_layer(site),
            Command::PlaceResource { material } => self.place_resource(id, site, material),
            Command::CraftTeleportGates => self.craft_gates(id),
            Command::PlaceTeleportGate => self.place_gate(id, site),
            Command::CraftRobot => self.craft_robot(id, site),
        };
        trace!(actor = %id, ?command, done, "command");

        self.settle_site_events();
        done
    }

    fn move_settler(&mut self, id: ActorId, destination: Destination) -> bool {
        let Some(actor) = self.actors.get_mut(&id) else {
            return false;
        };
        attempt_relocate(actor, &mut self.sites, destination, &mut self.rng)
    }

    fn mine(&mut self, id: ActorId) -> bool {
        let Some(actor) = self.actors.get_mut(&id) else {
            return false;
        };
        attempt_extract(actor, &mut self.sites)
    }

    fn place_resource(&mut self, id: ActorId, site: SiteId, material: Material) -> bool {
        let Some(actor) = self.actors.get_mut(&id) else {
            return false;
        };
        if actor.ledger.remove_resource(material, 1).is_none() {
            return false;
        }
        if self.sites.place_resource(site, material) {
            true
        } else {
            actor.ledger.add_resource(material, 1);
            false
        }
    }

    fn craft_gates(&mut self, id: ActorId) -> bool {
        let Some(actor) = self.actors.get_mut(&id) else {
            return false;
        };
        if actor.ledger.count_of(ItemKind::TeleportGate) > MAX_GATES_BEFORE_CRAFTING
            || !self.rules.gate_recipe.consume(&mut actor.ledger)
        {
            return false;
        }

        let (first, second) = Item::gate_pair(self.allocate_item(), self.allocate_item());
        if let Some(actor) = self.actors.get_mut(&id) {
            actor.ledger.add_item(first);
            actor.ledger.add_item(second);
        }
        true
    }

    fn craft_robot(&mut self, id: ActorId, site: SiteId) -> bool {
        let affordable = self
            .actors
            .get(&id)
            .is_some_and(|actor| self.rules.robot_recipe.is_affordable(&actor.ledger));
        if !affordable {
            return false;
        }
        // Materials are only spent once the asteroid has room for the robot
        let Some(robot) = self.spawn(ActorKind::Robot, site) else {
            return false;
        };
        if let Some(actor) = self.actors.get_mut(&id) {
            self.rules.robot_recipe.consume(&mut actor.ledger);
        }
        debug!(actor = %id, %robot, "robot built");
        true
    }

    fn place_gate(&mut self, id: ActorId, site: SiteId) -> bool {
        let Some(actor) = self.actors.get_mut(&id) else {
            return false;
        };
        let Some(gate) = actor.ledger.remove_item(ItemKind::TeleportGate) else {
            return false;
        };
        self.sites.place_teleport_device(site, gate);
        true
    }
}
