//! Built-in settler policy.
//!
//! Stands in for a human at the controls so sessions can run unattended.
//! It knows nothing the site graph does not expose through
//! [`SiteGraph::neighbors`].

use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::config::AutopilotConfig;
use crate::game::{ActorId, Command, Game, ItemKind, SiteGraph, SiteId};

/// Deterministic settler policy.
///
/// Wandering goes through [`Command::Wander`], so the game's own seed picks
/// where idle settlers end up.
#[derive(Debug, Clone)]
pub struct Autopilot {
    config: AutopilotConfig,
    /// Last site each settler installed a gate on.
    last_gate: HashMap<ActorId, SiteId>,
}

impl Autopilot {
    /// Create a policy.
    #[must_use]
    pub fn new(config: AutopilotConfig) -> Self {
        Self {
            config,
            last_gate: HashMap::new(),
        }
    }

    /// The asteroid settlers meet on.
    #[must_use]
    pub const fn rally(&self) -> SiteId {
        SiteId(self.config.rally)
    }

    /// Issue at most one command for settler `id`.
    ///
    /// In order of preference: install a held gate away from the last one,
    /// head for the rally asteroid once carrying enough, mine, drill, craft
    /// gates or robots when enabled, wander. Returns the command that took
    /// effect.
    pub fn act<S: SiteGraph>(&mut self, game: &mut Game<S>, id: ActorId) -> Option<Command> {
        let actor = game.actor(id).filter(|actor| actor.is_active() && actor.is_player())?;
        let site = actor.site()?;
        let carried = actor.ledger.total_resources();
        let holds_gate = actor.ledger.count_of(ItemKind::TeleportGate) > 0;
        let rally = self.rally();

        if holds_gate
            && self.last_gate.get(&id) != Some(&site)
            && game.perform(id, Command::PlaceTeleportGate)
        {
            self.last_gate.insert(id, site);
            return Some(Command::PlaceTeleportGate);
        }

        if carried >= self.config.carry_target {
            if site == rally {
                // Wait for the others
                return None;
            }
            if let Some(to) = next_hop(game.sites(), site, rally) {
                let command = Command::Move { to };
                if game.perform(id, command) {
                    return Some(command);
                }
            }
        }

        let mut plan = vec![Command::Mine, Command::Drill];
        if self.config.craft_gates {
            plan.push(Command::CraftTeleportGates);
        }
        if self.config.craft_robots {
            plan.push(Command::CraftRobot);
        }
        plan.push(Command::Wander);
        plan.into_iter().find(|command| game.perform(id, *command))
    }
}

/// First step of a shortest path from `from` to `to`.
///
/// Returns `None` when `to` is unreachable or already reached.
pub fn next_hop<S: SiteGraph + ?Sized>(sites: &S, from: SiteId, to: SiteId) -> Option<SiteId> {
    if from == to {
        return None;
    }

    let mut parent: BTreeMap<SiteId, SiteId> = BTreeMap::new();
    let mut frontier = VecDeque::from([from]);
    while let Some(site) = frontier.pop_front() {
        for neighbor in sites.neighbors(site) {
            if neighbor == from || parent.contains_key(&neighbor) {
                continue;
            }
            parent.insert(neighbor, site);
            if neighbor == to {
                let mut step = to;
                while let Some(&previous) = parent.get(&step) {
                    if previous == from {
                        return Some(step);
                    }
                    step = previous;
                }
                return None;
            }
            frontier.push_back(neighbor);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{ActorKind, Asteroid, Belt, Material, Rules};

    fn line(n: u32) -> Belt {
        let mut belt = Belt::new();
        for _ in 0..n {
            belt.add(Asteroid::new(0, None));
        }
        for i in 1..n {
            belt.link(SiteId(i - 1), SiteId(i));
        }
        belt
    }

    #[test]
    fn test_next_hop_on_a_line() {
        let belt = line(5);
        assert_eq!(next_hop(&belt, SiteId(4), SiteId(0)), Some(SiteId(3)));
        assert_eq!(next_hop(&belt, SiteId(0), SiteId(4)), Some(SiteId(1)));
        assert_eq!(next_hop(&belt, SiteId(2), SiteId(2)), None);
    }

    #[test]
    fn test_next_hop_takes_shortcut() {
        let mut belt = line(6);
        belt.link(SiteId(0), SiteId(5));
        assert_eq!(next_hop(&belt, SiteId(5), SiteId(0)), Some(SiteId(0)));
        assert_eq!(next_hop(&belt, SiteId(4), SiteId(0)), Some(SiteId(5)));
    }

    #[test]
    fn test_next_hop_unreachable() {
        let mut belt = line(3);
        belt.add(Asteroid::new(0, None));
        assert_eq!(next_hop(&belt, SiteId(0), SiteId(3)), None);
    }

    #[test]
    fn test_mines_before_wandering() {
        let mut belt = line(2);
        belt.get_mut(SiteId(1)).unwrap().mantle = 1;
        belt.get_mut(SiteId(1)).unwrap().core = Some(Material::Iron);
        let mut game = Game::new(belt, Rules::default(), 1);
        let settler = game.spawn(ActorKind::Player, SiteId(1)).unwrap();
        let mut pilot = Autopilot::new(AutopilotConfig::default());

        assert_eq!(pilot.act(&mut game, settler), Some(Command::Drill));
        assert_eq!(pilot.act(&mut game, settler), Some(Command::Mine));
        assert_eq!(pilot.act(&mut game, settler), Some(Command::Wander));
        assert_eq!(game.actor(settler).unwrap().site(), Some(SiteId(0)));
    }

    #[test]
    fn test_loaded_settler_heads_for_rally() {
        let mut game = Game::new(line(4), Rules::default(), 1);
        let settler = game.spawn(ActorKind::Player, SiteId(3)).unwrap();
        game.actor_mut(settler)
            .unwrap()
            .ledger
            .add_resource(Material::Coal, 3);
        let mut pilot = Autopilot::new(AutopilotConfig::default());

        for expected in [2, 1, 0] {
            assert_eq!(
                pilot.act(&mut game, settler),
                Some(Command::Move { to: SiteId(expected) })
            );
        }
        assert_eq!(pilot.act(&mut game, settler), None);
        assert_eq!(game.actor(settler).unwrap().site(), Some(SiteId(0)));
    }

    #[test]
    fn test_crafts_and_spreads_gates() {
        let config = AutopilotConfig {
            carry_target: 100,
            craft_gates: true,
            ..AutopilotConfig::default()
        };
        let mut game = Game::new(line(3), Rules::default(), 1);
        let settler = game.spawn(ActorKind::Player, SiteId(0)).unwrap();
        let ledger = &mut game.actor_mut(settler).unwrap().ledger;
        ledger.add_resource(Material::Iron, 2);
        ledger.add_resource(Material::WaterIce, 1);
        ledger.add_resource(Material::Uranium, 1);
        let mut pilot = Autopilot::new(config);

        assert_eq!(
            pilot.act(&mut game, settler),
            Some(Command::CraftTeleportGates)
        );
        assert_eq!(
            pilot.act(&mut game, settler),
            Some(Command::PlaceTeleportGate)
        );
        // Second gate waits for a different asteroid
        assert_eq!(pilot.act(&mut game, settler), Some(Command::Wander));
        assert_eq!(game.actor(settler).unwrap().site(), Some(SiteId(1)));
        assert_eq!(
            pilot.act(&mut game, settler),
            Some(Command::PlaceTeleportGate)
        );
    }

    #[test]
    fn test_ignores_ufos_and_the_dead() {
        let mut game = Game::new(line(2), Rules::default(), 1);
        let ufo = game.spawn(ActorKind::Autonomous, SiteId(0)).unwrap();
        let settler = game.spawn(ActorKind::Player, SiteId(0)).unwrap();
        game.react_to_storm(settler);
        let mut pilot = Autopilot::new(AutopilotConfig::default());

        assert_eq!(pilot.act(&mut game, ufo), None);
        assert_eq!(pilot.act(&mut game, settler), None);
    }

    #[test]
    fn test_crafts_robots_when_enabled() {
        let config = AutopilotConfig {
            carry_target: 100,
            craft_robots: true,
            ..AutopilotConfig::default()
        };
        let mut game = Game::new(line(2), Rules::default(), 1);
        let settler = game.spawn(ActorKind::Player, SiteId(0)).unwrap();
        let ledger = &mut game.actor_mut(settler).unwrap().ledger;
        ledger.add_resource(Material::Iron, 1);
        ledger.add_resource(Material::Coal, 1);
        ledger.add_resource(Material::Uranium, 1);
        let mut pilot = Autopilot::new(config);

        assert_eq!(pilot.act(&mut game, settler), Some(Command::CraftRobot));
        assert_eq!(game.queue().len(), 2);
        assert_eq!(pilot.act(&mut game, settler), Some(Command::Wander));
    }
}
