//! In-memory asteroid belt.
//!
//! Each asteroid has a mantle of rock layers over an optional core. Once the
//! mantle is drilled through, the core can be mined out or filled with a
//! material. Asteroids close to the sun react when their core is exposed:
//! uranium explodes and water ice sublimates.

use std::collections::HashMap;

use crate::game::{ActorId, Item, ItemId, Material, ResourceSink, SiteEvent, SiteGraph, SiteId};

/// A single asteroid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asteroid {
    /// Remaining rock layers over the core.
    pub mantle: u32,
    /// Material in the core, if any.
    pub core: Option<Material>,
    /// Whether the asteroid is currently close to the sun.
    pub near_sun: bool,
    /// Maximum simultaneous occupants (`None` = unlimited).
    pub capacity: Option<usize>,
    neighbors: Vec<SiteId>,
    occupants: Vec<ActorId>,
    gates: Vec<Item>,
    destroyed: bool,
}

impl Asteroid {
    /// Create an asteroid with the given mantle thickness and core.
    #[must_use]
    pub const fn new(mantle: u32, core: Option<Material>) -> Self {
        Self {
            mantle,
            core,
            near_sun: false,
            capacity: None,
            neighbors: Vec::new(),
            occupants: Vec::new(),
            gates: Vec::new(),
            destroyed: false,
        }
    }

    /// Mark the asteroid as being close to the sun.
    #[must_use]
    pub const fn near_sun(mut self) -> Self {
        self.near_sun = true;
        self
    }

    /// Limit how many actors can stand on the asteroid at once.
    #[must_use]
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Actors currently on the asteroid, in arrival order.
    #[must_use]
    pub fn occupants(&self) -> &[ActorId] {
        &self.occupants
    }

    /// Teleport gates installed on the asteroid.
    #[must_use]
    pub fn gates(&self) -> &[Item] {
        &self.gates
    }

    /// Whether the asteroid has been blown apart.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Drilled through with nothing left in the core.
    #[must_use]
    pub const fn is_hollow(&self) -> bool {
        self.mantle == 0 && self.core.is_none()
    }
}

/// A graph of asteroids.
#[derive(Debug, Clone, Default)]
pub struct Belt {
    asteroids: Vec<Asteroid>,
    /// Where each installed gate currently sits.
    gate_sites: HashMap<ItemId, SiteId>,
    events: Vec<SiteEvent>,
}

impl Belt {
    /// Create an empty belt.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an asteroid and return its id.
    #[allow(clippy::cast_possible_truncation)]
    pub fn add(&mut self, asteroid: Asteroid) -> SiteId {
        let id = SiteId(self.asteroids.len() as u32);
        self.asteroids.push(asteroid);
        id
    }

    /// Connect two asteroids in both directions.
    ///
    /// Self-links, unknown ids and duplicate links are ignored.
    pub fn link(&mut self, a: SiteId, b: SiteId) {
        if a == b || self.get(a).is_none() || self.get(b).is_none() {
            return;
        }
        for (from, to) in [(a, b), (b, a)] {
            if let Some(asteroid) = self.get_mut(from) {
                if !asteroid.neighbors.contains(&to) {
                    asteroid.neighbors.push(to);
                }
            }
        }
    }

    /// Number of asteroids, destroyed ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.asteroids.len()
    }

    /// Whether the belt has no asteroids.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.asteroids.is_empty()
    }

    /// Look up an asteroid.
    #[must_use]
    pub fn get(&self, site: SiteId) -> Option<&Asteroid> {
        self.asteroids.get(site.0 as usize)
    }

    /// Look up an asteroid mutably.
    #[must_use]
    pub fn get_mut(&mut self, site: SiteId) -> Option<&mut Asteroid> {
        self.asteroids.get_mut(site.0 as usize)
    }

    /// Iterate over every asteroid with its id.
    pub fn iter(&self) -> impl Iterator<Item = (SiteId, &Asteroid)> {
        self.asteroids
            .iter()
            .enumerate()
            .map(|(index, asteroid)| (SiteId(u32::try_from(index).unwrap_or(u32::MAX)), asteroid))
    }

    /// Where a gate is installed, if it is.
    #[must_use]
    pub fn gate_site(&self, gate: ItemId) -> Option<SiteId> {
        self.gate_sites.get(&gate).copied()
    }

    /// Blow an asteroid apart.
    ///
    /// Installed gates go with it. Occupants are left for the scheduler to
    /// settle through the raised [`SiteEvent::Exploded`].
    pub fn detonate(&mut self, site: SiteId) {
        let Some(asteroid) = self.get_mut(site) else {
            return;
        };
        if asteroid.destroyed {
            return;
        }
        asteroid.destroyed = true;
        asteroid.core = None;
        let gates = std::mem::take(&mut asteroid.gates);
        for gate in gates {
            self.gate_sites.remove(&gate.id);
        }
        self.events.push(SiteEvent::Exploded(site));
    }

    /// Toggle whether an asteroid is close to the sun.
    pub fn set_near_sun(&mut self, site: SiteId, near_sun: bool) {
        if let Some(asteroid) = self.get_mut(site) {
            asteroid.near_sun = near_sun;
        }
        self.expose_core(site);
    }

    /// React to an exposed core near the sun.
    fn expose_core(&mut self, site: SiteId) {
        let Some(asteroid) = self.get_mut(site) else {
            return;
        };
        if asteroid.destroyed || asteroid.mantle > 0 || !asteroid.near_sun {
            return;
        }
        match asteroid.core {
            Some(Material::WaterIce) => asteroid.core = None,
            Some(Material::Uranium) => self.detonate(site),
            _ => {}
        }
    }
}

impl SiteGraph for Belt {
    fn neighbors(&self, site: SiteId) -> Vec<SiteId> {
        // A destroyed asteroid still lists its live neighbors, so whatever
        // survives the blast has somewhere to go. Its gates went with it.
        let Some(asteroid) = self.get(site) else {
            return Vec::new();
        };

        let mut result: Vec<SiteId> = asteroid
            .neighbors
            .iter()
            .copied()
            .filter(|n| self.get(*n).is_some_and(|a| !a.destroyed))
            .collect();

        // An installed gate leads wherever its installed pair sits
        for gate in &asteroid.gates {
            if let Some(exit) = gate.pair.and_then(|pair| self.gate_site(pair)) {
                if exit != site && !result.contains(&exit) {
                    result.push(exit);
                }
            }
        }

        result
    }

    fn attempt_enter(&mut self, site: SiteId, actor: ActorId) -> bool {
        let Some(asteroid) = self.get_mut(site) else {
            return false;
        };
        if asteroid.destroyed || asteroid.occupants.contains(&actor) {
            return false;
        }
        if asteroid
            .capacity
            .is_some_and(|capacity| asteroid.occupants.len() >= capacity)
        {
            return false;
        }
        asteroid.occupants.push(actor);
        true
    }

    fn depart(&mut self, site: SiteId, actor: ActorId) {
        if let Some(asteroid) = self.get_mut(site) {
            asteroid.occupants.retain(|occupant| *occupant != actor);
        }
    }

    fn attempt_extract(
        &mut self,
        site: SiteId,
        _actor: ActorId,
        sink: &mut dyn ResourceSink,
    ) -> bool {
        let Some(asteroid) = self.get_mut(site) else {
            return false;
        };
        if asteroid.destroyed || asteroid.mantle > 0 {
            return false;
        }
        match asteroid.core.take() {
            Some(material) => {
                sink.deposit(material, 1);
                true
            }
            None => false,
        }
    }

    fn drill_one_layer(&mut self, site: SiteId) -> bool {
        let Some(asteroid) = self.get_mut(site) else {
            return false;
        };
        if asteroid.destroyed || asteroid.mantle == 0 {
            return false;
        }
        asteroid.mantle -= 1;
        self.expose_core(site);
        true
    }

    fn place_resource(&mut self, site: SiteId, material: Material) -> bool {
        let Some(asteroid) = self.get_mut(site) else {
            return false;
        };
        if !asteroid.is_hollow() || asteroid.destroyed {
            return false;
        }
        asteroid.core = Some(material);
        self.expose_core(site);
        true
    }

    fn place_teleport_device(&mut self, site: SiteId, device: Item) {
        let Some(asteroid) = self.get_mut(site) else {
            return;
        };
        if asteroid.destroyed {
            return;
        }
        asteroid.gates.push(device);
        self.gate_sites.insert(device.id, site);
    }

    fn withdraw_teleport_device(&mut self, device: ItemId) -> bool {
        let Some(site) = self.gate_sites.remove(&device) else {
            return false;
        };
        if let Some(asteroid) = self.get_mut(site) {
            asteroid.gates.retain(|gate| gate.id != device);
        }
        true
    }

    fn is_sheltered(&self, site: SiteId) -> bool {
        self.get(site).is_some_and(Asteroid::is_hollow)
    }

    fn take_events(&mut self) -> Vec<SiteEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Ledger;

    fn line(n: u32) -> Belt {
        let mut belt = Belt::new();
        for _ in 0..n {
            belt.add(Asteroid::new(1, Some(Material::Iron)));
        }
        for i in 1..n {
            belt.link(SiteId(i - 1), SiteId(i));
        }
        belt
    }

    #[test]
    fn test_link_is_symmetric_and_deduplicated() {
        let mut belt = line(2);
        belt.link(SiteId(0), SiteId(1));
        belt.link(SiteId(0), SiteId(0));

        assert_eq!(belt.neighbors(SiteId(0)), vec![SiteId(1)]);
        assert_eq!(belt.neighbors(SiteId(1)), vec![SiteId(0)]);
    }

    #[test]
    fn test_extract_requires_drilled_mantle() {
        let mut belt = line(1);
        let mut ledger = Ledger::new();

        assert!(!belt.attempt_extract(SiteId(0), ActorId(0), &mut ledger));
        assert!(belt.drill_one_layer(SiteId(0)));
        assert!(!belt.drill_one_layer(SiteId(0)));
        assert!(belt.attempt_extract(SiteId(0), ActorId(0), &mut ledger));
        assert_eq!(ledger.amount_of(Material::Iron), 1);

        // Core is now empty
        assert!(!belt.attempt_extract(SiteId(0), ActorId(0), &mut ledger));
        assert!(belt.is_sheltered(SiteId(0)));
    }

    #[test]
    fn test_capacity_rejects_entry() {
        let mut belt = Belt::new();
        let site = belt.add(Asteroid::new(0, None).with_capacity(1));

        assert!(belt.attempt_enter(site, ActorId(1)));
        assert!(!belt.attempt_enter(site, ActorId(2)));
        assert!(!belt.attempt_enter(site, ActorId(1)));

        belt.depart(site, ActorId(1));
        assert!(belt.attempt_enter(site, ActorId(2)));
    }

    #[test]
    fn test_drilling_uranium_near_sun_explodes() {
        let mut belt = Belt::new();
        let site = belt.add(Asteroid::new(1, Some(Material::Uranium)).near_sun());

        assert!(belt.drill_one_layer(site));
        assert_eq!(belt.take_events(), vec![SiteEvent::Exploded(site)]);
        assert!(belt.get(site).unwrap().is_destroyed());
        assert!(belt.take_events().is_empty());
    }

    #[test]
    fn test_water_ice_sublimates_near_sun() {
        let mut belt = Belt::new();
        let site = belt.add(Asteroid::new(1, Some(Material::WaterIce)).near_sun());

        assert!(belt.drill_one_layer(site));
        assert_eq!(belt.get(site).unwrap().core, None);
        assert!(belt.take_events().is_empty());
    }

    #[test]
    fn test_place_resource_needs_hollow_core() {
        let mut belt = Belt::new();
        let site = belt.add(Asteroid::new(0, None));

        assert!(belt.place_resource(site, Material::Coal));
        assert!(!belt.place_resource(site, Material::Iron));
        assert_eq!(belt.get(site).unwrap().core, Some(Material::Coal));
    }

    #[test]
    fn test_destroyed_asteroid_disappears_from_neighbors() {
        let mut belt = line(3);
        belt.detonate(SiteId(1));

        assert!(belt.neighbors(SiteId(0)).is_empty());
        assert_eq!(belt.neighbors(SiteId(1)), vec![SiteId(0), SiteId(2)]);
        assert!(!belt.attempt_enter(SiteId(1), ActorId(0)));
    }

    #[test]
    fn test_moving_near_sun_exposes_drilled_core() {
        let mut belt = Belt::new();
        let uranium = belt.add(Asteroid::new(0, Some(Material::Uranium)));
        let ice = belt.add(Asteroid::new(0, Some(Material::WaterIce)));
        let buried = belt.add(Asteroid::new(2, Some(Material::Uranium)));

        belt.set_near_sun(buried, true);
        belt.set_near_sun(ice, true);
        assert!(belt.take_events().is_empty());
        assert!(!belt.get(buried).unwrap().is_destroyed());
        assert_eq!(belt.get(ice).unwrap().core, None);

        belt.set_near_sun(uranium, true);
        assert_eq!(belt.take_events(), vec![SiteEvent::Exploded(uranium)]);

        // Moving away again changes nothing
        belt.set_near_sun(buried, false);
        assert!(!belt.get(buried).unwrap().near_sun);
        assert!(belt.take_events().is_empty());
    }

    #[test]
    fn test_gate_pair_links_distant_asteroids() {
        let mut belt = line(4);
        let (a, b) = Item::gate_pair(ItemId(1), ItemId(2));

        belt.place_teleport_device(SiteId(0), a);
        assert_eq!(belt.neighbors(SiteId(0)), vec![SiteId(1)]);

        belt.place_teleport_device(SiteId(3), b);
        assert_eq!(belt.neighbors(SiteId(0)), vec![SiteId(1), SiteId(3)]);
        assert_eq!(belt.neighbors(SiteId(3)), vec![SiteId(2), SiteId(0)]);

        assert!(belt.withdraw_teleport_device(ItemId(2)));
        assert!(!belt.withdraw_teleport_device(ItemId(2)));
        assert_eq!(belt.neighbors(SiteId(0)), vec![SiteId(1)]);
    }

    #[test]
    fn test_detonation_removes_installed_gates() {
        let mut belt = line(2);
        let (a, _) = Item::gate_pair(ItemId(1), ItemId(2));
        belt.place_teleport_device(SiteId(0), a);

        belt.detonate(SiteId(0));
        assert_eq!(belt.gate_site(ItemId(1)), None);
    }
}
