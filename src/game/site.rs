//! The contract between the scheduler and the site graph.
//!
//! The scheduler never owns topology rules. It asks the graph whether an
//! actor may enter, what lies next to a site, and whether anything can be
//! extracted, and it settles whatever hazards the graph reports back.

use serde::{Deserialize, Serialize};

use crate::game::{ActorId, Item, ItemId, Material, ResourceSink};

/// Identifier of a site (an asteroid) in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SiteId(pub u32);

impl std::fmt::Display for SiteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A hazard raised by the site graph that the scheduler must settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteEvent {
    /// The site blew up; everyone on it reacts to the explosion.
    Exploded(SiteId),
}

/// Operations the scheduler and actors need from the site graph.
///
/// Every fallible operation reports a policy failure as `false` and leaves
/// the graph unchanged.
pub trait SiteGraph {
    /// Sites reachable in one move from `site`, in a stable order.
    fn neighbors(&self, site: SiteId) -> Vec<SiteId>;

    /// Ask `site` to accept `actor`.
    fn attempt_enter(&mut self, site: SiteId, actor: ActorId) -> bool;

    /// Notify `site` that `actor` has left it.
    fn depart(&mut self, site: SiteId, actor: ActorId);

    /// Try to move material out of `site` into `sink` on behalf of `actor`.
    fn attempt_extract(
        &mut self,
        site: SiteId,
        actor: ActorId,
        sink: &mut dyn ResourceSink,
    ) -> bool;

    /// Remove one layer of rock covering the site.
    fn drill_one_layer(&mut self, site: SiteId) -> bool;

    /// Store `material` inside the site.
    fn place_resource(&mut self, site: SiteId, material: Material) -> bool;

    /// Install a teleport device on the site.
    fn place_teleport_device(&mut self, site: SiteId, device: Item);

    /// Remove a previously installed teleport device, wherever it is.
    fn withdraw_teleport_device(&mut self, device: ItemId) -> bool;

    /// Whether actors on `site` are protected from solar storms.
    fn is_sheltered(&self, _site: SiteId) -> bool {
        false
    }

    /// Drain hazards raised since the last call.
    fn take_events(&mut self) -> Vec<SiteEvent> {
        Vec::new()
    }
}
