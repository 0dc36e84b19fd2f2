//! Resource ledgers: what a single actor carries.
//!
//! Materials are fungible quantities. Items are individually addressable
//! (a teleport gate knows the id of its pair), so they are stored as
//! instances rather than counts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A minable material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    /// Coal.
    Coal,
    /// Iron ore.
    Iron,
    /// Uranium. Explodes when exposed near the sun.
    Uranium,
    /// Water ice. Sublimates when exposed near the sun.
    WaterIce,
}

impl Material {
    /// Every material, in a fixed order.
    pub const ALL: [Material; 4] = [
        Material::Coal,
        Material::Iron,
        Material::Uranium,
        Material::WaterIce,
    ];
}

/// Kind of a discrete item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// One half of a paired teleportation device.
    TeleportGate,
}

/// Unique identifier for an item instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u32);

/// A single item instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Identity of this instance.
    pub id: ItemId,
    /// What kind of item this is.
    pub kind: ItemKind,
    /// The paired instance, for items that come in pairs.
    pub pair: Option<ItemId>,
}

impl Item {
    /// Create both halves of a teleport gate pair.
    #[must_use]
    pub const fn gate_pair(first: ItemId, second: ItemId) -> (Self, Self) {
        (
            Self {
                id: first,
                kind: ItemKind::TeleportGate,
                pair: Some(second),
            },
            Self {
                id: second,
                kind: ItemKind::TeleportGate,
                pair: Some(first),
            },
        )
    }
}

/// Anything that can receive extracted material.
pub trait ResourceSink {
    /// Accept `amount` units of `material`.
    fn deposit(&mut self, material: Material, amount: u32);
}

/// Materials and items held by one actor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    resources: BTreeMap<Material, u32>,
    items: BTreeMap<ItemKind, Vec<Item>>,
}

impl Ledger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` units of `material`.
    pub fn add_resource(&mut self, material: Material, amount: u32) {
        if amount == 0 {
            return;
        }
        let held = self.resources.entry(material).or_insert(0);
        *held = held.saturating_add(amount);
    }

    /// Remove `amount` units of `material`.
    ///
    /// Returns the removed amount, or `None` (leaving the ledger untouched)
    /// when fewer than `amount` units are held.
    pub fn remove_resource(&mut self, material: Material, amount: u32) -> Option<u32> {
        let held = self.amount_of(material);
        if held < amount {
            return None;
        }
        if amount == 0 {
            return Some(0);
        }
        if held == amount {
            self.resources.remove(&material);
        } else {
            self.resources.insert(material, held - amount);
        }
        Some(amount)
    }

    /// Units of `material` held.
    #[must_use]
    pub fn amount_of(&self, material: Material) -> u32 {
        self.resources.get(&material).copied().unwrap_or(0)
    }

    /// Snapshot of every held material with a non-zero amount.
    #[must_use]
    pub fn resources(&self) -> &BTreeMap<Material, u32> {
        &self.resources
    }

    /// Sum of all held material units.
    #[must_use]
    pub fn total_resources(&self) -> u32 {
        self.resources.values().fold(0, |acc, n| acc.saturating_add(*n))
    }

    /// Check whether at least the given amounts are held.
    #[must_use]
    pub fn has_all(&self, amounts: &BTreeMap<Material, u32>) -> bool {
        amounts
            .iter()
            .all(|(material, needed)| self.amount_of(*material) >= *needed)
    }

    /// Add an item instance.
    pub fn add_item(&mut self, item: Item) {
        self.items.entry(item.kind).or_default().push(item);
    }

    /// Remove the first held instance of `kind`.
    pub fn remove_item(&mut self, kind: ItemKind) -> Option<Item> {
        let held = self.items.get_mut(&kind)?;
        if held.is_empty() {
            return None;
        }
        let item = held.remove(0);
        if held.is_empty() {
            self.items.remove(&kind);
        }
        Some(item)
    }

    /// Remove a specific item instance.
    pub fn take_item(&mut self, id: ItemId) -> Option<Item> {
        let (kind, index) = self.items.iter().find_map(|(kind, held)| {
            held.iter()
                .position(|item| item.id == id)
                .map(|index| (*kind, index))
        })?;
        let held = self.items.get_mut(&kind)?;
        let item = held.remove(index);
        if held.is_empty() {
            self.items.remove(&kind);
        }
        Some(item)
    }

    /// Number of held instances of `kind`.
    #[must_use]
    pub fn count_of(&self, kind: ItemKind) -> usize {
        self.items.get(&kind).map_or(0, Vec::len)
    }

    /// Iterate over every held item.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values().flatten()
    }

    /// Total number of held items of any kind.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.values().map(Vec::len).sum()
    }

    /// Check whether nothing at all is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty() && self.items.is_empty()
    }

    /// Drop everything held.
    pub fn clear(&mut self) {
        self.resources.clear();
        self.items.clear();
    }
}

impl ResourceSink for Ledger {
    fn deposit(&mut self, material: Material, amount: u32) {
        self.add_resource(material, amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove_resource() {
        let mut ledger = Ledger::new();
        ledger.add_resource(Material::Iron, 3);
        assert_eq!(ledger.amount_of(Material::Iron), 3);

        assert_eq!(ledger.remove_resource(Material::Iron, 2), Some(2));
        assert_eq!(ledger.amount_of(Material::Iron), 1);
    }

    #[test]
    fn test_remove_more_than_held_leaves_ledger_unchanged() {
        let mut ledger = Ledger::new();
        ledger.add_resource(Material::Coal, 2);
        let before = ledger.clone();

        assert_eq!(ledger.remove_resource(Material::Coal, 3), None);
        assert_eq!(ledger.remove_resource(Material::Uranium, 1), None);
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_remove_nothing_always_succeeds() {
        let mut ledger = Ledger::new();
        assert_eq!(ledger.remove_resource(Material::Coal, 0), Some(0));
        assert!(ledger.resources().is_empty());

        ledger.add_resource(Material::Iron, 2);
        assert_eq!(ledger.remove_resource(Material::Iron, 0), Some(0));
        assert_eq!(ledger.amount_of(Material::Iron), 2);
    }

    #[test]
    fn test_emptied_material_disappears_from_snapshot() {
        let mut ledger = Ledger::new();
        ledger.add_resource(Material::WaterIce, 1);
        ledger.remove_resource(Material::WaterIce, 1);

        assert!(ledger.resources().is_empty());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_remove_item_takes_first_instance() {
        let mut ledger = Ledger::new();
        let (a, b) = Item::gate_pair(ItemId(1), ItemId(2));
        ledger.add_item(a);
        ledger.add_item(b);

        assert_eq!(ledger.count_of(ItemKind::TeleportGate), 2);
        assert_eq!(ledger.remove_item(ItemKind::TeleportGate), Some(a));
        assert_eq!(ledger.remove_item(ItemKind::TeleportGate), Some(b));
        assert_eq!(ledger.remove_item(ItemKind::TeleportGate), None);
    }

    #[test]
    fn test_take_item_by_id() {
        let mut ledger = Ledger::new();
        let (a, b) = Item::gate_pair(ItemId(7), ItemId(8));
        ledger.add_item(a);
        ledger.add_item(b);

        assert_eq!(ledger.take_item(ItemId(8)), Some(b));
        assert_eq!(ledger.take_item(ItemId(8)), None);
        assert_eq!(ledger.item_count(), 1);
    }

    #[test]
    fn test_item_transfer_conserves_count() {
        let mut from = Ledger::new();
        let mut to = Ledger::new();
        let (a, b) = Item::gate_pair(ItemId(1), ItemId(2));
        from.add_item(a);
        from.add_item(b);

        let moved = from.remove_item(ItemKind::TeleportGate).unwrap();
        to.add_item(moved);

        assert_eq!(from.item_count() + to.item_count(), 2);
    }

    #[test]
    fn test_has_all() {
        let mut ledger = Ledger::new();
        ledger.add_resource(Material::Iron, 2);
        ledger.add_resource(Material::Uranium, 1);

        let mut needed = BTreeMap::new();
        needed.insert(Material::Iron, 2);
        needed.insert(Material::Uranium, 1);
        assert!(ledger.has_all(&needed));

        needed.insert(Material::WaterIce, 1);
        assert!(!ledger.has_all(&needed));
    }

    #[test]
    fn test_deposit_through_sink() {
        let mut ledger = Ledger::new();
        let sink: &mut dyn ResourceSink = &mut ledger;
        sink.deposit(Material::Coal, 1);

        assert_eq!(ledger.amount_of(Material::Coal), 1);
        assert_eq!(ledger.total_resources(), 1);
    }
}
