//! Crafting recipes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::game::{Ledger, Material};

/// Materials consumed to build something.
///
/// Zero amounts are dropped, also when a recipe is read from a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Material, u32>", into = "BTreeMap<Material, u32>")]
pub struct Recipe(BTreeMap<Material, u32>);

impl Recipe {
    /// Create a recipe from `(material, amount)` pairs.
    #[must_use]
    pub fn new(parts: impl IntoIterator<Item = (Material, u32)>) -> Self {
        Self(parts.into_iter().filter(|(_, amount)| *amount > 0).collect())
    }

    /// Recipe for a pair of teleport gates: two iron, one water ice, one uranium.
    #[must_use]
    pub fn teleport_gates() -> Self {
        Self::new([
            (Material::Iron, 2),
            (Material::WaterIce, 1),
            (Material::Uranium, 1),
        ])
    }

    /// Recipe for a robot: one iron, one coal, one uranium.
    #[must_use]
    pub fn robot() -> Self {
        Self::new([
            (Material::Iron, 1),
            (Material::Coal, 1),
            (Material::Uranium, 1),
        ])
    }

    /// Whether `ledger` holds every part.
    #[must_use]
    pub fn is_affordable(&self, ledger: &Ledger) -> bool {
        ledger.has_all(&self.0)
    }

    /// Required amounts.
    #[must_use]
    pub fn parts(&self) -> &BTreeMap<Material, u32> {
        &self.0
    }

    /// Consume the recipe's materials from `ledger`.
    ///
    /// Either every part is removed or, when something is missing, nothing is.
    pub fn consume(&self, ledger: &mut Ledger) -> bool {
        if !self.is_affordable(ledger) {
            return false;
        }
        for (material, amount) in &self.0 {
            // Availability was checked above
            let _ = ledger.remove_resource(*material, *amount);
        }
        true
    }
}

impl From<BTreeMap<Material, u32>> for Recipe {
    fn from(parts: BTreeMap<Material, u32>) -> Self {
        Self::new(parts)
    }
}

impl From<Recipe> for BTreeMap<Material, u32> {
    fn from(recipe: Recipe) -> Self {
        recipe.0
    }
}

impl Default for Recipe {
    fn default() -> Self {
        Self::teleport_gates()
    }
}
