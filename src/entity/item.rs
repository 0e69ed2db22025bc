use serde::{Deserialize, Serialize};

use super::{HashCalculator, Translations};

/// An item or fluid.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Item {
    /// Either `item` or `fluid`
    #[serde(rename = "type")]
    pub item_type: String,
    /// Internal name of the item
    pub name: String,
    /// Localised names
    #[serde(default)]
    pub labels: Translations,
    /// Localised descriptions
    #[serde(default)]
    pub descriptions: Translations,
    /// Whether the labels of the item also serve as labels of the recipe with the same name
    #[serde(default)]
    pub provides_recipe_localisation: bool,
    /// Whether the labels of the item also serve as labels of the machine with the same name
    #[serde(default)]
    pub provides_machine_localisation: bool,
    /// Hash of the icon, empty if the item has none or inherits it
    #[serde(default)]
    pub icon_hash: String,
}

impl Item {
    /// Create an item without any translations or icon.
    pub fn new(item_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            item_type: item_type.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Business identifier: type and name.
    #[must_use]
    pub fn identifier(&self) -> String {
        format!("{}.{}", self.item_type, self.name)
    }

    /// Content hash over all fields.
    #[must_use]
    pub fn content_hash(&self) -> String {
        HashCalculator::new("item")
            .text(&self.item_type)
            .text(&self.name)
            .translations(&self.labels)
            .translations(&self.descriptions)
            .flag(self.provides_recipe_localisation)
            .flag(self.provides_machine_localisation)
            .text(&self.icon_hash)
            .finish()
    }
}
