use serde::{Deserialize, Serialize};

use super::{HashCalculator, Translations};

/// Crafting statistics of a machine.
///
/// Merging and reducing treat these values as one unit: a child either
/// inherits all of them from its parent or overrides all of them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MachineData {
    /// Crafting categories the machine supports, sorted
    pub crafting_categories: Vec<String>,
    /// Crafting speed multiplier
    pub crafting_speed: f64,
    /// Number of item slots, 255 meaning unlimited
    pub number_of_item_slots: u32,
    /// Number of fluid input boxes
    pub number_of_fluid_input_slots: u32,
    /// Number of fluid output boxes
    pub number_of_fluid_output_slots: u32,
    /// Number of module slots
    pub number_of_module_slots: u32,
    /// Energy usage, below 1000 in its unit
    pub energy_usage: f64,
    /// Unit of the energy usage, e.g. `kW`
    pub energy_usage_unit: String,
}

impl MachineData {
    /// Hash over all crafting statistics.
    #[must_use]
    pub fn data_hash(&self) -> String {
        HashCalculator::new("machine-data")
            .texts(&self.crafting_categories)
            .number(self.crafting_speed)
            .integer(u64::from(self.number_of_item_slots))
            .integer(u64::from(self.number_of_fluid_input_slots))
            .integer(u64::from(self.number_of_fluid_output_slots))
            .integer(u64::from(self.number_of_module_slots))
            .number(self.energy_usage)
            .text(&self.energy_usage_unit)
            .finish()
    }

    /// Whether all values are at their defaults, i.e. inherited from the parent.
    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// A crafting machine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Machine {
    /// Internal name of the machine
    pub name: String,
    /// Localised names
    #[serde(default)]
    pub labels: Translations,
    /// Localised descriptions
    #[serde(default)]
    pub descriptions: Translations,
    /// Crafting statistics
    #[serde(default)]
    pub data: MachineData,
    /// Hash of the icon, empty if the machine has none or inherits it
    #[serde(default)]
    pub icon_hash: String,
}

impl Machine {
    /// Create a machine with default statistics.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Business identifier: the machine type and name.
    #[must_use]
    pub fn identifier(&self) -> String {
        format!("machine.{}", self.name)
    }

    /// Content hash over all fields.
    #[must_use]
    pub fn content_hash(&self) -> String {
        HashCalculator::new("machine")
            .text(&self.name)
            .translations(&self.labels)
            .translations(&self.descriptions)
            .text(&self.data.data_hash())
            .text(&self.icon_hash)
            .finish()
    }
}
