//! The raw data dumped by one game run.
//!
//! The dump mod prints two JSON documents: the data stage carries the icon
//! prototypes, the control stage the items, fluids, machines and recipes as
//! seen at runtime. The types in this module mirror those documents and are
//! never persisted.

mod extractor;

pub use extractor::DumpExtractor;

use serde::Deserialize;
use serde_json::Value;

/// Everything extracted from one game run.
#[derive(Debug, Clone, Default)]
pub struct Dump {
    /// Loaded mods in the order the game loaded them
    pub mod_names: Vec<String>,
    /// Data emitted during the data stage
    pub data_stage: DataStage,
    /// Data emitted during the control stage
    pub control_stage: ControlStage,
}

/// Payload of the data stage.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DataStage {
    /// Icons of all prototypes having one
    pub icons: Vec<DumpIcon>,
}

/// The icon definition of a single prototype.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DumpIcon {
    /// Prototype type, e.g. `item`, `fluid`, `recipe`, `assembling-machine` or `mod`
    #[serde(rename = "type")]
    pub prototype_type: String,
    /// Prototype name
    pub name: String,
    /// Layers from bottom to top
    pub layers: Vec<DumpLayer>,
}

/// One layer of a dumped icon.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DumpLayer {
    /// Path of the image, e.g. `__base__/graphics/icons/coal.png`
    pub file: String,
    /// Size of the image in pixels
    pub size: u32,
    /// Offset of the layer
    pub shift: [f64; 2],
    /// Scale of the layer
    pub scale: f64,
    /// Tint, channels either in 0..1 or 0..255
    pub tint: Option<DumpColor>,
}

impl Default for DumpLayer {
    fn default() -> Self {
        Self {
            file: String::new(),
            size: 32,
            shift: [0.0, 0.0],
            scale: 1.0,
            tint: None,
        }
    }
}

/// A color as written by the game.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct DumpColor {
    /// Red channel
    pub r: f64,
    /// Green channel
    pub g: f64,
    /// Blue channel
    pub b: f64,
    /// Alpha channel, opaque if missing
    pub a: Option<f64>,
}

/// Payload of the control stage.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ControlStage {
    /// All item prototypes
    pub items: Vec<DumpItem>,
    /// All fluid prototypes
    pub fluids: Vec<DumpItem>,
    /// All crafting machines
    pub machines: Vec<DumpMachine>,
    /// Recipes in normal mode
    pub normal_recipes: Vec<DumpRecipe>,
    /// Recipes in expensive mode
    pub expensive_recipes: Vec<DumpRecipe>,
}

/// An item or fluid prototype.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DumpItem {
    /// Prototype name
    pub name: String,
    /// Localised name
    pub localised_name: Value,
    /// Localised description
    pub localised_description: Value,
}

/// A crafting machine prototype.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DumpMachine {
    /// Prototype name
    pub name: String,
    /// Localised name
    pub localised_name: Value,
    /// Localised description
    pub localised_description: Value,
    /// Recipe categories the machine can craft
    pub crafting_categories: Vec<String>,
    /// Crafting speed factor
    pub crafting_speed: f64,
    /// Number of item input slots
    pub item_slots: u32,
    /// Number of fluid input boxes
    pub fluid_input_slots: u32,
    /// Number of fluid output boxes
    pub fluid_output_slots: u32,
    /// Number of module slots
    pub module_slots: u32,
    /// Energy usage in watts
    pub energy_usage: f64,
}

/// A recipe prototype in one mode.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DumpRecipe {
    /// Prototype name
    pub name: String,
    /// Localised name
    pub localised_name: Value,
    /// Localised description
    pub localised_description: Value,
    /// Recipe category
    pub category: String,
    /// Crafting time in seconds
    pub energy: f64,
    /// Ingredients
    pub ingredients: Vec<DumpIngredient>,
    /// Products
    pub products: Vec<DumpProduct>,
}

/// An ingredient of a dumped recipe.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DumpIngredient {
    /// `item` or `fluid`
    #[serde(rename = "type")]
    pub item_type: String,
    /// Name of the item
    pub name: String,
    /// Required amount
    pub amount: f64,
}

/// A product of a dumped recipe.
///
/// The game either specifies a fixed `amount` or a range of
/// `amount_min`..`amount_max`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DumpProduct {
    /// `item` or `fluid`
    #[serde(rename = "type")]
    pub item_type: String,
    /// Name of the item
    pub name: String,
    /// Fixed amount
    pub amount: Option<f64>,
    /// Lower bound of a ranged amount
    pub amount_min: Option<f64>,
    /// Upper bound of a ranged amount
    pub amount_max: Option<f64>,
    /// Chance of the product to be produced
    pub probability: f64,
}

impl Default for DumpProduct {
    fn default() -> Self {
        Self {
            item_type: String::new(),
            name: String::new(),
            amount: None,
            amount_min: None,
            amount_max: None,
            probability: 1.0,
        }
    }
}

impl DumpProduct {
    /// The amount range, a fixed amount being both bounds.
    #[must_use]
    pub fn amount_range(&self) -> (f64, f64) {
        match self.amount {
            Some(amount) => (amount, amount),
            None => {
                let min = self.amount_min.unwrap_or(0.0);
                (min, self.amount_max.unwrap_or(min))
            }
        }
    }
}
