use serde::{Deserialize, Serialize};

use super::{HashCalculator, Translations};

/// Mode of a recipe as the game distinguishes them.
pub const MODE_NORMAL: &str = "normal";
/// Mode of the expensive variant of a recipe.
pub const MODE_EXPENSIVE: &str = "expensive";

/// An ingredient of a recipe.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Ingredient {
    /// Either `item` or `fluid`
    #[serde(rename = "type")]
    pub item_type: String,
    /// Name of the item
    pub name: String,
    /// Amount consumed per craft
    pub amount: f64,
}

/// A product of a recipe.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Product {
    /// Either `item` or `fluid`
    #[serde(rename = "type")]
    pub item_type: String,
    /// Name of the item
    pub name: String,
    /// Minimal amount produced per craft
    pub amount_min: f64,
    /// Maximal amount produced per craft
    pub amount_max: f64,
    /// Probability of producing anything at all
    pub probability: f64,
}

impl Product {
    /// Expected yield of a single craft.
    #[must_use]
    pub fn amount(&self) -> f64 {
        (self.amount_min + self.amount_max) / 2.0 * self.probability
    }
}

/// Crafting data of a recipe, merged and reduced as one unit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecipeData {
    /// Consumed items
    pub ingredients: Vec<Ingredient>,
    /// Produced items
    pub products: Vec<Product>,
    /// Crafting time in seconds
    pub crafting_time: f64,
    /// Crafting category
    pub crafting_category: String,
}

impl RecipeData {
    /// Hash over the crafting data.
    #[must_use]
    pub fn data_hash(&self) -> String {
        let calculator = self.ingredients.iter().fold(
            HashCalculator::new("recipe-data").integer(self.ingredients.len() as u64),
            |calculator, ingredient| {
                calculator
                    .text(&ingredient.item_type)
                    .text(&ingredient.name)
                    .number(ingredient.amount)
            },
        );
        self.products
            .iter()
            .fold(calculator.integer(self.products.len() as u64), |calculator, product| {
                calculator
                    .text(&product.item_type)
                    .text(&product.name)
                    .number(product.amount_min)
                    .number(product.amount_max)
                    .number(product.probability)
            })
            .number(self.crafting_time)
            .text(&self.crafting_category)
            .finish()
    }

    /// Whether nothing is set, i.e. everything is inherited from the parent.
    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// A recipe.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Recipe {
    /// Internal name of the recipe
    pub name: String,
    /// Either `normal` or `expensive`
    pub mode: String,
    /// Crafting data
    #[serde(default)]
    pub data: RecipeData,
    /// Localised names
    #[serde(default)]
    pub labels: Translations,
    /// Localised descriptions
    #[serde(default)]
    pub descriptions: Translations,
    /// Hash of the icon, empty if the recipe has none or inherits it
    #[serde(default)]
    pub icon_hash: String,
}

impl Recipe {
    /// Create an empty recipe.
    pub fn new(name: impl Into<String>, mode: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode: mode.into(),
            ..Self::default()
        }
    }

    /// Business identifier: mode and name.
    #[must_use]
    pub fn identifier(&self) -> String {
        format!("{}.{}", self.mode, self.name)
    }

    /// Content hash over everything except the mode.
    ///
    /// Leaving out the mode makes an expensive variant identical to its normal
    /// variant hash to the same value, so only one of them gets stored.
    #[must_use]
    pub fn content_hash(&self) -> String {
        HashCalculator::new("recipe")
            .text(&self.name)
            .text(&self.data.data_hash())
            .translations(&self.labels)
            .translations(&self.descriptions)
            .text(&self.icon_hash)
            .finish()
    }

    /// Whether the recipe carries no information of its own.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.data.is_default()
            && self.labels.is_empty()
            && self.descriptions.is_empty()
            && self.icon_hash.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_amount() {
        let product = Product {
            item_type: "item".to_string(),
            name: "uranium-235".to_string(),
            amount_min: 1.0,
            amount_max: 1.0,
            probability: 0.007,
        };
        assert!((product.amount() - 0.007).abs() < f64::EPSILON);
    }

    #[test]
    fn test_mode_excluded_from_hash() {
        let normal = Recipe::new("gear", MODE_NORMAL);
        let expensive = Recipe::new("gear", MODE_EXPENSIVE);
        assert_eq!(normal.content_hash(), expensive.content_hash());
        assert_ne!(normal.identifier(), expensive.identifier());
    }
}
