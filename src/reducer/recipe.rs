use anyhow::Result;

use super::{EntityReducer, reduce_icon_hash, reduce_identified, reduce_translations};
use crate::entity::{Combination, Recipe, RecipeData};
use crate::registry::EntityRegistry;

/// Reduces recipes against the parent recipe of the same mode and name.
///
/// A recipe left without any own data after the reduction is removed from
/// the combination.
pub struct RecipeReducer;

impl RecipeReducer {
    fn reduce_entity(recipe: &mut Recipe, parent: &Recipe) -> bool {
        if recipe.data.data_hash() == parent.data.data_hash() {
            recipe.data = RecipeData::default();
        }
        reduce_translations(&mut recipe.labels, &parent.labels);
        reduce_translations(&mut recipe.descriptions, &parent.descriptions);
        reduce_icon_hash(&mut recipe.icon_hash, &parent.icon_hash);
        !recipe.is_blank()
    }
}

impl EntityReducer for RecipeReducer {
    fn reduce(
        &self,
        combination: &mut Combination,
        parent: &Combination,
        lookup: &EntityRegistry,
        output: &EntityRegistry,
    ) -> Result<()> {
        reduce_identified(combination, parent, lookup, output, Self::reduce_entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{ExportEntity, Ingredient, MODE_EXPENSIVE, MODE_NORMAL};
    use crate::registry::{MemoryRegistry, Registry};

    fn gear(mode: &str) -> Recipe {
        let mut recipe = Recipe::new("gear", mode);
        recipe.data.crafting_time = 0.5;
        recipe.data.ingredients.push(Ingredient {
            item_type: "item".to_string(),
            name: "iron-plate".to_string(),
            amount: 2.0,
        });
        recipe
    }

    #[test]
    fn test_blank_recipe_is_deleted() {
        let mut parent = gear(MODE_NORMAL);
        parent.labels.insert("en".to_string(), "Gear".to_string());
        let mut child = gear(MODE_NORMAL);
        child.labels.insert("en".to_string(), "Gear".to_string());
        child.labels.insert("de".to_string(), "Zahnrad".to_string());

        assert!(RecipeReducer::reduce_entity(&mut child, &parent));
        assert!(child.data.is_default());
        assert_eq!(child.labels.len(), 1);

        let mut unchanged = parent.clone();
        assert!(!RecipeReducer::reduce_entity(&mut unchanged, &parent));
    }

    #[test]
    fn test_modes_are_reduced_separately() {
        let registry = MemoryRegistry::<ExportEntity>::new();

        let mut parent = Combination::default();
        parent.recipe_hashes.push(registry.set(gear(MODE_NORMAL).into()).unwrap());

        let mut expensive = gear(MODE_EXPENSIVE);
        expensive.data.crafting_time = 1.0;
        let mut combination = Combination::default();
        combination.recipe_hashes.push(registry.set(expensive.into()).unwrap());

        RecipeReducer.reduce(&mut combination, &parent, &registry, &registry).unwrap();
        assert_eq!(combination.recipe_hashes.len(), 1);
    }
}
