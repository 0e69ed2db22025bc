use anyhow::Result;
use serde_json::{Value, json};
use std::collections::HashSet;

use super::{ParseContext, Parser};
use crate::dump::{Dump, DumpRecipe};
use crate::entity::{
    Combination, Ingredient, MODE_EXPENSIVE, MODE_NORMAL, Product, Recipe, RecipeData, round3,
};

/// Creates the recipes of both modes.
///
/// Recipes are deduplicated by content: an expensive variant identical to
/// its normal variant is dropped.
pub struct RecipeParser;

impl RecipeParser {
    fn map_recipe(dump_recipe: &DumpRecipe, mode: &str, context: &mut ParseContext) -> Recipe {
        let ingredients: Vec<Ingredient> = dump_recipe
            .ingredients
            .iter()
            .filter(|ingredient| ingredient.amount > 0.0)
            .map(|ingredient| Ingredient {
                item_type: ingredient.item_type.clone(),
                name: ingredient.name.clone(),
                amount: round3(ingredient.amount),
            })
            .collect();

        let products: Vec<Product> = dump_recipe
            .products
            .iter()
            .map(|product| {
                let (amount_min, amount_max) = product.amount_range();
                Product {
                    item_type: product.item_type.clone(),
                    name: product.name.clone(),
                    amount_min: round3(amount_min),
                    amount_max: round3(amount_max),
                    probability: round3(product.probability),
                }
            })
            .filter(|product| product.amount() > 0.0)
            .collect();

        let mut recipe = Recipe::new(dump_recipe.name.clone(), mode);
        let fallback_label: Option<Value> =
            products.first().map(|product| json!([format!("item-name.{}", product.name)]));
        context.catalog.add_translations_to_entity(
            &mut recipe.labels,
            "recipe",
            &dump_recipe.localised_name,
            fallback_label.as_ref(),
        );
        context.catalog.add_translations_to_entity(
            &mut recipe.descriptions,
            "recipe",
            &dump_recipe.localised_description,
            None,
        );

        recipe.icon_hash = context.icon_hash("recipe", &dump_recipe.name);
        if recipe.icon_hash.is_empty()
            && let Some(product) = products.first()
        {
            recipe.icon_hash = context.icon_hash(&product.item_type, &product.name);
        }

        recipe.data = RecipeData {
            ingredients,
            products,
            crafting_time: round3(dump_recipe.energy),
            crafting_category: dump_recipe.category.clone(),
        };
        recipe
    }
}

impl Parser for RecipeParser {
    fn parse(&self, dump: &Dump, _combination: &mut Combination, context: &mut ParseContext) -> Result<()> {
        let mut seen: HashSet<String> =
            context.recipes.iter().map(Recipe::content_hash).collect();

        let variants = dump
            .control_stage
            .normal_recipes
            .iter()
            .map(|recipe| (recipe, MODE_NORMAL))
            .chain(dump.control_stage.expensive_recipes.iter().map(|recipe| (recipe, MODE_EXPENSIVE)));

        for (dump_recipe, mode) in variants {
            let recipe = Self::map_recipe(dump_recipe, mode, context);
            if seen.insert(recipe.content_hash()) {
                context.recipes.push(recipe);
            } else {
                tracing::trace!(target: "parser", "Dropping duplicate {} recipe {}", mode, recipe.name);
            }
        }
        Ok(())
    }
}
