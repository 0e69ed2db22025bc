use anyhow::Result;
use serde_json::json;

use super::{ParseContext, Parser};
use crate::dump::{Dump, DumpItem};
use crate::entity::{Combination, Item};

/// Creates the items and fluids.
///
/// The validation pass detects machines and recipes sharing the name and
/// the exact texts of an item. Those texts are kept on the item only, which
/// flags that it provides the localisation of the other entity.
pub struct ItemParser;

impl ItemParser {
    fn map_item(item_type: &str, dump_item: &DumpItem, context: &mut ParseContext) -> Item {
        let mut item = Item::new(item_type, dump_item.name.clone());
        context.catalog.add_translations_to_entity(
            &mut item.labels,
            item_type,
            &dump_item.localised_name,
            Some(&json!([format!("entity-name.{}", dump_item.name)])),
        );
        context.catalog.add_translations_to_entity(
            &mut item.descriptions,
            item_type,
            &dump_item.localised_description,
            Some(&json!([format!("entity-description.{}", dump_item.name)])),
        );
        item.icon_hash = context.icon_hash(item_type, &dump_item.name);
        item
    }
}

impl Parser for ItemParser {
    fn parse(&self, dump: &Dump, _combination: &mut Combination, context: &mut ParseContext) -> Result<()> {
        for dump_item in &dump.control_stage.items {
            let item = Self::map_item("item", dump_item, context);
            context.items.push(item);
        }
        for dump_fluid in &dump.control_stage.fluids {
            let fluid = Self::map_item("fluid", dump_fluid, context);
            context.items.push(fluid);
        }
        Ok(())
    }

    fn validate(&self, _combination: &mut Combination, context: &mut ParseContext) -> Result<()> {
        let ParseContext {
            items,
            machines,
            recipes,
            ..
        } = context;

        for item in items.iter_mut().filter(|item| !item.labels.is_empty()) {
            let name = item.name.clone();

            for machine in machines.iter_mut().filter(|machine| machine.name == name) {
                if machine.labels == item.labels && machine.descriptions == item.descriptions {
                    item.provides_machine_localisation = true;
                    machine.labels.clear();
                    machine.descriptions.clear();
                }
            }

            for recipe in recipes.iter_mut().filter(|recipe| recipe.name == name) {
                if recipe.labels == item.labels && recipe.descriptions == item.descriptions {
                    item.provides_recipe_localisation = true;
                    recipe.labels.clear();
                    recipe.descriptions.clear();
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Machine, Recipe};
    use crate::parser::test_dump;
    use crate::translator::LocaleCatalog;

    fn context() -> ParseContext {
        let mut catalog = LocaleCatalog::default();
        catalog.add("en", "item-name.coal", "Coal");
        catalog.add("en", "entity-name.water", "Water");
        ParseContext {
            catalog,
            ..ParseContext::default()
        }
    }

    #[test]
    fn test_items_and_fluids_with_fallback_labels() {
        let dump = test_dump::dump();
        let mut context = context();
        ItemParser.parse(&dump, &mut Combination::default(), &mut context).unwrap();

        assert_eq!(context.items.len(), 3);
        let coal = context.items.iter().find(|item| item.name == "coal").unwrap();
        assert_eq!(coal.item_type, "item");
        assert_eq!(coal.labels["en"], "Coal");

        // fluid-name.water is unknown, the entity name serves as fallback
        let water = context.items.iter().find(|item| item.name == "water").unwrap();
        assert_eq!(water.item_type, "fluid");
        assert_eq!(water.labels["en"], "Water");
    }

    #[test]
    fn test_validate_moves_shared_localisation_to_item() {
        let mut context = ParseContext::default();

        let mut item = Item::new("item", "furnace");
        item.labels.insert("en".to_string(), "Furnace".to_string());
        context.items.push(item);

        let mut machine = Machine::new("furnace");
        machine.labels.insert("en".to_string(), "Furnace".to_string());
        context.machines.push(machine);

        let mut recipe = Recipe::new("furnace", "normal");
        recipe.labels.insert("en".to_string(), "Build a furnace".to_string());
        context.recipes.push(recipe);

        ItemParser.validate(&mut Combination::default(), &mut context).unwrap();

        assert!(context.items[0].provides_machine_localisation);
        assert!(!context.items[0].provides_recipe_localisation);
        assert!(context.machines[0].labels.is_empty());
        assert_eq!(context.recipes[0].labels["en"], "Build a furnace");
    }
}
