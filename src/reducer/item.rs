use anyhow::Result;

use super::{EntityReducer, reduce_icon_hash, reduce_identified, reduce_translations};
use crate::entity::{Combination, Item};
use crate::registry::EntityRegistry;

/// Reduces items against the parent item of the same type and name.
///
/// The localisation flags belong to the texts: once no label or description
/// is left on the child, both flags are cleared and the parent's apply.
pub struct ItemReducer;

impl ItemReducer {
    fn reduce_entity(item: &mut Item, parent: &Item) -> bool {
        reduce_translations(&mut item.labels, &parent.labels);
        reduce_translations(&mut item.descriptions, &parent.descriptions);
        reduce_icon_hash(&mut item.icon_hash, &parent.icon_hash);
        if item.labels.is_empty() && item.descriptions.is_empty() {
            item.provides_recipe_localisation = false;
            item.provides_machine_localisation = false;
        }
        true
    }
}

impl EntityReducer for ItemReducer {
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
