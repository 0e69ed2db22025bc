use anyhow::Result;

use super::{EntityMerger, merge_icon_hash, merge_identified, merge_translations};
use crate::entity::{Combination, Recipe};
use crate::registry::EntityRegistry;

/// Merges recipes by mode and name.
pub struct RecipeMerger;

impl RecipeMerger {
    fn merge_entity(destination: &mut Recipe, source: &Recipe) {
        if !source.data.is_default() {
            destination.data = source.data.clone();
        }
        merge_translations(&mut destination.labels, &source.labels);
        merge_translations(&mut destination.descriptions, &source.descriptions);
        merge_icon_hash(&mut destination.icon_hash, &source.icon_hash);
    }
}

impl EntityMerger for RecipeMerger {
    fn merge(
        &self,
        destination: &mut Combination,
        source: &Combination,
        registry: &EntityRegistry,
    ) -> Result<()> {
        merge_identified(destination, source, registry, Self::merge_entity)
    }
}
