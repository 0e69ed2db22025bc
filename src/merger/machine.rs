use anyhow::Result;

use super::{EntityMerger, merge_icon_hash, merge_identified, merge_translations};
use crate::entity::{Combination, Machine};
use crate::registry::EntityRegistry;

/// Merges machines by name. The crafting data is taken as a whole from the
/// source, unless the source inherits it.
pub struct MachineMerger;

impl MachineMerger {
    fn merge_entity(destination: &mut Machine, source: &Machine) {
        merge_translations(&mut destination.labels, &source.labels);
        merge_translations(&mut destination.descriptions, &source.descriptions);
        if !source.data.is_default() {
            destination.data = source.data.clone();
        }
        merge_icon_hash(&mut destination.icon_hash, &source.icon_hash);
    }
}

impl EntityMerger for MachineMerger {
    fn merge(
        &self,
        destination: &mut Combination,
        source: &Combination,
        registry: &EntityRegistry,
    ) -> Result<()> {
        merge_identified(destination, source, registry, Self::merge_entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_data_is_inherited() {
        let mut parent = Machine::new("assembler");
        parent.data.crafting_speed = 0.75;
        parent.data.crafting_categories = vec!["crafting".to_string()];

        let mut child = Machine::new("assembler");
        child.labels.insert("en".to_string(), "Assembler".to_string());

        let mut merged = parent.clone();
        MachineMerger::merge_entity(&mut merged, &child);
        assert_eq!(merged.data, parent.data);
        assert_eq!(merged.labels["en"], "Assembler");

        child.data.crafting_speed = 1.25;
        MachineMerger::merge_entity(&mut merged, &child);
        assert_eq!(merged.data.crafting_speed, 1.25);
        assert!(merged.data.crafting_categories.is_empty());
    }
}
