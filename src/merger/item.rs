use anyhow::Result;

use super::{EntityMerger, merge_icon_hash, merge_identified, merge_translations};
use crate::entity::{Combination, Item};
use crate::registry::EntityRegistry;

/// Merges items by type and name.
///
/// The localisation flags describe whether the texts of an item are shared
/// with a machine or recipe. They follow the source only if the source
/// brings texts of its own, otherwise the flags of the destination still
/// apply.
pub struct ItemMerger;

impl ItemMerger {
    fn merge_entity(destination: &mut Item, source: &Item) {
        merge_translations(&mut destination.labels, &source.labels);
        merge_translations(&mut destination.descriptions, &source.descriptions);
        if !source.labels.is_empty() || !source.descriptions.is_empty() {
            destination.provides_recipe_localisation = source.provides_recipe_localisation;
            destination.provides_machine_localisation = source.provides_machine_localisation;
        }
        merge_icon_hash(&mut destination.icon_hash, &source.icon_hash);
    }
}

impl EntityMerger for ItemMerger {
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
    use crate::entity::{EntityKind, ExportEntity};
    use crate::registry::{MemoryRegistry, Registry, fetch_entity};

    #[test]
    fn test_source_values_win() {
        let registry = MemoryRegistry::<ExportEntity>::new();

        let mut parent = Item::new("item", "coal");
        parent.labels.insert("en".to_string(), "Coal".to_string());
        parent.labels.insert("de".to_string(), "Kohle".to_string());
        parent.icon_hash = "parent-icon".to_string();
        parent.provides_recipe_localisation = true;

        let mut child = Item::new("item", "coal");
        child.labels.insert("en".to_string(), "Black coal".to_string());

        let mut destination = Combination::default();
        destination.item_hashes.push(registry.set(parent.into()).unwrap());
        let mut source = Combination::default();
        source.item_hashes.push(registry.set(child.into()).unwrap());

        ItemMerger.merge(&mut destination, &source, &registry).unwrap();

        assert_eq!(destination.item_hashes.len(), 1);
        let merged = fetch_entity(&registry, EntityKind::Item, &destination.item_hashes[0])
            .unwrap()
            .into_item()
            .unwrap();
        assert_eq!(merged.labels["en"], "Black coal");
        assert_eq!(merged.labels["de"], "Kohle");
        assert_eq!(merged.icon_hash, "parent-icon");
        assert!(!merged.provides_recipe_localisation);
    }

    #[test]
    fn test_flags_without_texts_are_kept() {
        let registry = MemoryRegistry::<ExportEntity>::new();

        let mut parent = Item::new("item", "coal");
        parent.labels.insert("en".to_string(), "Coal".to_string());
        parent.provides_machine_localisation = true;

        let mut child = Item::new("item", "coal");
        child.icon_hash = "child-icon".to_string();

        let mut destination = Combination::default();
        destination.item_hashes.push(registry.set(parent.into()).unwrap());
        let mut source = Combination::default();
        source.item_hashes.push(registry.set(child.into()).unwrap());

        ItemMerger.merge(&mut destination, &source, &registry).unwrap();

        let merged = fetch_entity(&registry, EntityKind::Item, &destination.item_hashes[0])
            .unwrap()
            .into_item()
            .unwrap();
        assert_eq!(merged.labels["en"], "Coal");
        assert_eq!(merged.icon_hash, "child-icon");
        assert!(merged.provides_machine_localisation);
    }

    #[test]
    fn test_new_items_are_appended() {
        let registry = MemoryRegistry::<ExportEntity>::new();
        let mut destination = Combination::default();
        destination.item_hashes.push(registry.set(Item::new("item", "coal").into()).unwrap());
        let mut source = Combination::default();
        let fluid = registry.set(Item::new("fluid", "coal").into()).unwrap();
        source.item_hashes.push(fluid.clone());

        ItemMerger.merge(&mut destination, &source, &registry).unwrap();
        assert_eq!(destination.item_hashes.len(), 2);
        assert_eq!(destination.item_hashes[1], fluid);
    }
}
