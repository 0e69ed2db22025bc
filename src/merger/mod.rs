//! Merging of a parent combination into a destination combination.
//!
//! Merging reconstructs the full, self-contained data of a combination by
//! folding in its ancestors one after another. Later sources win: a field
//! which is set on the source overwrites the value of the destination.
//!
//! Merged entities only exist to be compared against during reduction. They
//! are written to whatever registry the caller passes, which is an
//! [`OverlayRegistry`](crate::registry::OverlayRegistry) keeping them in
//! memory.

mod icon;
mod item;
mod machine;
mod recipe;

pub use icon::IconMerger;
pub use item::ItemMerger;
pub use machine::MachineMerger;
pub use recipe::RecipeMerger;

use anyhow::Result;
use std::collections::HashMap;

use crate::entity::{Combination, IdentifiedEntity, Translations};
use crate::registry::{EntityRegistry, fetch_entity};

/// Merges the entities of one kind.
pub trait EntityMerger: Send + Sync {
    /// Merge the entities of `source` into `destination`.
    fn merge(
        &self,
        destination: &mut Combination,
        source: &Combination,
        registry: &EntityRegistry,
    ) -> Result<()>;
}

/// Merge of identified entities, matched by their business identifier.
///
/// Entities of `source` unknown to `destination` are added as they are.
/// Entities known to both are merged with `merge_entity` and stored under
/// their new hash, replacing the old hash on `destination`.
pub(crate) fn merge_identified<T, F>(
    destination: &mut Combination,
    source: &Combination,
    registry: &EntityRegistry,
    merge_entity: F,
) -> Result<()>
where
    T: IdentifiedEntity,
    F: Fn(&mut T, &T),
{
    let mut known: HashMap<String, (usize, T)> = HashMap::new();
    for (index, hash) in destination.hashes(T::KIND).iter().enumerate() {
        let entity = T::from_entity(fetch_entity(registry, T::KIND, hash)?)?;
        known.insert(entity.identifier(), (index, entity));
    }

    for hash in source.hashes(T::KIND) {
        let entity = T::from_entity(fetch_entity(registry, T::KIND, hash)?)?;
        let identifier = entity.identifier();

        match known.get_mut(&identifier) {
            Some((index, existing)) => {
                merge_entity(existing, &entity);
                let merged_hash = registry.set(existing.clone().into())?;
                destination.hashes_mut(T::KIND)[*index] = merged_hash;
            }
            None => {
                let hashes = destination.hashes_mut(T::KIND);
                hashes.push(hash.clone());
                known.insert(identifier, (hashes.len() - 1, entity));
            }
        }
    }

    Ok(())
}

/// Copy every non-empty translation of `source` over `destination`.
pub(crate) fn merge_translations(destination: &mut Translations, source: &Translations) {
    for (locale, text) in source {
        if !text.is_empty() {
            destination.insert(locale.clone(), text.clone());
        }
    }
}

/// Adopt the icon of the source if it has one.
pub(crate) fn merge_icon_hash(destination: &mut String, source: &str) {
    if !source.is_empty() {
        *destination = source.to_string();
    }
}

/// Runs the mergers of all entity kinds.
pub struct MergerManager {
    mergers: Vec<Box<dyn EntityMerger>>,
}

impl Default for MergerManager {
    fn default() -> Self {
        Self {
            mergers: vec![
                Box::new(IconMerger),
                Box::new(ItemMerger),
                Box::new(MachineMerger),
                Box::new(RecipeMerger),
            ],
        }
    }
}

impl MergerManager {
    /// Create the manager with the mergers of all kinds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `source` into `destination`.
    pub fn merge(
        &self,
        destination: &mut Combination,
        source: &Combination,
        registry: &EntityRegistry,
    ) -> Result<()> {
        for merger in &self.mergers {
            merger.merge(destination, source, registry)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{ExportEntity, Item};
    use crate::registry::{MemoryRegistry, Registry};

    #[test]
    fn test_merge_translations_skips_empty_values() {
        let mut destination = Translations::new();
        destination.insert("en".to_string(), "Old".to_string());
        destination.insert("de".to_string(), "Alt".to_string());

        let mut source = Translations::new();
        source.insert("en".to_string(), "New".to_string());
        source.insert("de".to_string(), String::new());
        source.insert("fr".to_string(), "Neuf".to_string());

        merge_translations(&mut destination, &source);
        assert_eq!(destination["en"], "New");
        assert_eq!(destination["de"], "Alt");
        assert_eq!(destination["fr"], "Neuf");
    }

    #[test]
    fn test_manager_merges_all_kinds() {
        let registry = MemoryRegistry::<ExportEntity>::new();
        let mut source = Combination::new("foo", Vec::new());
        source.item_hashes.push(registry.set(Item::new("item", "coal").into()).unwrap());
        source.icon_hashes.push(registry.set(crate::entity::Icon::default().into()).unwrap());

        let mut destination = Combination::default();
        MergerManager::new().merge(&mut destination, &source, &registry).unwrap();

        assert_eq!(destination.item_hashes, source.item_hashes);
        assert_eq!(destination.icon_hashes, source.icon_hashes);
    }

    #[test]
    fn test_kind_mismatch_is_fatal() {
        let registry = MemoryRegistry::<ExportEntity>::new();
        let mut source = Combination::new("foo", Vec::new());
        source.item_hashes.push(registry.set(crate::entity::Icon::default().into()).unwrap());

        let mut destination = Combination::default();
        let error = MergerManager::new().merge(&mut destination, &source, &registry).unwrap_err();
        assert!(error.downcast_ref::<crate::core::ExportError>().is_some_and(|e| e.is_fatal()));
    }
}
