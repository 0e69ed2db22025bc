//! Reduction of a combination against its parents.
//!
//! A freshly parsed combination holds the complete data of every loaded mod.
//! Most of it is already provided by the parent combinations, so before a
//! combination gets persisted everything its merged parent already supplies
//! is stripped:
//!
//! - entities identical to the parent entity with the same identifier are
//!   dropped from the hash list
//! - entities differing from their parent counterpart keep only the fields
//!   which actually differ
//! - entities unknown to the parent are kept as they are
//!
//! Merging the reduced combination onto the same merged parent restores the
//! original data.

mod icon;
mod item;
mod machine;
mod recipe;

pub use icon::IconReducer;
pub use item::ItemReducer;
pub use machine::MachineReducer;
pub use recipe::RecipeReducer;

use anyhow::Result;
use std::collections::HashMap;

use crate::combination::ParentCombinationFinder;
use crate::entity::{Combination, ExportEntity, IdentifiedEntity, Translations};
use crate::merger::MergerManager;
use crate::registry::{
    CombinationRegistry, EntityRegistry, ModRegistry, OverlayRegistry, fetch_entity,
};

/// Reduces the entities of one kind.
pub trait EntityReducer: Send + Sync {
    /// Strip from `combination` what `parent` already provides.
    ///
    /// Entities of both combinations are read from `lookup`. Every entity
    /// remaining on `combination` is written to `output`.
    fn reduce(
        &self,
        combination: &mut Combination,
        parent: &Combination,
        lookup: &EntityRegistry,
        output: &EntityRegistry,
    ) -> Result<()>;
}

/// Reduction of identified entities, matched by their business identifier.
///
/// `reduce_entity` blanks the fields of the child equal to the parent and
/// returns whether anything worth storing is left.
pub(crate) fn reduce_identified<T, F>(
    combination: &mut Combination,
    parent: &Combination,
    lookup: &EntityRegistry,
    output: &EntityRegistry,
    reduce_entity: F,
) -> Result<()>
where
    T: IdentifiedEntity,
    F: Fn(&mut T, &T) -> bool,
{
    let mut parent_entities: HashMap<String, (&str, T)> = HashMap::new();
    for hash in parent.hashes(T::KIND) {
        let entity = T::from_entity(fetch_entity(lookup, T::KIND, hash)?)?;
        parent_entities.insert(entity.identifier(), (hash.as_str(), entity));
    }

    let mut reduced = Vec::with_capacity(combination.hashes(T::KIND).len());
    for hash in combination.hashes(T::KIND) {
        let mut entity = T::from_entity(fetch_entity(lookup, T::KIND, hash)?)?;

        match parent_entities.get(&entity.identifier()) {
            None => {
                output.set(entity.into())?;
                reduced.push(hash.clone());
            }
            Some((parent_hash, _)) if *parent_hash == hash.as_str() => {
                tracing::trace!(target: "reducer", "{} {} is inherited", T::KIND, entity.identifier());
            }
            Some((_, parent_entity)) => {
                if reduce_entity(&mut entity, parent_entity) {
                    reduced.push(output.set(entity.into())?);
                } else {
                    tracing::trace!(target: "reducer", "{} {} has nothing left", T::KIND, entity.identifier());
                }
            }
        }
    }

    *combination.hashes_mut(T::KIND) = reduced;
    Ok(())
}

/// Remove every translation equal to the one of the parent.
pub(crate) fn reduce_translations(translations: &mut Translations, parent: &Translations) {
    translations.retain(|locale, text| parent.get(locale) != Some(text));
}

/// Clear the icon hash if the parent uses the same icon.
pub(crate) fn reduce_icon_hash(icon_hash: &mut String, parent: &str) {
    if icon_hash == parent {
        icon_hash.clear();
    }
}

/// Reduces combinations against their merged parents.
pub struct ReducerManager {
    reducers: Vec<Box<dyn EntityReducer>>,
    merger: MergerManager,
}

impl Default for ReducerManager {
    fn default() -> Self {
        Self {
            reducers: vec![
                Box::new(IconReducer),
                Box::new(ItemReducer),
                Box::new(MachineReducer),
                Box::new(RecipeReducer),
            ],
            merger: MergerManager::new(),
        }
    }
}

impl ReducerManager {
    /// Create the manager with the reducers of all kinds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge the parents of a combination into one combination.
    ///
    /// The merged entities are written to `registry` only, which is expected
    /// to be an in-memory overlay.
    pub fn merge_parents(
        &self,
        parents: &[Combination],
        registry: &EntityRegistry,
    ) -> Result<Combination> {
        let mut merged = Combination::default();
        for parent in parents {
            self.merger.merge(&mut merged, parent, registry)?;
        }
        Ok(merged)
    }

    /// Reduce `combination` against an already merged parent.
    pub fn reduce_against(
        &self,
        combination: &mut Combination,
        parent: &Combination,
        lookup: &EntityRegistry,
        output: &EntityRegistry,
    ) -> Result<()> {
        for reducer in &self.reducers {
            reducer.reduce(combination, parent, lookup, output)?;
        }
        Ok(())
    }

    /// Reduce a freshly parsed combination and persist the remaining entities.
    ///
    /// The entities of `combination` are read from `scratch`, those of its
    /// parents from `store`. Only the reduced entities end up in `store`.
    pub fn reduce(
        &self,
        combination: &mut Combination,
        mods: &dyn ModRegistry,
        combinations: &CombinationRegistry,
        scratch: &EntityRegistry,
        store: &EntityRegistry,
    ) -> Result<()> {
        let parents = ParentCombinationFinder::new(mods, combinations).find(combination)?;
        tracing::debug!(
            target: "reducer",
            "Reducing {} against {} parent combination(s)",
            combination.name,
            parents.len()
        );

        let merged_entities: OverlayRegistry<'_, ExportEntity> = OverlayRegistry::new(store);
        let parent = self.merge_parents(&parents, &merged_entities)?;
        let lookup = OverlayRegistry::stacked(scratch, &merged_entities);

        self.reduce_against(combination, &parent, &lookup, store)
    }
}
