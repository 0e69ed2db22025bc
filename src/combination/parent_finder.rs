use anyhow::Result;
use std::collections::{BTreeMap, HashSet};

use crate::entity::Combination;
use crate::registry::{CombinationRegistry, ModRegistry, fetch_combination};

/// Finds the already exported ancestors of a combination.
pub struct ParentCombinationFinder<'a> {
    mods: &'a dyn ModRegistry,
    combinations: &'a CombinationRegistry,
}

impl<'a> ParentCombinationFinder<'a> {
    /// Create a finder over the persisted mods and combinations.
    pub fn new(mods: &'a dyn ModRegistry, combinations: &'a CombinationRegistry) -> Self {
        Self {
            mods,
            combinations,
        }
    }

    /// All persisted combinations whose loaded mods are a strict subset of
    /// the loaded mods of `combination`.
    ///
    /// Candidates are collected from the combination history of every mod the
    /// combination loads. They are sorted by the number of loaded mods first,
    /// then by their order vector (the sorted load orders of their mods), so
    /// that merging them in sequence always applies an ancestor before any of
    /// its own descendants.
    pub fn find(&self, combination: &Combination) -> Result<Vec<Combination>> {
        let mut candidates: BTreeMap<String, Combination> = BTreeMap::new();

        for mod_name in &combination.loaded_mod_names {
            let Some(mod_) = self.mods.get(mod_name) else {
                continue;
            };

            for id in &mod_.combination_hashes {
                if id == &combination.id || candidates.contains_key(id) {
                    continue;
                }
                let candidate = fetch_combination(self.combinations, id)?;
                if Self::is_valid_parent_combination(combination, &candidate) {
                    candidates.insert(candidate.id.clone(), candidate);
                }
            }
        }

        let mut parents: Vec<(usize, Vec<u32>, Combination)> = candidates
            .into_values()
            .map(|candidate| {
                let order_vector = self.order_vector(&candidate);
                (candidate.loaded_mod_names.len(), order_vector, candidate)
            })
            .collect();
        parents.sort_by(|a, b| (a.0, &a.1, &a.2.name).cmp(&(b.0, &b.1, &b.2.name)));

        tracing::trace!(
            target: "reducer",
            "Parents of {}: [{}]",
            combination.name,
            parents.iter().map(|(_, _, parent)| parent.name.as_str()).collect::<Vec<_>>().join(", ")
        );
        Ok(parents.into_iter().map(|(_, _, parent)| parent).collect())
    }

    /// Whether the loaded mods of `candidate` are a strict subset of those of `combination`.
    #[must_use]
    pub fn is_valid_parent_combination(combination: &Combination, candidate: &Combination) -> bool {
        let loaded: HashSet<&String> = combination.loaded_mod_names.iter().collect();
        let candidate_loaded: HashSet<&String> = candidate.loaded_mod_names.iter().collect();

        !candidate_loaded.is_empty()
            && candidate_loaded.len() < loaded.len()
            && candidate_loaded.is_subset(&loaded)
    }

    fn order_vector(&self, combination: &Combination) -> Vec<u32> {
        let mut orders: Vec<u32> = combination
            .loaded_mod_names
            .iter()
            .map(|name| self.mods.get(name).map_or(u32::MAX, |mod_| mod_.order))
            .collect();
        orders.sort_unstable();
        orders
    }
}
