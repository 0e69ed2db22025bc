use std::collections::{BTreeSet, HashSet};

use super::graph::LoadOrderGraph;
use crate::constants::BASE_MOD_NAME;
use crate::entity::Mod;
use crate::registry::ModRegistry;

/// Resolves the dependency closures of mods against the mod registry.
///
/// Mods referenced as dependencies but missing from the registry are
/// skipped silently. Reporting them is the job of `list-missing`.
pub struct DependencyResolver<'a> {
    mods: &'a dyn ModRegistry,
}

impl<'a> DependencyResolver<'a> {
    /// Create a resolver reading from `mods`.
    pub fn new(mods: &'a dyn ModRegistry) -> Self {
        Self {
            mods,
        }
    }

    /// All mods required by `mod_names`, including themselves and the base mod.
    ///
    /// The result is in load order: every mod comes after its dependencies,
    /// otherwise mods are ordered by their global `order` and then by name.
    pub fn resolve_mandatory_dependencies(&self, mod_names: &[String]) -> Vec<String> {
        let mut seeds: Vec<String> = mod_names.to_vec();
        seeds.push(BASE_MOD_NAME.to_string());

        let closure = self.closure(&seeds, false);
        self.order(&closure, false)
    }

    /// All mods reachable from `mod_names` over mandatory and optional dependencies,
    /// without the ones listed in `exclude_mod_names`.
    ///
    /// `mod_names` usually is the mandatory closure of a mod, and the same list
    /// is passed as exclusion, so that only the additional optional mods remain.
    pub fn resolve_optional_dependencies(
        &self,
        mod_names: &[String],
        exclude_mod_names: &[String],
    ) -> Vec<String> {
        let closure = self.closure(mod_names, true);
        let excluded: HashSet<&str> = exclude_mod_names.iter().map(String::as_str).collect();
        let remaining: Vec<Mod> =
            closure.into_iter().filter(|mod_| !excluded.contains(mod_.name.as_str())).collect();
        self.order(&remaining, true)
    }

    /// Depth-first closure with visited tracking, so cycles terminate.
    fn closure(&self, seeds: &[String], include_optional: bool) -> Vec<Mod> {
        let mut visited: HashSet<String> = HashSet::new();
        let mut stack: Vec<String> = seeds.iter().rev().cloned().collect();
        let mut result = Vec::new();

        while let Some(name) = stack.pop() {
            if !visited.insert(name.clone()) {
                continue;
            }

            let Some(mod_) = self.mods.get(&name) else {
                tracing::debug!(target: "resolver", "Skipping unknown mod '{name}'");
                continue;
            };

            for dependency in mod_.dependencies.iter().rev() {
                if (dependency.is_mandatory || include_optional)
                    && !visited.contains(&dependency.required_mod_name)
                {
                    stack.push(dependency.required_mod_name.clone());
                }
            }
            result.push(mod_);
        }

        result
    }

    fn order(&self, mods: &[Mod], include_optional: bool) -> Vec<String> {
        let mut graph = LoadOrderGraph::new();
        for mod_ in mods {
            graph.add_mod(&mod_.name, (mod_.order, mod_.name.clone()));
        }
        for mod_ in mods {
            for dependency in &mod_.dependencies {
                if dependency.is_mandatory || include_optional {
                    graph.add_dependency(&mod_.name, &dependency.required_mod_name);
                }
            }
        }
        graph.sorted()
    }

    /// Names of the mods in `names`, sorted by load order then by name.
    pub fn sort_by_order(&self, names: &BTreeSet<String>) -> Vec<String> {
        let mut keyed: Vec<(u32, &String)> = names
            .iter()
            .map(|name| (self.mods.get(name).map_or(u32::MAX, |mod_| mod_.order), name))
            .collect();
        keyed.sort();
        keyed.into_iter().map(|(_, name)| name.clone()).collect()
    }
}
