use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet};

use crate::core::ExportError;
use crate::entity::Combination;
use crate::registry::{CombinationRegistry, ModRegistry, fetch_combination};
use crate::resolver::DependencyResolver;

/// Dependency state of the mod combinations are created for.
#[derive(Debug, Clone)]
struct CreatorState {
    main_mod_name: String,
    mandatory_mod_names: Vec<String>,
    optional_mod_names: Vec<String>,
}

/// Creates the combinations of a single mod.
///
/// [`CombinationCreator::setup_for_mod`] must be called before any other
/// operation, otherwise [`ExportError::CreatorNotSetUp`] is returned.
pub struct CombinationCreator<'a> {
    mods: &'a dyn ModRegistry,
    combinations: &'a CombinationRegistry,
    state: Option<CreatorState>,
}

impl<'a> CombinationCreator<'a> {
    /// Create a creator reading mods and persisted combinations from the registries.
    pub fn new(mods: &'a dyn ModRegistry, combinations: &'a CombinationRegistry) -> Self {
        Self {
            mods,
            combinations,
            state: None,
        }
    }

    /// Resolve the mandatory and optional mods of `mod_name`.
    pub fn setup_for_mod(&mut self, mod_name: &str) -> Result<()> {
        let main = self.mods.require(mod_name)?;
        let resolver = DependencyResolver::new(self.mods);

        let mandatory_mod_names = resolver.resolve_mandatory_dependencies(&[main.name.clone()]);
        let optional = resolver.resolve_optional_dependencies(&mandatory_mod_names, &mandatory_mod_names);
        let optional_mod_names = resolver.sort_by_order(&optional.into_iter().collect());

        tracing::debug!(
            target: "export",
            "Mod {}: mandatory [{}], optional [{}]",
            main.name,
            mandatory_mod_names.join(", "),
            optional_mod_names.join(", ")
        );

        self.state = Some(CreatorState {
            main_mod_name: main.name,
            mandatory_mod_names,
            optional_mod_names,
        });
        Ok(())
    }

    fn state(&self) -> Result<&CreatorState, ExportError> {
        self.state.as_ref().ok_or(ExportError::CreatorNotSetUp)
    }

    /// The number of optional mods, which is the highest export step.
    pub fn number_of_optional_mods(&self) -> Result<usize> {
        Ok(self.state()?.optional_mod_names.len())
    }

    /// The optional mods of the mod, in load order.
    pub fn optional_mod_names(&self) -> Result<&[String]> {
        Ok(&self.state()?.optional_mod_names)
    }

    /// The combination without any optional mods.
    pub fn create_base_combination(&self) -> Result<Combination> {
        self.create_combination(&[])
    }

    /// Create the combination loading the given optional mods.
    ///
    /// The optional mods are kept in load order with ties broken by name, the
    /// loaded mods are the mandatory closure of all of them in load order.
    pub fn create_combination(&self, optional_mod_names: &[String]) -> Result<Combination> {
        let state = self.state()?;
        let resolver = DependencyResolver::new(self.mods);

        let optional: BTreeSet<String> = optional_mod_names.iter().cloned().collect();
        let optional = resolver.sort_by_order(&optional);

        let seeds: Vec<String> =
            state.mandatory_mod_names.iter().chain(optional.iter()).cloned().collect();
        let loaded = resolver.resolve_mandatory_dependencies(&seeds);
        let loaded = resolver.sort_by_order(&loaded.into_iter().collect());

        let mut combination = Combination::new(state.main_mod_name.clone(), optional);
        combination.loaded_mod_names = loaded;
        Ok(combination)
    }

    /// All combinations of export step `n`, keyed by name.
    ///
    /// Every persisted combination of the mod with `n - 1` optional mods is
    /// extended by each optional mod it does not load yet. Different parents
    /// producing the same child are deduplicated by name.
    pub fn create_combinations_with_number_of_optional_mods(
        &self,
        n: usize,
    ) -> Result<BTreeMap<String, Combination>> {
        let state = self.state()?;
        let mut result = BTreeMap::new();

        if n == 0 {
            let base = self.create_base_combination()?;
            result.insert(base.name.clone(), base);
            return Ok(result);
        }

        let main = self.mods.require(&state.main_mod_name)?;
        for id in &main.combination_hashes {
            let previous = fetch_combination(self.combinations, id)?;
            if previous.loaded_optional_mod_names.len() != n - 1 {
                continue;
            }

            for optional in &state.optional_mod_names {
                if previous.loaded_optional_mod_names.contains(optional) {
                    continue;
                }

                let mut names = previous.loaded_optional_mod_names.clone();
                names.push(optional.clone());
                let name = Combination::build_name(&state.main_mod_name, &names);
                if !result.contains_key(&name) {
                    result.insert(name, self.create_combination(&names)?);
                }
            }
        }

        tracing::debug!(
            target: "export",
            "Created {} combinations with {} optional mods for {}",
            result.len(),
            n,
            state.main_mod_name
        );
        Ok(result)
    }
}
