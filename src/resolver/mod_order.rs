use super::graph::LoadOrderGraph;
use crate::constants::BASE_MOD_NAME;
use crate::registry::ModRegistry;

/// Assigns the global load order to all mods of a registry.
///
/// The game loads a mod after all of its dependencies, optional ones
/// included, and breaks ties by the case-insensitive name. The base mod
/// always comes first with order 1.
pub struct ModOrderCalculator<'a> {
    mods: &'a dyn ModRegistry,
}

impl<'a> ModOrderCalculator<'a> {
    /// Create a calculator updating the mods of `mods`.
    pub fn new(mods: &'a dyn ModRegistry) -> Self {
        Self {
            mods,
        }
    }

    /// Compute and store the order of every mod. Returns the mod names in load order.
    pub fn calculate(&self) -> Vec<String> {
        let all_mods: Vec<_> =
            self.mods.get_all_names().iter().filter_map(|name| self.mods.get(name)).collect();

        let mut graph = LoadOrderGraph::new();
        for mod_ in &all_mods {
            let is_base = mod_.name == BASE_MOD_NAME;
            graph.add_mod(&mod_.name, (!is_base, mod_.name.to_lowercase(), mod_.name.clone()));
        }
        for mod_ in &all_mods {
            for dependency in &mod_.dependencies {
                graph.add_dependency(&mod_.name, &dependency.required_mod_name);
            }
        }

        let sorted = graph.sorted();
        for (position, name) in sorted.iter().enumerate() {
            if let Some(mut mod_) = self.mods.get(name) {
                mod_.order = u32::try_from(position + 1).unwrap_or(u32::MAX);
                self.mods.set(mod_);
            }
        }

        tracing::debug!(target: "resolver", "Calculated load order of {} mods", sorted.len());
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Dependency, Mod};
    use crate::registry::FileModRegistry;

    #[test]
    fn test_order_follows_dependencies_then_name() {
        let mods = FileModRegistry::in_memory();
        mods.set(Mod::new("base", "0.17.79"));
        mods.set(Mod::new("Zeta", "1.0.0"));
        mods.set(Mod::new("alpha", "1.0.0"));
        let mut beta = Mod::new("beta", "1.0.0");
        beta.add_dependency(Dependency::optional("zz-late", ""));
        mods.set(beta);
        mods.set(Mod::new("zz-late", "1.0.0"));

        let sorted = ModOrderCalculator::new(&mods).calculate();
        assert_eq!(sorted, vec!["base", "alpha", "Zeta", "zz-late", "beta"]);

        assert_eq!(mods.get("base").unwrap().order, 1);
        assert_eq!(mods.get("beta").unwrap().order, 5);
    }
}
