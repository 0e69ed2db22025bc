use std::fmt;

use crate::entity::parse_version;
use crate::registry::ModRegistry;

/// A mandatory dependency which is not satisfied by the installed mods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDependency {
    /// The mod declaring the dependency
    pub mod_name: String,
    /// The required mod
    pub required_mod_name: String,
    /// Minimal version of the required mod, empty if any version will do
    pub required_version: String,
    /// Version of the required mod if it is installed in a version too old
    pub installed_version: Option<String>,
}

impl fmt::Display for MissingDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} requires {}", self.mod_name, self.required_mod_name)?;
        if !self.required_version.is_empty() {
            write!(f, " >= {}", self.required_version)?;
        }
        match &self.installed_version {
            Some(version) => write!(f, " (installed: {version})"),
            None => write!(f, " (not installed)"),
        }
    }
}

/// Mandatory dependencies of all known mods which are absent or too old.
///
/// Versions which cannot be parsed are not compared, the dependency counts
/// as satisfied as soon as the mod is installed.
pub fn list_missing(mods: &dyn ModRegistry) -> Vec<MissingDependency> {
    let mut missing = Vec::new();

    for name in mods.get_all_names() {
        let Some(mod_) = mods.get(&name) else {
            continue;
        };

        for dependency in mod_.dependencies_where(true) {
            let installed = mods.get(&dependency.required_mod_name);
            let satisfied = match &installed {
                None => false,
                Some(required) => {
                    match (required.parsed_version(), parse_version(&dependency.required_version)) {
                        (Some(installed), Some(minimum)) => installed >= minimum,
                        _ => true,
                    }
                }
            };

            if !satisfied {
                missing.push(MissingDependency {
                    mod_name: mod_.name.clone(),
                    required_mod_name: dependency.required_mod_name.clone(),
                    required_version: dependency.required_version.clone(),
                    installed_version: installed.map(|required| required.version),
                });
            }
        }
    }

    tracing::debug!(target: "export", "{} missing dependencies", missing.len());
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Dependency, Mod};
    use crate::registry::FileModRegistry;

    fn registry() -> FileModRegistry {
        let mods = FileModRegistry::in_memory();
        mods.set(Mod::new("base", "0.17.79"));

        let mut bobplates = Mod::new("bobplates", "0.17.5");
        bobplates.add_dependency(Dependency::mandatory("boblibrary", "0.17.2"));
        bobplates.add_dependency(Dependency::mandatory("base", "0.17"));
        bobplates.add_dependency(Dependency::optional("FNEI", ""));
        mods.set(bobplates);
        mods
    }

    #[test]
    fn test_absent_dependency() {
        let mods = registry();
        let missing = list_missing(&mods);

        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].mod_name, "bobplates");
        assert_eq!(missing[0].required_mod_name, "boblibrary");
        assert_eq!(missing[0].installed_version, None);
        assert_eq!(missing[0].to_string(), "bobplates requires boblibrary >= 0.17.2 (not installed)");
    }

    #[test]
    fn test_outdated_dependency() {
        let mods = registry();
        mods.set(Mod::new("boblibrary", "0.17.1"));

        let missing = list_missing(&mods);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].installed_version.as_deref(), Some("0.17.1"));

        mods.set(Mod::new("boblibrary", "0.17.10"));
        assert!(list_missing(&mods).is_empty());
    }
}
