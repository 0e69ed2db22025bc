use anyhow::Result;
use std::collections::HashSet;

use crate::factorio::ModFileReader;
use crate::registry::ModRegistry;
use crate::resolver::ModOrderCalculator;

/// Changes applied to the mod registry by [`update_mod_list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModListChanges {
    /// Mods seen for the first time
    pub added: Vec<String>,
    /// Mods installed in a different version than before
    pub updated: Vec<String>,
    /// Mods no longer installed
    pub removed: Vec<String>,
    /// Number of mods installed in the same version as before
    pub unchanged: usize,
}

impl ModListChanges {
    /// Whether the registry changed at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

/// Synchronize the mod registry with the installed mods.
///
/// Mods installed in an unchanged version keep their exported state
/// (combination history, thumbnail and localised texts). A new version
/// starts over, since its old combinations describe different data.
/// Afterwards the load order of all mods is recalculated and the registry
/// is saved.
pub fn update_mod_list(mods: &dyn ModRegistry, reader: &ModFileReader) -> Result<ModListChanges> {
    let installed = reader.read_all()?;
    let installed_names: HashSet<String> = installed.iter().map(|mod_| mod_.name.clone()).collect();
    let mut changes = ModListChanges::default();

    for mut mod_ in installed {
        match mods.get(&mod_.name) {
            None => changes.added.push(mod_.name.clone()),
            Some(existing) if existing.version == mod_.version => {
                mod_.combination_hashes = existing.combination_hashes;
                mod_.thumbnail_hash = existing.thumbnail_hash;
                if !existing.titles.is_empty() {
                    mod_.titles = existing.titles;
                }
                if !existing.descriptions.is_empty() {
                    mod_.descriptions = existing.descriptions;
                }
                changes.unchanged += 1;
            }
            Some(existing) => {
                tracing::info!(
                    target: "export",
                    "Mod {} changed from {} to {}",
                    mod_.name,
                    existing.version,
                    mod_.version
                );
                changes.updated.push(mod_.name.clone());
            }
        }
        mods.set(mod_);
    }

    for name in mods.get_all_names() {
        if !installed_names.contains(&name) {
            mods.remove(&name);
            changes.removed.push(name);
        }
    }

    let order = ModOrderCalculator::new(mods).calculate();
    mods.save_mods()?;

    tracing::info!(
        target: "export",
        "Updated mod list: {} mods, {} added, {} updated, {} removed",
        order.len(),
        changes.added.len(),
        changes.updated.len(),
        changes.removed.len()
    );
    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Mod;
    use crate::registry::FileModRegistry;
    use crate::test_utils::{write_base, write_mod_zip};
    use tempfile::TempDir;

    #[test]
    fn test_update_mod_list() {
        let temp = TempDir::new().unwrap();
        let factorio = temp.path().join("factorio");
        let mods_directory = temp.path().join("mods");
        write_base(&factorio, "0.17.79");
        write_mod_zip(&mods_directory, "bobplates", "0.17.5", &["? FNEI"]);
        write_mod_zip(&mods_directory, "FNEI", "0.2.1", &[]);

        let mods = FileModRegistry::open(&temp.path().join("mods.json")).unwrap();
        let mut base = Mod::new("base", "0.17.79");
        base.combination_hashes = vec!["abc".to_string()];
        base.thumbnail_hash = "thumb".to_string();
        mods.set(base);
        mods.set(Mod::new("FNEI", "0.2.0"));
        mods.set(Mod::new("angelsrefining", "0.10.0"));

        let reader = ModFileReader::new(&factorio, &mods_directory);
        let changes = update_mod_list(&mods, &reader).unwrap();

        assert_eq!(changes.added, vec!["bobplates"]);
        assert_eq!(changes.updated, vec!["FNEI"]);
        assert_eq!(changes.removed, vec!["angelsrefining"]);
        assert_eq!(changes.unchanged, 1);

        let base = mods.get("base").unwrap();
        assert_eq!(base.combination_hashes, vec!["abc"]);
        assert_eq!(base.thumbnail_hash, "thumb");
        assert_eq!(base.order, 1);
        assert_eq!(mods.get("FNEI").unwrap().order, 2);
        assert_eq!(mods.get("bobplates").unwrap().order, 3);
        assert!(mods.get("angelsrefining").is_none());

        let reopened = FileModRegistry::open(&temp.path().join("mods.json")).unwrap();
        assert_eq!(reopened.get_all_names(), vec!["FNEI", "base", "bobplates"]);
    }

    #[test]
    fn test_unchanged_mods() {
        let temp = TempDir::new().unwrap();
        let factorio = temp.path().join("factorio");
        write_base(&factorio, "1.0.0");

        let mods = FileModRegistry::in_memory();
        let reader = ModFileReader::new(&factorio, temp.path().join("mods"));
        assert!(!update_mod_list(&mods, &reader).unwrap().is_empty());
        assert!(update_mod_list(&mods, &reader).unwrap().is_empty());
    }
}
