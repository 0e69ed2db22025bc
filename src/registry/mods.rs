use anyhow::{Context, Result};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::ExportError;
use crate::entity::Mod;
use crate::utils::safe_write;

/// Registry of all known mods, keyed by name.
pub trait ModRegistry: Send + Sync {
    /// Fetch a mod by name.
    fn get(&self, name: &str) -> Option<Mod>;

    /// Names of all known mods, sorted.
    fn get_all_names(&self) -> Vec<String>;

    /// Insert or replace a mod.
    fn set(&self, mod_: Mod);

    /// Forget a mod, e.g. one which got uninstalled.
    fn remove(&self, name: &str);

    /// Persist all mods.
    fn save_mods(&self) -> Result<()>;

    /// Fetch a mod which must exist.
    fn require(&self, name: &str) -> Result<Mod, ExportError> {
        self.get(name).ok_or_else(|| ExportError::ModNotFound {
            name: name.to_string(),
        })
    }
}

/// Mod registry backed by a single `mods.json` file.
///
/// Mods are held in memory and only written back on [`ModRegistry::save_mods`].
pub struct FileModRegistry {
    mods: DashMap<String, Mod>,
    path: Option<PathBuf>,
}

impl FileModRegistry {
    /// Load the registry from `path`, starting empty if the file does not exist.
    pub fn open(path: &Path) -> Result<Self> {
        let mods = DashMap::new();

        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let stored: BTreeMap<String, Mod> = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            for (name, mod_) in stored {
                mods.insert(name, mod_);
            }
        }

        tracing::debug!(target: "registry::mods", "Loaded {} mods from {}", mods.len(), path.display());

        Ok(Self {
            mods,
            path: Some(path.to_path_buf()),
        })
    }

    /// Registry which is never persisted.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            mods: DashMap::new(),
            path: None,
        }
    }
}

impl ModRegistry for FileModRegistry {
    fn get(&self, name: &str) -> Option<Mod> {
        self.mods.get(name).map(|entry| entry.value().clone())
    }

    fn get_all_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.mods.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    fn set(&self, mod_: Mod) {
        self.mods.insert(mod_.name.clone(), mod_);
    }

    fn remove(&self, name: &str) {
        self.mods.remove(name);
    }

    fn save_mods(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let sorted: BTreeMap<String, Mod> =
            self.mods.iter().map(|entry| (entry.key().clone(), entry.value().clone())).collect();
        let content = serde_json::to_string_pretty(&sorted).context("Failed to serialize mods")?;
        safe_write(path, &content)?;

        tracing::debug!(target: "registry::mods", "Saved {} mods to {}", sorted.len(), path.display());
        Ok(())
    }
}
