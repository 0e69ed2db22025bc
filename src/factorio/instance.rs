//! Working directories of the game instances.
//!
//! Every instance owns one directory below the instances directory, laid out
//! like a minimal game installation:
//!
//! ```text
//! <instance>/
//! ├── bin/x64/factorio      copy of the game binary
//! ├── data -> <factorio>/data
//! ├── config/config.ini     write-data pointing at the instance
//! └── mods/
//!     ├── mod-list.json     enabling exactly the loaded mods
//!     ├── <mod>.zip -> <mods directory>/<mod>.zip
//!     └── Dump -> <dump mod directory>
//! ```
//!
//! The binary is copied because the game resolves its read-data path relative
//! to the executable. The mod list doubles as the marker of the combination
//! the directory is currently set up for.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::ExportConfig;
use crate::constants::{BASE_MOD_NAME, DUMP_MOD_NAME};
use crate::entity::Combination;
use crate::registry::ModRegistry;
use crate::utils::{ensure_dir, link_or_copy, remove_dir_all_if_exists, safe_write};

/// Path of the game binary, relative to the installation.
pub const GAME_BINARY: &str = "bin/x64/factorio";

#[derive(Serialize)]
struct ModListEntry<'a> {
    name: &'a str,
    enabled: bool,
}

#[derive(Serialize)]
struct ModList<'a> {
    mods: Vec<ModListEntry<'a>>,
}

/// One isolated game installation.
#[derive(Debug)]
pub struct Instance {
    id: usize,
    directory: PathBuf,
    factorio_directory: PathBuf,
    mods_directory: PathBuf,
    dump_mod_directory: PathBuf,
}

impl Instance {
    /// Create the instance with the given number. Nothing is written yet.
    #[must_use]
    pub fn new(id: usize, config: &ExportConfig) -> Self {
        Self {
            id,
            directory: config.instances_directory.join(format!("instance-{id}")),
            factorio_directory: config.factorio_directory.clone(),
            mods_directory: config.mods_directory.clone(),
            dump_mod_directory: config.dump_mod_directory.clone(),
        }
    }

    /// Number of the instance.
    #[must_use]
    pub const fn id(&self) -> usize {
        self.id
    }

    /// The working directory of the instance.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Set up the working directory for `combination`.
    ///
    /// A directory already set up for the same set of mods is reused as is.
    /// Otherwise it is torn down completely and rebuilt.
    pub fn prepare(&self, combination: &Combination, mods: &dyn ModRegistry) -> Result<()> {
        let mod_list = Self::mod_list(combination)?;
        let mod_list_path = self.directory.join("mods").join("mod-list.json");

        if std::fs::read_to_string(&mod_list_path).is_ok_and(|existing| existing == mod_list) {
            tracing::debug!(
                target: "factorio",
                "Instance {} is already set up for {}",
                self.id,
                combination.name
            );
            return Ok(());
        }

        self.tear_down()?;
        tracing::debug!(target: "factorio", "Setting up instance {} for {}", self.id, combination.name);

        self.copy_binary()?;
        link_or_copy(&self.factorio_directory.join("data"), &self.directory.join("data"))?;
        safe_write(
            &self.directory.join("config").join("config.ini"),
            &format!(
                "[path]\nread-data=__PATH__executable__/../../data\nwrite-data={}\n",
                self.directory.display()
            ),
        )?;

        let mods_target = self.directory.join("mods");
        ensure_dir(&mods_target)?;
        for mod_name in &combination.loaded_mod_names {
            if mod_name == BASE_MOD_NAME {
                continue;
            }
            let mod_ = mods.require(mod_name)?;
            if mod_.file_name.is_empty() {
                continue;
            }
            link_or_copy(&self.mods_directory.join(&mod_.file_name), &mods_target.join(&mod_.file_name))?;
        }
        link_or_copy(&self.dump_mod_directory, &mods_target.join(DUMP_MOD_NAME))?;

        // written last: a directory without it counts as not set up
        safe_write(&mod_list_path, &mod_list)?;
        Ok(())
    }

    /// Remove the working directory.
    pub fn tear_down(&self) -> Result<()> {
        remove_dir_all_if_exists(&self.directory)
    }

    fn copy_binary(&self) -> Result<()> {
        let source = self.factorio_directory.join(GAME_BINARY);
        let target = self.directory.join(GAME_BINARY);
        if let Some(parent) = target.parent() {
            ensure_dir(parent)?;
        }
        std::fs::copy(&source, &target).with_context(|| {
            format!("Failed to copy game binary {} to {}", source.display(), target.display())
        })?;
        Ok(())
    }

    fn mod_list(combination: &Combination) -> Result<String> {
        let mods = combination
            .loaded_mod_names
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(DUMP_MOD_NAME))
            .map(|name| ModListEntry {
                name,
                enabled: true,
            })
            .collect();
        serde_json::to_string_pretty(&ModList {
            mods,
        })
        .context("Failed to serialize mod list")
    }
}
