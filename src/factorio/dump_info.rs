//! The `info.json` of the in-game dump mod.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::constants::{BASE_MOD_NAME, DUMP_MOD_NAME};
use crate::core::ExportError;
use crate::registry::ModRegistry;

#[derive(Debug, Serialize)]
struct DumpInfo {
    name: &'static str,
    version: &'static str,
    title: &'static str,
    author: &'static str,
    factorio_version: String,
    dependencies: Vec<String>,
}

/// Writes the manifest of the dump mod.
///
/// The dump mod declares an optional dependency on every known mod, so the
/// game loads it after all of them and it sees the final state of the data.
pub struct DumpInfoGenerator<'a> {
    mods: &'a dyn ModRegistry,
    dump_mod_directory: PathBuf,
}

impl<'a> DumpInfoGenerator<'a> {
    /// Create a generator writing into `dump_mod_directory`.
    pub fn new(mods: &'a dyn ModRegistry, dump_mod_directory: impl Into<PathBuf>) -> Self {
        Self {
            mods,
            dump_mod_directory: dump_mod_directory.into(),
        }
    }

    /// Path of the written manifest.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dump_mod_directory.join("info.json")
    }

    /// Write the manifest, replacing an existing one.
    pub fn generate(&self) -> Result<PathBuf, ExportError> {
        let base = self.mods.get(BASE_MOD_NAME).ok_or(ExportError::BaseModMissing)?;
        let factorio_version = base
            .parsed_version()
            .map(|version| format!("{}.{}", version.major, version.minor))
            .unwrap_or_else(|| base.version.clone());

        let dependencies = std::iter::once(BASE_MOD_NAME.to_string())
            .chain(
                self.mods
                    .get_all_names()
                    .into_iter()
                    .filter(|name| name != BASE_MOD_NAME && name != DUMP_MOD_NAME)
                    .map(|name| format!("? {name}")),
            )
            .collect();

        let info = DumpInfo {
            name: DUMP_MOD_NAME,
            version: "1.0.0",
            title: "Factorio Export Dump",
            author: "factorio-export",
            factorio_version,
            dependencies,
        };

        let path = self.path();
        let manifest_error = |reason: String| ExportError::ManifestWrite {
            path: path.display().to_string(),
            reason,
        };
        let content = serde_json::to_string_pretty(&info).map_err(|e| manifest_error(e.to_string()))?;
        crate::utils::safe_write(&path, &content).map_err(|e| manifest_error(format!("{e:#}")))?;

        tracing::info!(
            target: "factorio",
            "Wrote {} with {} dependencies",
            path.display(),
            info.dependencies.len()
        );
        Ok(path)
    }
}

/// Whether `directory` looks like a dump mod, i.e. carries an info.json.
#[must_use]
pub fn has_dump_info(directory: &Path) -> bool {
    directory.join("info.json").is_file()
}
