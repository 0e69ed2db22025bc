//! Reading the `info.json` manifests of the installed mods.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::constants::{BASE_MOD_NAME, DEFAULT_LOCALE};
use crate::core::ExportError;
use crate::entity::{Dependency, Mod};

/// The fields of an `info.json` the exporter cares about.
#[derive(Debug, Deserialize)]
struct InfoJson {
    name: String,
    version: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    dependencies: Vec<String>,
}

impl InfoJson {
    fn into_mod(self, file_name: String) -> Mod {
        let mut mod_ = Mod::new(self.name, self.version);
        mod_.file_name = file_name;
        mod_.author = self.author;
        if !self.title.is_empty() {
            mod_.titles.insert(DEFAULT_LOCALE.to_string(), self.title);
        }
        if !self.description.is_empty() {
            mod_.descriptions.insert(DEFAULT_LOCALE.to_string(), self.description);
        }
        for dependency in self.dependencies.iter().filter_map(|value| Dependency::parse(value)) {
            if dependency.required_mod_name != mod_.name {
                mod_.add_dependency(dependency);
            }
        }
        mod_
    }
}

/// Reads the mods of a game installation and its mods directory.
pub struct ModFileReader {
    factorio_directory: PathBuf,
    mods_directory: PathBuf,
}

impl ModFileReader {
    /// Create a reader over the given directories.
    pub fn new(factorio_directory: impl Into<PathBuf>, mods_directory: impl Into<PathBuf>) -> Self {
        Self {
            factorio_directory: factorio_directory.into(),
            mods_directory: mods_directory.into(),
        }
    }

    /// Read the base mod and every zipped mod, sorted by name.
    ///
    /// Zip files without a readable `info.json` are skipped with a warning.
    pub fn read_all(&self) -> Result<Vec<Mod>> {
        let mut mods = vec![self.read_base()?];

        if self.mods_directory.is_dir() {
            let entries = std::fs::read_dir(&self.mods_directory).with_context(|| {
                format!("Failed to read mods directory {}", self.mods_directory.display())
            })?;

            let mut paths: Vec<PathBuf> = entries
                .filter_map(|entry| entry.ok().map(|entry| entry.path()))
                .filter(|path| path.extension().is_some_and(|extension| extension == "zip"))
                .collect();
            paths.sort();

            for path in paths {
                match self.read_zip(&path) {
                    Ok(mod_) => mods.push(mod_),
                    Err(e) => tracing::warn!(target: "factorio", "Skipping {}: {:#}", path.display(), e),
                }
            }
        } else {
            tracing::warn!(
                target: "factorio",
                "Mods directory {} does not exist",
                self.mods_directory.display()
            );
        }

        mods.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(mods)
    }

    /// Read the base mod shipped with the game.
    pub fn read_base(&self) -> Result<Mod> {
        let path = self.factorio_directory.join("data").join(BASE_MOD_NAME).join("info.json");
        if !path.exists() {
            return Err(ExportError::BaseModMissing.into());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let info: InfoJson = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(info.into_mod(String::new()))
    }

    /// Read the mod packed into the zip file at `path`.
    ///
    /// The manifest is expected at `<folder>/info.json`, with the folder
    /// being the single top-level directory of the archive.
    pub fn read_zip(&self, path: &Path) -> Result<Mod> {
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let mut archive = zip::ZipArchive::new(BufReader::new(file))
            .with_context(|| format!("Failed to read zip {}", path.display()))?;

        let info_name = archive
            .file_names()
            .find(|name| {
                name.strip_suffix("info.json")
                    .is_some_and(|folder| folder.matches('/').count() == 1 && folder.ends_with('/'))
            })
            .map(ToString::to_string)
            .ok_or_else(|| anyhow::anyhow!("No info.json found in {}", path.display()))?;

        let mut content = String::new();
        archive
            .by_name(&info_name)
            .with_context(|| format!("Failed to open {info_name} in {}", path.display()))?
            .read_to_string(&mut content)
            .with_context(|| format!("Failed to read {info_name} in {}", path.display()))?;

        let info: InfoJson = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {info_name} in {}", path.display()))?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(info.into_mod(file_name))
    }
}
