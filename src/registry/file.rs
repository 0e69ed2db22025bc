use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::path::PathBuf;

use super::{Keyed, Registry};
use crate::utils::atomic_write;

/// Registry storing one JSON file per key.
///
/// Files live under a two character fan-out directory:
/// `{root}/{key[0..2]}/{key}.json`. Keys are hex digests, anything else is
/// rejected so that a key can never escape the root directory.
pub struct FileRegistry<V> {
    root: PathBuf,
    _marker: PhantomData<fn() -> V>,
}

impl<V> FileRegistry<V> {
    /// Create a registry rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            _marker: PhantomData,
        }
    }

    fn path_for(&self, key: &str) -> Option<PathBuf> {
        let valid = key.len() > 2 && key.chars().all(|c| c.is_ascii_alphanumeric());
        valid.then(|| self.root.join(&key[..2]).join(format!("{key}.json")))
    }
}

impl<V> Registry<V> for FileRegistry<V>
where
    V: Keyed + Serialize + DeserializeOwned,
{
    fn get(&self, key: &str) -> Result<Option<V>> {
        let Some(path) = self.path_for(key) else {
            return Ok(None);
        };

        let content = match std::fs::read(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        let value = serde_json::from_slice(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Some(value))
    }

    fn set(&self, value: V) -> Result<String> {
        let key = value.key();
        let path = self
            .path_for(&key)
            .ok_or_else(|| anyhow::anyhow!("Invalid registry key: '{key}'"))?;

        if !V::CONTENT_ADDRESSED || !path.exists() {
            let content = serde_json::to_vec(&value)
                .with_context(|| format!("Failed to serialize value for key {key}"))?;
            atomic_write(&path, &content)?;
        }
        Ok(key)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let Some(path) = self.path_for(key) else {
            return Ok(());
        };
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }
}
