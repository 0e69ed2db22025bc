//! Content-addressed storage of the exported data.
//!
//! All data is kept in key-value registries implementing [`Registry`]:
//!
//! - entities ([`ExportEntity`]) keyed by their content hash
//! - combinations ([`Combination`]) keyed by their id
//! - mods keyed by their name, see [`ModRegistry`]
//!
//! # Concurrency contract
//!
//! - Entity writes are idempotent per key: the same key always carries the
//!   same bytes, so two writers storing the same entity cannot corrupt it.
//! - Combination records and mods are written by the orchestrating process
//!   only. Game instances produce combination-scoped data in their own
//!   [`MemoryRegistry`] and never touch shared records.
//! - A whole data directory is guarded by an exclusive [`StoreLock`] held for
//!   the duration of an export run, so independent OS processes cannot write
//!   mod-level records at the same time.
//!
//! Merging produces entities which must never be persisted. Those go into an
//! [`OverlayRegistry`], which reads through to the persistent registry but
//! keeps every write in memory.

mod file;
mod lock;
mod memory;
mod mods;
mod overlay;

pub use file::FileRegistry;
pub use lock::StoreLock;
pub use memory::MemoryRegistry;
pub use mods::{FileModRegistry, ModRegistry};
pub use overlay::OverlayRegistry;

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::core::ExportError;
use crate::entity::{Combination, EntityKind, ExportEntity};

/// Values which know their own storage key.
pub trait Keyed {
    /// Whether the key is derived from the content, so a stored value never changes.
    const CONTENT_ADDRESSED: bool = false;

    /// The key the value is stored under.
    fn key(&self) -> String;
}

impl Keyed for ExportEntity {
    const CONTENT_ADDRESSED: bool = true;

    fn key(&self) -> String {
        self.content_hash()
    }
}

impl Keyed for Combination {
    fn key(&self) -> String {
        self.id.clone()
    }
}

/// A key-value registry.
pub trait Registry<V>: Send + Sync {
    /// Fetch the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<V>>;

    /// Store a value under its own key and return that key.
    fn set(&self, value: V) -> Result<String>;

    /// Remove the value stored under `key`, if any.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Registry of content-addressed entities.
///
/// Generic over the lifetime so overlays borrowing another registry qualify.
pub type EntityRegistry<'a> = dyn Registry<ExportEntity> + 'a;

/// Registry of combinations.
pub type CombinationRegistry = dyn Registry<Combination>;

/// Fetch an entity which must exist and must be of the given kind.
pub fn fetch_entity(registry: &EntityRegistry, kind: EntityKind, hash: &str) -> Result<ExportEntity> {
    let entity = registry.get(hash)?.ok_or_else(|| ExportError::EntityNotFound {
        kind: kind.to_string(),
        hash: hash.to_string(),
    })?;
    Ok(entity.expect_kind(kind)?)
}

/// Fetch a combination which must exist.
pub fn fetch_combination(registry: &CombinationRegistry, id: &str) -> Result<Combination> {
    Ok(registry.get(id)?.ok_or_else(|| ExportError::CombinationNotFound {
        id: id.to_string(),
    })?)
}

/// All registries of one data directory.
#[derive(Clone)]
pub struct ExportStorage {
    /// Entities keyed by content hash
    pub entities: Arc<EntityRegistry<'static>>,
    /// Combinations keyed by id
    pub combinations: Arc<CombinationRegistry>,
    /// Mods keyed by name
    pub mods: Arc<dyn ModRegistry>,
}

impl ExportStorage {
    /// Open the file based storage inside `data_dir`.
    pub fn open(data_dir: &Path) -> Result<Self> {
        Ok(Self {
            entities: Arc::new(FileRegistry::<ExportEntity>::new(data_dir.join("entities"))),
            combinations: Arc::new(FileRegistry::<Combination>::new(data_dir.join("combinations"))),
            mods: Arc::new(FileModRegistry::open(&data_dir.join("mods.json"))?),
        })
    }

    /// Storage kept entirely in memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            entities: Arc::new(MemoryRegistry::<ExportEntity>::new()),
            combinations: Arc::new(MemoryRegistry::<Combination>::new()),
            mods: Arc::new(FileModRegistry::in_memory()),
        }
    }
}
