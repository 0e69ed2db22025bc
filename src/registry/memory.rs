use anyhow::Result;
use dashmap::DashMap;

use super::{Keyed, Registry};

/// Registry keeping all values in memory.
///
/// Used for combination-scoped scratch data of game instances, for merge
/// products which must not be persisted, and in tests.
pub struct MemoryRegistry<V> {
    values: DashMap<String, V>,
}

impl<V> MemoryRegistry<V> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: DashMap::new(),
        }
    }

    /// Number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keys of all stored values, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.values.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        keys
    }
}

impl<V> Default for MemoryRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Registry<V> for MemoryRegistry<V>
where
    V: Keyed + Clone + Send + Sync,
{
    fn get(&self, key: &str) -> Result<Option<V>> {
        Ok(self.values.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, value: V) -> Result<String> {
        let key = value.key();
        self.values.insert(key.clone(), value);
        Ok(key)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{ExportEntity, Item};

    #[test]
    fn test_set_get_remove() {
        let registry = MemoryRegistry::<ExportEntity>::new();
        let entity = ExportEntity::from(Item::new("fluid", "water"));

        let hash = registry.set(entity.clone()).unwrap();
        assert_eq!(hash, entity.content_hash());
        assert_eq!(registry.get(&hash).unwrap(), Some(entity));
        assert_eq!(registry.len(), 1);

        registry.remove(&hash).unwrap();
        assert!(registry.get(&hash).unwrap().is_none());
        assert!(registry.is_empty());
    }
}
