use anyhow::Result;

use super::{Keyed, MemoryRegistry, Registry};

enum Upper<'a, V> {
    Owned(MemoryRegistry<V>),
    Borrowed(&'a dyn Registry<V>),
}

/// A registry layering one registry on top of another one.
///
/// Reads check the upper layer first and fall through to the lower one.
/// Writes and removals only ever touch the upper layer, so the lower
/// registry is never modified through an overlay.
pub struct OverlayRegistry<'a, V> {
    upper: Upper<'a, V>,
    lower: &'a dyn Registry<V>,
}

impl<'a, V> OverlayRegistry<'a, V> {
    /// Create an overlay over `lower` with a fresh in-memory upper layer.
    pub fn new(lower: &'a dyn Registry<V>) -> Self {
        Self {
            upper: Upper::Owned(MemoryRegistry::new()),
            lower,
        }
    }

    /// Stack two existing registries, writing into `upper`.
    pub fn stacked(upper: &'a dyn Registry<V>, lower: &'a dyn Registry<V>) -> Self {
        Self {
            upper: Upper::Borrowed(upper),
            lower,
        }
    }

    fn upper(&self) -> &dyn Registry<V>
    where
        V: Keyed + Clone + Send + Sync,
    {
        match &self.upper {
            Upper::Owned(registry) => registry,
            Upper::Borrowed(registry) => *registry,
        }
    }
}

impl<V> Registry<V> for OverlayRegistry<'_, V>
where
    V: Keyed + Clone + Send + Sync,
{
    fn get(&self, key: &str) -> Result<Option<V>> {
        match self.upper().get(key)? {
            Some(value) => Ok(Some(value)),
            None => self.lower.get(key),
        }
    }

    fn set(&self, value: V) -> Result<String> {
        self.upper().set(value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.upper().remove(key)
    }
}
