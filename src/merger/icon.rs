use anyhow::Result;

use super::EntityMerger;
use crate::entity::Combination;
use crate::registry::EntityRegistry;

/// Merges icons as a plain union of their hashes.
///
/// Icons are atomic, there is nothing to merge field by field.
pub struct IconMerger;

impl EntityMerger for IconMerger {
    fn merge(
        &self,
        destination: &mut Combination,
        source: &Combination,
        _registry: &EntityRegistry,
    ) -> Result<()> {
        for hash in &source.icon_hashes {
            if !destination.icon_hashes.contains(hash) {
                destination.icon_hashes.push(hash.clone());
            }
        }
        Ok(())
    }
}
