use anyhow::Result;
use std::collections::HashSet;

use super::EntityReducer;
use crate::entity::{Combination, EntityKind};
use crate::registry::{EntityRegistry, fetch_entity};

/// Removes every icon the parent already has.
pub struct IconReducer;

impl EntityReducer for IconReducer {
    fn reduce(
        &self,
        combination: &mut Combination,
        parent: &Combination,
        lookup: &EntityRegistry,
        output: &EntityRegistry,
    ) -> Result<()> {
        let inherited: HashSet<&String> = parent.icon_hashes.iter().collect();

        let mut kept = Vec::new();
        for hash in &combination.icon_hashes {
            if inherited.contains(hash) {
                continue;
            }
            output.set(fetch_entity(lookup, EntityKind::Icon, hash)?)?;
            kept.push(hash.clone());
        }

        combination.icon_hashes = kept;
        Ok(())
    }
}
