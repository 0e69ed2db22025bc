use anyhow::Result;

use super::{EntityReducer, reduce_icon_hash, reduce_identified, reduce_translations};
use crate::entity::{Combination, Machine, MachineData};
use crate::registry::EntityRegistry;

/// Reduces machines against the parent machine of the same name.
pub struct MachineReducer;

impl MachineReducer {
    fn reduce_entity(machine: &mut Machine, parent: &Machine) -> bool {
        reduce_translations(&mut machine.labels, &parent.labels);
        reduce_translations(&mut machine.descriptions, &parent.descriptions);
        if machine.data.data_hash() == parent.data.data_hash() {
            machine.data = MachineData::default();
        }
        reduce_icon_hash(&mut machine.icon_hash, &parent.icon_hash);
        true
    }
}

impl EntityReducer for MachineReducer {
    fn reduce(
        &self,
        combination: &mut Combination,
        parent: &Combination,
        lookup: &EntityRegistry,
        output: &EntityRegistry,
    ) -> Result<()> {
        reduce_identified(combination, parent, lookup, output, Self::reduce_entity)
    }
}
