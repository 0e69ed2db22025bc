use anyhow::Result;
use serde_json::json;

use super::{ParseContext, Parser};
use crate::constants::ENERGY_USAGE_UNITS;
use crate::dump::{Dump, DumpMachine};
use crate::entity::{Combination, Machine, MachineData, round3};

/// Creates the crafting machines.
pub struct MachineParser;

impl MachineParser {
    fn map_machine(dump_machine: &DumpMachine, context: &mut ParseContext) -> Machine {
        let mut machine = Machine::new(dump_machine.name.clone());
        context.catalog.add_translations_to_entity(
            &mut machine.labels,
            "machine",
            &dump_machine.localised_name,
            Some(&json!([format!("item-name.{}", dump_machine.name)])),
        );
        context.catalog.add_translations_to_entity(
            &mut machine.descriptions,
            "machine",
            &dump_machine.localised_description,
            Some(&json!([format!("item-description.{}", dump_machine.name)])),
        );

        let mut crafting_categories = dump_machine.crafting_categories.clone();
        crafting_categories.sort();
        crafting_categories.dedup();

        let (energy_usage, energy_usage_unit) = normalize_energy_usage(dump_machine.energy_usage);
        machine.data = MachineData {
            crafting_categories,
            crafting_speed: round3(dump_machine.crafting_speed),
            number_of_item_slots: dump_machine.item_slots,
            number_of_fluid_input_slots: dump_machine.fluid_input_slots,
            number_of_fluid_output_slots: dump_machine.fluid_output_slots,
            number_of_module_slots: dump_machine.module_slots,
            energy_usage,
            energy_usage_unit,
        };
        machine.icon_hash = context.icon_hash("machine", &dump_machine.name);
        machine
    }
}

/// Scale an energy usage in watts down to the largest unit keeping it at or above 1.
///
/// ```rust
/// use factorio_export::parser::normalize_energy_usage;
///
/// assert_eq!(normalize_energy_usage(150_000.0), (150.0, "kW".to_string()));
/// assert_eq!(normalize_energy_usage(2_500_000.0), (2.5, "MW".to_string()));
/// assert_eq!(normalize_energy_usage(0.0), (0.0, "W".to_string()));
/// ```
#[must_use]
pub fn normalize_energy_usage(watts: f64) -> (f64, String) {
    let mut value = watts;
    let mut unit = 0;
    while value >= 1000.0 && unit < ENERGY_USAGE_UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    (round3(value), ENERGY_USAGE_UNITS[unit].to_string())
}

impl Parser for MachineParser {
    fn parse(&self, dump: &Dump, _combination: &mut Combination, context: &mut ParseContext) -> Result<()> {
        for dump_machine in &dump.control_stage.machines {
            let machine = Self::map_machine(dump_machine, context);
            context.machines.push(machine);
        }
        Ok(())
    }
}
