//! Commands maintaining and inspecting the mod registry.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use super::{CommandContext, OutputFormat};
use crate::entity::Mod;
use crate::export::{list_missing, update_mod_list};
use crate::factorio::{DumpInfoGenerator, ModFileReader};
use crate::registry::StoreLock;

/// Read the installed mods into the registry.
#[derive(Debug, Args)]
pub struct UpdateListCommand {}

impl UpdateListCommand {
    /// Update the registry and regenerate the dump mod info.json.
    pub async fn execute(self, context: &CommandContext) -> Result<()> {
        let _lock = StoreLock::acquire(&context.config.data_directory).await?;
        let storage = context.open_storage()?;
        let reader = ModFileReader::new(&context.config.factorio_directory, &context.config.mods_directory);

        let changes = update_mod_list(storage.mods.as_ref(), &reader)?;
        DumpInfoGenerator::new(storage.mods.as_ref(), &context.config.dump_mod_directory).generate()?;

        for name in &changes.added {
            println!("  {} {}", "+".green(), name);
        }
        for name in &changes.updated {
            println!("  {} {}", "~".yellow(), name);
        }
        for name in &changes.removed {
            println!("  {} {}", "-".red(), name);
        }
        println!(
            "{} {} added, {} updated, {} removed, {} unchanged",
            "✓".green(),
            changes.added.len(),
            changes.updated.len(),
            changes.removed.len(),
            changes.unchanged
        );
        Ok(())
    }
}

/// List the known mods in load order.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl ListCommand {
    /// Print the mods.
    pub async fn execute(self, context: &CommandContext) -> Result<()> {
        let storage = context.open_storage()?;
        let mods = storage.mods.as_ref();
        let mut all: Vec<Mod> = mods.get_all_names().iter().filter_map(|name| mods.get(name)).collect();
        all.sort_by(|a, b| (a.order, &a.name).cmp(&(b.order, &b.name)));

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&all).context("Failed to serialize mods")?);
            }
            OutputFormat::Table => {
                if all.is_empty() {
                    println!("No mods known, run {} first", "fie update-list".bold());
                    return Ok(());
                }
                println!("{:>5}  {:<40} {:<12} {}", "ORDER", "NAME", "VERSION", "COMBINATIONS");
                for mod_ in &all {
                    println!(
                        "{:>5}  {:<40} {:<12} {}",
                        mod_.order,
                        mod_.name,
                        mod_.version,
                        mod_.combination_hashes.len()
                    );
                }
            }
        }
        Ok(())
    }
}

/// List mandatory dependencies which are not satisfied.
#[derive(Debug, Args)]
pub struct ListMissingCommand {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl ListMissingCommand {
    /// Print the missing dependencies.
    pub async fn execute(self, context: &CommandContext) -> Result<()> {
        let storage = context.open_storage()?;
        let missing = list_missing(storage.mods.as_ref());

        match self.format {
            OutputFormat::Json => {
                let values: Vec<serde_json::Value> = missing
                    .iter()
                    .map(|dependency| {
                        serde_json::json!({
                            "mod": dependency.mod_name,
                            "requires": dependency.required_mod_name,
                            "version": dependency.required_version,
                            "installed": dependency.installed_version,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&values)?);
            }
            OutputFormat::Table => {
                if missing.is_empty() {
                    println!("{} All mandatory dependencies are installed", "✓".green());
                }
                for dependency in &missing {
                    println!("  {} {}", "✗".red(), dependency);
                }
            }
        }
        Ok(())
    }
}

/// Write the info.json of the dump mod.
#[derive(Debug, Args)]
pub struct GenerateDumpInfoCommand {}

impl GenerateDumpInfoCommand {
    /// Generate the file from the current mod registry.
    pub async fn execute(self, context: &CommandContext) -> Result<()> {
        let storage = context.open_storage()?;
        let path = DumpInfoGenerator::new(storage.mods.as_ref(), &context.config.dump_mod_directory)
            .generate()?;
        println!("{} Wrote {}", "✓".green(), path.display());
        Ok(())
    }
}
