//! The `export` and `export-step` commands.
//!
//! Both hold the [`StoreLock`] of the data directory while running, so two
//! exports can never write the mod registry at the same time. The info.json
//! of the dump mod is generated first if it does not exist yet.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::CommandContext;
use crate::core::ExportError;
use crate::export::{ExportSummary, Exporter};
use crate::factorio::{DumpInfoGenerator, ProcessGameRunner, has_dump_info};
use crate::registry::{ExportStorage, StoreLock};

/// Export all combinations of one or more mods.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Names of the mods to export, in the order given
    #[arg(value_name = "MOD", required = true)]
    pub mod_names: Vec<String>,
}

/// Export the combinations loading exactly `step` optional mods.
#[derive(Debug, Args)]
pub struct ExportStepCommand {
    /// Name of the mod to export
    #[arg(value_name = "MOD")]
    pub mod_name: String,

    /// Number of optional mods loaded by the exported combinations
    #[arg(value_name = "STEP")]
    pub step: usize,
}

fn create_exporter(context: &CommandContext, storage: ExportStorage) -> Result<Exporter<ProcessGameRunner>> {
    let dump_mod_directory = &context.config.dump_mod_directory;
    if !has_dump_info(dump_mod_directory) {
        tracing::info!("Generating the dump mod info.json in {}", dump_mod_directory.display());
        DumpInfoGenerator::new(storage.mods.as_ref(), dump_mod_directory).generate()?;
    }

    Ok(Exporter::new(&context.config, storage, context.runner(), context.translator())
        .with_progress(context.show_progress))
}

fn print_summary(summary: &ExportSummary) {
    let status = if summary.failed() == 0 {
        "✓".green()
    } else {
        "!".yellow()
    };
    println!(
        "{} {}: {} combination(s) exported, {} failed, {} pruned",
        status,
        summary.mod_name.bold(),
        summary.exported(),
        summary.failed(),
        summary.pruned.len()
    );
}

impl ExportCommand {
    /// Export the mods one after another.
    ///
    /// A mod missing from the registry does not stop the remaining mods.
    /// The first such error is returned once all mods were processed.
    pub async fn execute(self, context: &CommandContext) -> Result<()> {
        let _lock = StoreLock::acquire(&context.config.data_directory).await?;
        let exporter = create_exporter(context, context.open_storage()?)?;

        let mut first_lookup_error = None;
        for mod_name in &self.mod_names {
            match exporter.export_mod(mod_name).await {
                Ok(summary) => print_summary(&summary),
                Err(e) if e.downcast_ref::<ExportError>().is_some_and(ExportError::is_not_found) => {
                    tracing::error!("Skipping {}: {:#}", mod_name, e);
                    first_lookup_error.get_or_insert(e);
                }
                Err(e) => {
                    exporter.tear_down().await?;
                    return Err(e);
                }
            }
        }

        match first_lookup_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl ExportStepCommand {
    /// Export one step of the mod.
    pub async fn execute(self, context: &CommandContext) -> Result<()> {
        let _lock = StoreLock::acquire(&context.config.data_directory).await?;
        let exporter = create_exporter(context, context.open_storage()?)?;

        let result = exporter.export_step(&self.mod_name, self.step).await;
        exporter.tear_down().await?;
        let summary = result?;

        println!(
            "{} {} step {}: {} of {} combination(s) exported",
            "✓".green(),
            self.mod_name.bold(),
            summary.step,
            summary.exported,
            summary.requested
        );
        Ok(())
    }
}
