//! Command-line interface of the exporter.
//!
//! # Available Commands
//!
//! - `update-list` - Read the installed mods into the mod registry
//! - `list` - List the known mods with their load order
//! - `list-missing` - List mandatory dependencies which are not installed
//! - `generate-dump-info` - Write the info.json of the dump mod
//! - `export` - Export all combinations of one or more mods
//! - `export-step` - Export a single step of a mod
//!
//! # Typical Workflow
//!
//! ```bash
//! # Register the installed mods and their load order
//! fie update-list
//!
//! # Check that all dependencies are installed
//! fie list-missing
//!
//! # Export the base game first, then the mods building on it
//! fie export base
//! fie export bobplates
//! ```
//!
//! # Global Options
//!
//! - `--verbose` / `-v` - Debug output
//! - `--quiet` / `-q` - Warnings and errors only
//! - `--config` / `-c` - Path of the configuration file
//! - `--no-progress` - Hide the progress bars
//!
//! `RUST_LOG` takes precedence over `--verbose` and `--quiet` when set.

mod export;
mod mods;

pub use export::{ExportCommand, ExportStepCommand};
pub use mods::{GenerateDumpInfoCommand, ListCommand, ListMissingCommand, UpdateListCommand};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::config::ExportConfig;
use crate::factorio::ProcessGameRunner;
use crate::registry::ExportStorage;
use crate::translator::{JsonLocaleTranslator, StaticTranslator, Translator};

/// Exports items, recipes, machines and icons of Factorio mods.
#[derive(Parser)]
#[command(
    name = "fie",
    about = "Factorio item export: exports the data of mods and their combinations",
    version,
    author,
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only print warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path of the configuration file
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Hide the progress bars
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Read the installed mods into the mod registry and calculate their load order
    UpdateList(UpdateListCommand),

    /// List the known mods
    List(ListCommand),

    /// List mandatory dependencies which are not installed or too old
    ListMissing(ListMissingCommand),

    /// Write the info.json of the dump mod
    GenerateDumpInfo(GenerateDumpInfoCommand),

    /// Export all combinations of one or more mods
    Export(ExportCommand),

    /// Export the combinations of a single step of a mod
    ExportStep(ExportStepCommand),
}

/// Output format of the listing commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human readable table
    #[default]
    Table,
    /// JSON for scripts
    Json,
}

/// Everything a command needs besides its own arguments.
pub struct CommandContext {
    /// The loaded configuration
    pub config: ExportConfig,
    /// Whether progress bars may be shown
    pub show_progress: bool,
}

impl CommandContext {
    /// Open the storage inside the configured data directory.
    pub fn open_storage(&self) -> Result<ExportStorage> {
        ExportStorage::open(&self.config.data_directory)
    }

    /// The translator for the configured locale directory.
    #[must_use]
    pub fn translator(&self) -> Arc<dyn Translator> {
        match &self.config.locale_directory {
            Some(directory) => Arc::new(JsonLocaleTranslator::new(directory)),
            None => {
                tracing::debug!(target: "cli", "No locale directory configured, texts stay empty");
                Arc::new(StaticTranslator::new())
            }
        }
    }

    /// The runner starting the real game.
    #[must_use]
    pub fn runner(&self) -> ProcessGameRunner {
        ProcessGameRunner::new(self.config.process_timeout())
    }
}

impl Cli {
    /// Set up logging, load the configuration and run the command.
    pub async fn execute(self) -> Result<()> {
        init_logging(self.verbose, self.quiet);

        let config = ExportConfig::load(self.config.as_deref()).await?;
        let context = CommandContext {
            config,
            show_progress: !self.no_progress,
        };

        match self.command {
            Commands::UpdateList(cmd) => cmd.execute(&context).await,
            Commands::List(cmd) => cmd.execute(&context).await,
            Commands::ListMissing(cmd) => cmd.execute(&context).await,
            Commands::GenerateDumpInfo(cmd) => cmd.execute(&context).await,
            Commands::Export(cmd) => cmd.execute(&context).await,
            Commands::ExportStep(cmd) => cmd.execute(&context).await,
        }
    }
}

/// The log filter for the given flags, unless `RUST_LOG` is set.
fn default_filter(verbose: bool, quiet: bool) -> &'static str {
    if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    }
}

/// Initialize the global tracing subscriber writing to stderr.
fn init_logging(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose, quiet)));

    // a subscriber may already be installed, e.g. when running inside tests
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["fie", "export", "bobplates", "--verbose", "--no-progress"]).unwrap();
        assert!(cli.verbose);
        assert!(cli.no_progress);
        assert!(matches!(cli.command, Commands::Export(_)));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["fie", "-v", "-q", "list"]).is_err());
    }

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(false, false), "info");
        assert_eq!(default_filter(true, false), "debug");
        assert_eq!(default_filter(false, true), "warn");
    }

    #[test]
    fn test_export_step_arguments() {
        let cli = Cli::try_parse_from(["fie", "export-step", "bobplates", "2"]).unwrap();
        let Commands::ExportStep(cmd) = cli.command else {
            panic!("expected export-step");
        };
        assert_eq!(cmd.mod_name, "bobplates");
        assert_eq!(cmd.step, 2);

        assert!(Cli::try_parse_from(["fie", "export-step", "bobplates", "two"]).is_err());
    }
}
