//! Factorio item export
//!
//! Exports the items, fluids, recipes, crafting machines and icons of Factorio
//! mods into a deduplicated, content-addressed data store.
//!
//! # Architecture Overview
//!
//! A mod is never exported alone. Every subset of its optional dependencies
//! forms a *combination*, and each combination is loaded into a real game
//! process which dumps its data. To keep the store small, every combination
//! only keeps what differs from its already exported ancestors:
//!
//! 1. [`combination`] creates the combinations of a mod step by step
//! 2. [`factorio`] runs the game for each combination on a pool of instances
//! 3. [`dump`] extracts the raw data from the game output
//! 4. [`parser`] turns it into normalized [`entity`] values
//! 5. [`reducer`] strips everything the merged parents ([`merger`]) already provide
//! 6. [`registry`] stores the remaining entities by their content hash
//!
//! [`export`] ties these steps together, [`cli`] exposes them as the `fie`
//! binary.
//!
//! # Core Modules
//!
//! - [`core`] - Error types and user facing error display
//! - [`config`] - Configuration file loading
//! - [`entity`] - Icons, items, machines, recipes, mods and combinations
//! - [`registry`] - Content-addressed storage and the mod registry
//! - [`resolver`] - Dependency closures and the global load order
//! - [`translator`] - Resolution of localised strings
//!
//! # Example
//!
//! ```rust,no_run
//! use factorio_export::config::ExportConfig;
//! use factorio_export::export::Exporter;
//! use factorio_export::factorio::ProcessGameRunner;
//! use factorio_export::registry::ExportStorage;
//! use factorio_export::translator::StaticTranslator;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ExportConfig::load(None).await?;
//! let storage = ExportStorage::open(&config.data_directory)?;
//! let runner = ProcessGameRunner::new(config.process_timeout());
//!
//! let exporter = Exporter::new(&config, storage, runner, Arc::new(StaticTranslator::new()));
//! let summary = exporter.export_mod("bobplates").await?;
//! println!("{} combinations exported", summary.exported());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;

pub mod entity;
pub mod registry;
pub mod resolver;

pub mod combination;
pub mod dump;
pub mod parser;
pub mod translator;

pub mod merger;
pub mod reducer;

pub mod export;
pub mod factorio;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
