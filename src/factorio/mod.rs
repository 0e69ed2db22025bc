//! Driving the game to dump the data of combinations.
//!
//! The [`FactorioManager`] owns a pool of [`Instance`]s, each an isolated
//! working directory for one game process at a time. Combinations are
//! dispatched to idle instances with at most `number_of_instances` game
//! processes running concurrently. Every combination goes through:
//!
//! 1. [`Instance::prepare`]: set up the working directory for the loaded mods
//! 2. [`GameRunner::run`]: run the game and capture its output
//! 3. [`DumpExtractor::extract`]: cut the dump out of the output
//! 4. [`ParserManager::parse`]: turn the dump into entities
//!
//! A failure of the game process or of the dump is retried with a fixed
//! delay, up to `max_attempts` attempts. A combination failing for good is
//! logged and skipped, the batch continues. Fatal errors abort the batch.
//!
//! The entities of each combination are kept in their own scratch registry.
//! Nothing is written to the shared storage here; reducing and persisting is
//! up to the orchestrator.

mod dump_info;
mod instance;
mod mod_files;
mod runner;

pub use dump_info::{DumpInfoGenerator, has_dump_info};
pub use instance::{GAME_BINARY, Instance};
pub use mod_files::ModFileReader;
pub use runner::{GameRunner, ProcessGameRunner};

use anyhow::Result;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_retry::RetryIf;
use tokio_retry::strategy::FixedInterval;

use crate::config::ExportConfig;
use crate::core::ExportError;
use crate::dump::DumpExtractor;
use crate::entity::{Combination, ExportEntity};
use crate::parser::{ModMetadata, ParserManager};
use crate::registry::{MemoryRegistry, ModRegistry};
use crate::translator::Translator;
use crate::utils::ProgressBar;

/// The parsed data of one combination, not yet reduced.
pub struct ExportedCombination {
    /// The combination with its hash lists filled
    pub combination: Combination,
    /// All entities referenced by the combination
    pub entities: MemoryRegistry<ExportEntity>,
    /// Metadata of the loaded mods found in the dump
    pub mods: Vec<ModMetadata>,
}

fn export_error(error: &anyhow::Error) -> Option<&ExportError> {
    error.chain().find_map(|e| e.downcast_ref::<ExportError>())
}

fn is_retryable(error: &anyhow::Error) -> bool {
    export_error(error).is_some_and(ExportError::is_retryable)
}

fn is_fatal(error: &anyhow::Error) -> bool {
    export_error(error).is_some_and(ExportError::is_fatal)
}

/// Pool of game instances exporting combinations in parallel.
pub struct FactorioManager<R> {
    runner: R,
    mods: Arc<dyn ModRegistry>,
    parser: ParserManager,
    instances: Mutex<Vec<Instance>>,
    number_of_instances: usize,
    max_attempts: u32,
    retry_delay: Duration,
}

impl<R: GameRunner> FactorioManager<R> {
    /// Create the pool with the instances configured in `config`.
    pub fn new(
        config: &ExportConfig,
        runner: R,
        mods: Arc<dyn ModRegistry>,
        translator: Arc<dyn Translator>,
    ) -> Self {
        let number_of_instances = config.number_of_instances.max(1);
        let instances = (1..=number_of_instances).rev().map(|id| Instance::new(id, config)).collect();

        Self {
            runner,
            mods,
            parser: ParserManager::new(translator),
            instances: Mutex::new(instances),
            number_of_instances,
            max_attempts: config.max_attempts.max(1),
            retry_delay: config.retry_delay(),
        }
    }

    /// Export all `combinations`, returning those which succeeded sorted by name.
    pub async fn export_combinations(
        &self,
        combinations: Vec<Combination>,
        progress: &ProgressBar,
    ) -> Result<Vec<ExportedCombination>> {
        tracing::info!(
            target: "factorio",
            "Exporting {} combination(s) with {} instance(s)",
            combinations.len(),
            self.number_of_instances
        );

        let results: Vec<Result<Option<ExportedCombination>>> = stream::iter(combinations)
            .map(|combination| self.export_on_idle_instance(combination, progress))
            .buffer_unordered(self.number_of_instances)
            .collect()
            .await;

        let mut exported = Vec::with_capacity(results.len());
        for result in results {
            if let Some(combination) = result? {
                exported.push(combination);
            }
        }
        exported.sort_by(|a, b| a.combination.name.cmp(&b.combination.name));
        Ok(exported)
    }

    /// Remove the working directories of all instances.
    pub async fn tear_down(&self) -> Result<()> {
        for instance in self.instances.lock().await.iter() {
            instance.tear_down()?;
        }
        Ok(())
    }

    async fn export_on_idle_instance(
        &self,
        combination: Combination,
        progress: &ProgressBar,
    ) -> Result<Option<ExportedCombination>> {
        let instance = self
            .instances
            .lock()
            .await
            .pop()
            .ok_or_else(|| anyhow::anyhow!("No idle game instance left"))?;

        progress.set_message(combination.name.clone());
        let result = self.export_with_retry(&instance, &combination).await;
        self.instances.lock().await.push(instance);
        progress.inc();

        match result {
            Ok(exported) => Ok(Some(exported)),
            Err(e) if is_fatal(&e) => Err(e),
            Err(e) => {
                tracing::error!(target: "factorio", "Skipping combination {}: {:#}", combination.name, e);
                Ok(None)
            }
        }
    }

    async fn export_with_retry(
        &self,
        instance: &Instance,
        combination: &Combination,
    ) -> Result<ExportedCombination> {
        let retries = usize::try_from(self.max_attempts - 1).unwrap_or(usize::MAX);
        let strategy = FixedInterval::new(self.retry_delay).take(retries);

        let mut attempt = 0;
        RetryIf::spawn(
            strategy,
            move || {
                attempt += 1;
                self.export_once(instance, combination, attempt)
            },
            |error: &anyhow::Error| {
                let retry = is_retryable(error);
                if retry {
                    tracing::warn!(
                        target: "factorio",
                        "Export of {} failed, retrying: {:#}",
                        combination.name,
                        error
                    );
                }
                retry
            },
        )
        .await
    }

    async fn export_once(
        &self,
        instance: &Instance,
        combination: &Combination,
        attempt: u32,
    ) -> Result<ExportedCombination> {
        tracing::debug!(
            target: "factorio",
            "Exporting {} on instance {} (attempt {}/{})",
            combination.name,
            instance.id(),
            attempt,
            self.max_attempts
        );

        instance.prepare(combination, self.mods.as_ref())?;
        let output = self.runner.run(instance.directory()).await?;
        let dump = DumpExtractor::new().extract(&output)?;

        let mut combination = combination.clone();
        let entities = MemoryRegistry::new();
        let outcome = self.parser.parse(&dump, &mut combination, &entities)?;

        Ok(ExportedCombination {
            combination,
            entities,
            mods: outcome.mods,
        })
    }
}
