//! Orchestration of a whole export run.
//!
//! The [`Exporter`] is the single writer of mod-level records. Game instances
//! only produce combination-scoped data, which the exporter reduces against
//! the already persisted parents and then stores:
//!
//! ```text
//! CombinationCreator ─► FactorioManager ─► ReducerManager ─► storage
//!        ▲                                                      │
//!        └──────────── combination history of the mod ◄─────────┘
//! ```
//!
//! Step `n` of a mod exports every combination loading `n` of its optional
//! mods. The children of step `n` are derived from the combinations stored
//! by step `n - 1`, so the steps must run in sequence.

mod missing;
mod mod_list;

pub use missing::{MissingDependency, list_missing};
pub use mod_list::{ModListChanges, update_mod_list};

use anyhow::Result;
use std::sync::Arc;

use crate::combination::CombinationCreator;
use crate::config::ExportConfig;
use crate::factorio::{ExportedCombination, FactorioManager, GameRunner};
use crate::reducer::ReducerManager;
use crate::registry::{ExportStorage, fetch_combination};
use crate::translator::Translator;
use crate::utils::ProgressBar;

/// Outcome of one export step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepSummary {
    /// Number of optional mods loaded by the combinations of the step
    pub step: usize,
    /// Combinations handed to the game instances
    pub requested: usize,
    /// Combinations exported and stored
    pub exported: usize,
}

/// Outcome of exporting all steps of a mod.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// The exported mod
    pub mod_name: String,
    /// One entry per step, in order
    pub steps: Vec<StepSummary>,
    /// Names of the combinations dropped for not adding any data
    pub pruned: Vec<String>,
}

impl ExportSummary {
    /// Number of combinations stored over all steps.
    #[must_use]
    pub fn exported(&self) -> usize {
        self.steps.iter().map(|step| step.exported).sum()
    }

    /// Number of combinations which could not be exported.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.steps.iter().map(|step| step.requested - step.exported).sum()
    }
}

/// Exports mods combination by combination.
pub struct Exporter<R> {
    storage: ExportStorage,
    manager: FactorioManager<R>,
    reducer: ReducerManager,
    show_progress: bool,
}

impl<R: GameRunner> Exporter<R> {
    /// Create an exporter writing to `storage`.
    pub fn new(
        config: &ExportConfig,
        storage: ExportStorage,
        runner: R,
        translator: Arc<dyn Translator>,
    ) -> Self {
        let manager = FactorioManager::new(config, runner, storage.mods.clone(), translator);
        Self {
            storage,
            manager,
            reducer: ReducerManager::new(),
            show_progress: true,
        }
    }

    /// Show or hide the progress bars.
    #[must_use]
    pub const fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// The storage the exporter writes to.
    #[must_use]
    pub const fn storage(&self) -> &ExportStorage {
        &self.storage
    }

    /// Export all combinations of a mod, step by step.
    ///
    /// Once all steps are done, combinations other than the base combination
    /// which ended up without any data are dropped, and the game instances
    /// are torn down.
    pub async fn export_mod(&self, mod_name: &str) -> Result<ExportSummary> {
        let mods = self.storage.mods.as_ref();
        let mut creator = CombinationCreator::new(mods, self.storage.combinations.as_ref());
        creator.setup_for_mod(mod_name)?;
        let number_of_steps = creator.number_of_optional_mods()?;

        tracing::info!(
            target: "export",
            "Exporting {} with {} optional mod(s)",
            mod_name,
            number_of_steps
        );

        let mut summary = ExportSummary {
            mod_name: mod_name.to_string(),
            ..ExportSummary::default()
        };
        for step in 0..=number_of_steps {
            let step_summary = self.run_step(&creator, mod_name, step).await?;
            if step > 0 && step_summary.requested == 0 {
                tracing::debug!(target: "export", "Step {} of {} has nothing to export", step, mod_name);
            }
            summary.steps.push(step_summary);
        }

        summary.pruned = self.prune_empty_combinations(mod_name)?;
        self.manager.tear_down().await?;

        tracing::info!(
            target: "export",
            "Exported {}: {} combination(s) stored, {} failed, {} pruned",
            mod_name,
            summary.exported(),
            summary.failed(),
            summary.pruned.len()
        );
        Ok(summary)
    }

    /// Export a single step of a mod.
    ///
    /// The combinations of all earlier steps must have been exported already.
    pub async fn export_step(&self, mod_name: &str, step: usize) -> Result<StepSummary> {
        let mods = self.storage.mods.as_ref();
        let mut creator = CombinationCreator::new(mods, self.storage.combinations.as_ref());
        creator.setup_for_mod(mod_name)?;
        self.run_step(&creator, mod_name, step).await
    }

    /// Remove the working directories of the game instances.
    pub async fn tear_down(&self) -> Result<()> {
        self.manager.tear_down().await
    }

    async fn run_step(
        &self,
        creator: &CombinationCreator<'_>,
        mod_name: &str,
        step: usize,
    ) -> Result<StepSummary> {
        let requested: Vec<_> =
            creator.create_combinations_with_number_of_optional_mods(step)?.into_values().collect();
        let mut summary = StepSummary {
            step,
            requested: requested.len(),
            exported: 0,
        };
        if requested.is_empty() {
            return Ok(summary);
        }

        tracing::info!(
            target: "export",
            "Step {} of {}: {} combination(s)",
            step,
            mod_name,
            requested.len()
        );

        let progress = ProgressBar::new(requested.len() as u64, self.show_progress);
        let exported = self.manager.export_combinations(requested, &progress).await;
        progress.finish();

        for combination in exported? {
            self.store(mod_name, combination)?;
            summary.exported += 1;
        }
        self.storage.mods.save_mods()?;
        Ok(summary)
    }

    /// Reduce an exported combination and persist it along with its mod metadata.
    fn store(&self, mod_name: &str, exported: ExportedCombination) -> Result<()> {
        let ExportedCombination {
            mut combination,
            entities,
            mods: metadata,
        } = exported;
        let mods = self.storage.mods.as_ref();
        let combinations = self.storage.combinations.as_ref();

        self.reducer.reduce(
            &mut combination,
            mods,
            combinations,
            &entities,
            self.storage.entities.as_ref(),
        )?;
        let id = combinations.set(combination.clone())?;

        for data in &metadata {
            if let Some(mut mod_) = mods.get(&data.name) {
                data.apply_to(&mut mod_);
                mods.set(mod_);
            }
        }

        let mut main = mods.require(mod_name)?;
        if !main.combination_hashes.contains(&id) {
            main.combination_hashes.push(id);
            mods.set(main);
        }

        tracing::debug!(
            target: "export",
            "Stored {}: {} icons, {} items, {} machines, {} recipes",
            combination.name,
            combination.icon_hashes.len(),
            combination.item_hashes.len(),
            combination.machine_hashes.len(),
            combination.recipe_hashes.len()
        );
        Ok(())
    }

    fn prune_empty_combinations(&self, mod_name: &str) -> Result<Vec<String>> {
        let mods = self.storage.mods.as_ref();
        let combinations = self.storage.combinations.as_ref();
        let mut main = mods.require(mod_name)?;

        let mut kept = Vec::with_capacity(main.combination_hashes.len());
        let mut pruned = Vec::new();
        for id in &main.combination_hashes {
            let combination = fetch_combination(combinations, id)?;
            if !combination.is_base() && combination.has_no_data() {
                combinations.remove(id)?;
                pruned.push(combination.name);
            } else {
                kept.push(id.clone());
            }
        }

        if !pruned.is_empty() {
            tracing::debug!(target: "export", "Pruning empty combinations [{}]", pruned.join(", "));
            main.combination_hashes = kept;
            mods.set(main);
            mods.save_mods()?;
        }
        Ok(pruned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ExportError;
    use crate::entity::{Combination, Dependency, EntityKind, Mod};
    use crate::registry::{Registry, fetch_entity};
    use crate::test_utils::TestInstallation;
    use crate::translator::StaticTranslator;
    use std::collections::HashSet;
    use std::path::Path;

    /// Emits one item per enabled mod, except for the silent ones.
    struct ScriptedRunner {
        silent: HashSet<String>,
    }

    impl ScriptedRunner {
        fn new(silent: &[&str]) -> Self {
            Self {
                silent: silent.iter().map(ToString::to_string).collect(),
            }
        }
    }

    impl GameRunner for ScriptedRunner {
        async fn run(&self, working_directory: &Path) -> Result<String> {
            let content = std::fs::read_to_string(working_directory.join("mods/mod-list.json"))?;
            let mod_list: serde_json::Value = serde_json::from_str(&content)?;
            let names: Vec<String> = mod_list["mods"]
                .as_array()
                .into_iter()
                .flatten()
                .filter_map(|entry| entry["name"].as_str().map(ToString::to_string))
                .collect();

            let mut output = String::new();
            for name in &names {
                output.push_str(&format!("   0.500 Checksum of {name}: 1\n"));
            }
            let items: Vec<serde_json::Value> = names
                .iter()
                .filter(|name| *name != "Dump" && !self.silent.contains(*name))
                .map(|name| serde_json::json!({"name": format!("{name}-plate")}))
                .collect();
            output.push_str(">>>DATA>>>{\"icons\": []}<<<DATA<<<\n");
            output.push_str(&format!(
                ">>>CONTROL>>>{}<<<CONTROL<<<\n",
                serde_json::json!({"items": items})
            ));
            Ok(output)
        }
    }

    fn storage() -> ExportStorage {
        let storage = ExportStorage::in_memory();
        let mods = storage.mods.as_ref();

        let mut base = Mod::new("base", "0.17.79");
        base.order = 1;
        mods.set(base);

        let mut bobplates = Mod::new("bobplates", "0.17.5");
        bobplates.add_dependency(Dependency::optional("FNEI", ""));
        bobplates.order = 3;
        mods.set(bobplates);

        let mut fnei = Mod::new("FNEI", "0.2.0");
        fnei.order = 2;
        mods.set(fnei);
        storage
    }

    fn exporter(installation: &TestInstallation, silent: &[&str]) -> Exporter<ScriptedRunner> {
        Exporter::new(
            &installation.config(),
            storage(),
            ScriptedRunner::new(silent),
            Arc::new(StaticTranslator::new()),
        )
        .with_progress(false)
    }

    fn item_names(storage: &ExportStorage, id: &str) -> Vec<String> {
        let combination = fetch_combination(storage.combinations.as_ref(), id).unwrap();
        combination
            .item_hashes
            .iter()
            .map(|hash| {
                let entity = fetch_entity(storage.entities.as_ref(), EntityKind::Item, hash).unwrap();
                entity.into_item().unwrap().name
            })
            .collect()
    }

    #[tokio::test]
    async fn test_export_mod_reduces_against_parents() {
        let installation = TestInstallation::new();
        let exporter = exporter(&installation, &[]);

        exporter.export_mod("base").await.unwrap();
        let summary = exporter.export_mod("bobplates").await.unwrap();

        assert_eq!(summary.steps.len(), 2);
        assert_eq!(summary.exported(), 2);
        assert_eq!(summary.failed(), 0);
        assert!(summary.pruned.is_empty());

        let storage = exporter.storage();
        let base = storage.mods.get("base").unwrap();
        assert_eq!(base.combination_hashes.len(), 1);
        assert_eq!(item_names(storage, &base.combination_hashes[0]), vec!["base-plate"]);

        let bobplates = storage.mods.get("bobplates").unwrap();
        assert_eq!(bobplates.combination_hashes.len(), 2);
        assert_eq!(item_names(storage, &bobplates.combination_hashes[0]), vec!["bobplates-plate"]);
        assert_eq!(item_names(storage, &bobplates.combination_hashes[1]), vec!["FNEI-plate"]);

        let child = fetch_combination(storage.combinations.as_ref(), &bobplates.combination_hashes[1]).unwrap();
        assert_eq!(child.name, "bobplates-FNEI");
        assert_eq!(child.loaded_mod_names, vec!["base", "FNEI", "bobplates"]);
        assert!(!installation.config().instances_directory.join("instance-1").exists());
    }

    #[tokio::test]
    async fn test_empty_combinations_are_pruned() {
        let installation = TestInstallation::new();
        let exporter = exporter(&installation, &["FNEI"]);

        exporter.export_mod("base").await.unwrap();
        let summary = exporter.export_mod("bobplates").await.unwrap();

        assert_eq!(summary.exported(), 2);
        assert_eq!(summary.pruned, vec!["bobplates-FNEI"]);

        let storage = exporter.storage();
        let bobplates = storage.mods.get("bobplates").unwrap();
        assert_eq!(bobplates.combination_hashes.len(), 1);
        let id = Combination::calculate_id("bobplates-FNEI");
        assert!(storage.combinations.get(&id).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_base_combination_is_kept() {
        let installation = TestInstallation::new();
        let exporter = exporter(&installation, &["base"]);

        let summary = exporter.export_mod("base").await.unwrap();
        assert!(summary.pruned.is_empty());
        assert_eq!(exporter.storage().mods.get("base").unwrap().combination_hashes.len(), 1);
    }

    #[tokio::test]
    async fn test_export_step_without_previous_step() {
        let installation = TestInstallation::new();
        let exporter = exporter(&installation, &[]);

        let summary = exporter.export_step("bobplates", 1).await.unwrap();
        assert_eq!(summary.requested, 0);
        assert_eq!(summary.exported, 0);
    }

    #[tokio::test]
    async fn test_unknown_mod() {
        let installation = TestInstallation::new();
        let exporter = exporter(&installation, &[]);

        let error = exporter.export_mod("nope").await.unwrap_err();
        assert!(error.downcast_ref::<ExportError>().is_some_and(ExportError::is_not_found));
    }
}
