use std::sync::Arc;

use factorio_export::entity::{Combination, EntityKind, Item, Recipe};
use factorio_export::export::{Exporter, update_mod_list};
use factorio_export::factorio::ModFileReader;
use factorio_export::reducer::ReducerManager;
use factorio_export::registry::{
    EntityRegistry, ExportStorage, ModRegistry, OverlayRegistry, fetch_combination, fetch_entity,
};
use factorio_export::test_utils::{TestInstallation, init_test_logging};
use factorio_export::translator::StaticTranslator;

use crate::common::{ModScript, ScriptedRunner, bob_installation};

fn runner() -> ScriptedRunner {
    ScriptedRunner::new()
        .with_mod(
            "base",
            ModScript::item("iron-plate")
                .with_recipe("iron-plate", "iron-ore", "iron-plate", 3.2)
                .with_machine("assembling-machine-1", 0.5),
        )
        .with_mod(
            "bobplates",
            ModScript::item("tin-plate").with_recipe("iron-plate", "iron-ore", "iron-plate", 1.6),
        )
}

fn open_storage(installation: &TestInstallation) -> ExportStorage {
    let config = installation.config();
    let storage = ExportStorage::open(&config.data_directory).unwrap();
    let reader = ModFileReader::new(&config.factorio_directory, &config.mods_directory);
    update_mod_list(storage.mods.as_ref(), &reader).unwrap();
    storage
}

fn items(registry: &EntityRegistry, combination: &Combination) -> Vec<Item> {
    combination
        .item_hashes
        .iter()
        .map(|hash| fetch_entity(registry, EntityKind::Item, hash).unwrap().into_item().unwrap())
        .collect()
}

fn recipes(registry: &EntityRegistry, combination: &Combination) -> Vec<Recipe> {
    combination
        .recipe_hashes
        .iter()
        .map(|hash| fetch_entity(registry, EntityKind::Recipe, hash).unwrap().into_recipe().unwrap())
        .collect()
}

fn combinations_of(storage: &ExportStorage, mod_name: &str) -> Vec<Combination> {
    storage
        .mods
        .get(mod_name)
        .unwrap()
        .combination_hashes
        .iter()
        .map(|id| fetch_combination(storage.combinations.as_ref(), id).unwrap())
        .collect()
}

#[tokio::test]
async fn test_export_reduces_and_prunes() {
    init_test_logging(None);
    let installation = bob_installation();
    let exporter = Exporter::new(
        &installation.config(),
        open_storage(&installation),
        runner(),
        Arc::new(StaticTranslator::new()),
    )
    .with_progress(false);

    let base = exporter.export_mod("base").await.unwrap();
    assert_eq!(base.exported(), 1);

    // FNEI adds nothing, but a base combination is always kept
    let fnei = exporter.export_mod("FNEI").await.unwrap();
    assert_eq!(fnei.exported(), 1);
    assert!(fnei.pruned.is_empty());

    let bobplates = exporter.export_mod("bobplates").await.unwrap();
    assert_eq!(bobplates.steps.len(), 2);
    assert_eq!(bobplates.exported(), 2);
    assert_eq!(bobplates.pruned, vec!["bobplates-FNEI"]);

    let storage = exporter.storage();
    let entities = storage.entities.as_ref();

    let fnei_combinations = combinations_of(storage, "FNEI");
    assert_eq!(fnei_combinations.len(), 1);
    assert!(fnei_combinations[0].has_no_data());

    let bob_combinations = combinations_of(storage, "bobplates");
    assert_eq!(bob_combinations.len(), 1);
    let bob = &bob_combinations[0];
    assert_eq!(bob.name, "bobplates");
    assert_eq!(bob.loaded_mod_names, vec!["base", "bobplates"]);

    let bob_items: Vec<String> = items(entities, bob).into_iter().map(|item| item.name).collect();
    assert_eq!(bob_items, vec!["tin-plate"]);
    assert!(bob.machine_hashes.is_empty());

    let bob_recipes = recipes(entities, bob);
    assert_eq!(bob_recipes.len(), 1);
    assert_eq!(bob_recipes[0].name, "iron-plate");
    assert_eq!(bob_recipes[0].data.crafting_time, 1.6);
}

#[tokio::test]
async fn test_merging_parents_restores_full_data() {
    let installation = bob_installation();
    let exporter = Exporter::new(
        &installation.config(),
        open_storage(&installation),
        runner(),
        Arc::new(StaticTranslator::new()),
    )
    .with_progress(false);

    exporter.export_mod("base").await.unwrap();
    exporter.export_mod("bobplates").await.unwrap();

    let storage = exporter.storage();
    let mut chain = combinations_of(storage, "base");
    chain.extend(combinations_of(storage, "bobplates"));

    let overlay = OverlayRegistry::new(storage.entities.as_ref());
    let merged = ReducerManager::new().merge_parents(&chain, &overlay).unwrap();

    let mut item_names: Vec<String> = items(&overlay, &merged).into_iter().map(|item| item.name).collect();
    item_names.sort();
    assert_eq!(item_names, vec!["iron-plate", "tin-plate"]);
    assert_eq!(merged.machine_hashes.len(), 1);

    let merged_recipes = recipes(&overlay, &merged);
    assert_eq!(merged_recipes.len(), 1);
    assert_eq!(merged_recipes[0].data.crafting_time, 1.6);
    assert_eq!(merged_recipes[0].data.ingredients[0].name, "iron-ore");
}

#[tokio::test]
async fn test_export_survives_reopening_the_store() {
    let installation = bob_installation();
    let config = installation.config();
    {
        let exporter =
            Exporter::new(&config, open_storage(&installation), runner(), Arc::new(StaticTranslator::new()))
                .with_progress(false);
        exporter.export_mod("base").await.unwrap();
    }

    let reopened = ExportStorage::open(&config.data_directory).unwrap();
    let base = combinations_of(&reopened, "base");
    assert_eq!(base.len(), 1);

    let base_items: Vec<String> =
        items(reopened.entities.as_ref(), &base[0]).into_iter().map(|item| item.name).collect();
    assert_eq!(base_items, vec!["iron-plate"]);

    // a second run of the same step keeps a single history entry
    let exporter = Exporter::new(&config, reopened, runner(), Arc::new(StaticTranslator::new()))
        .with_progress(false);
    exporter.export_step("base", 0).await.unwrap();
    assert_eq!(exporter.storage().mods.get("base").unwrap().combination_hashes.len(), 1);
}
