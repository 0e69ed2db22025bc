//! Common test utilities for the integration tests
//!
//! A [`ScriptedRunner`] stands in for the game: it reads the mod list of the
//! prepared instance and prints a dump describing the enabled mods, so the
//! whole pipeline runs without a Factorio installation.

// not every test file uses every helper
#![allow(dead_code)]

use anyhow::{Context, Result};
use assert_cmd::Command;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::path::Path;

use factorio_export::config::CONFIG_ENV_VAR;
use factorio_export::factorio::GameRunner;
use factorio_export::test_utils::TestInstallation;

/// What the game reports for one mod.
#[derive(Debug, Clone, Default)]
pub struct ModScript {
    /// Item prototypes added by the mod
    pub items: Vec<Value>,
    /// Recipe prototypes added by the mod
    pub recipes: Vec<Value>,
    /// Machine prototypes added by the mod
    pub machines: Vec<Value>,
}

impl ModScript {
    /// A mod adding a single plain item.
    pub fn item(name: &str) -> Self {
        Self {
            items: vec![json!({"name": name})],
            ..Self::default()
        }
    }

    /// Add a recipe crafting one `product` from one `ingredient`.
    pub fn with_recipe(mut self, name: &str, ingredient: &str, product: &str, energy: f64) -> Self {
        self.recipes.push(json!({
            "name": name,
            "category": "crafting",
            "energy": energy,
            "ingredients": [{"type": "item", "name": ingredient, "amount": 1}],
            "products": [{"type": "item", "name": product, "amount": 1}],
        }));
        self
    }

    /// Add a crafting machine.
    pub fn with_machine(mut self, name: &str, crafting_speed: f64) -> Self {
        self.machines.push(json!({
            "name": name,
            "crafting_categories": ["crafting"],
            "crafting_speed": crafting_speed,
            "energy_usage": 75000.0,
        }));
        self
    }
}

/// Fake game printing the scripted prototypes of every enabled mod.
///
/// Prototypes of later mods replace those of earlier mods with the same
/// name, like data stage overrides in the real game.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRunner {
    scripts: BTreeMap<String, ModScript>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mod(mut self, name: &str, script: ModScript) -> Self {
        self.scripts.insert(name.to_string(), script);
        self
    }

    fn enabled_mods(working_directory: &Path) -> Result<Vec<String>> {
        let path = working_directory.join("mods").join("mod-list.json");
        let content = std::fs::read_to_string(&path).with_context(|| format!("Missing {}", path.display()))?;
        let mod_list: Value = serde_json::from_str(&content)?;
        Ok(mod_list["mods"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|entry| entry["name"].as_str().map(ToString::to_string))
            .collect())
    }
}

fn upsert(target: &mut Vec<Value>, values: &[Value]) {
    for value in values {
        target.retain(|existing| existing["name"] != value["name"]);
        target.push(value.clone());
    }
}

impl GameRunner for ScriptedRunner {
    async fn run(&self, working_directory: &Path) -> Result<String> {
        let mods = Self::enabled_mods(working_directory)?;

        let mut items = Vec::new();
        let mut recipes = Vec::new();
        let mut machines = Vec::new();
        let mut output = String::from("   0.000 2019-06-01 Factorio 0.17.79\n");
        for name in &mods {
            output.push_str(&format!("   0.500 Checksum of {name}: 42\n"));
            if let Some(script) = self.scripts.get(name) {
                upsert(&mut items, &script.items);
                upsert(&mut recipes, &script.recipes);
                upsert(&mut machines, &script.machines);
            }
        }

        let control = json!({
            "items": items,
            "machines": machines,
            "normal_recipes": recipes,
        });
        output.push_str(">>>DATA>>>{\"icons\": []}<<<DATA<<<\n");
        output.push_str(&format!(">>>CONTROL>>>{control}<<<CONTROL<<<\n"));
        Ok(output)
    }
}

/// An installation with `base`, `bobplates` (optional on `FNEI`) and `FNEI`.
pub fn bob_installation() -> TestInstallation {
    let installation = TestInstallation::new();
    installation.write_base("0.17.79");
    installation.write_mod("bobplates", "0.17.5", &["base >= 0.17", "? FNEI"]);
    installation.write_mod("FNEI", "0.2.1", &["base"]);
    installation
}

/// The `fie` binary configured for `installation`.
pub fn fie_command(installation: &TestInstallation) -> Command {
    let config = installation.write_config();
    let mut cmd = Command::cargo_bin("fie").expect("fie binary");
    cmd.env_remove(CONFIG_ENV_VAR)
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(config)
        .arg("--no-progress");
    cmd
}
