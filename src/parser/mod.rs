//! Transformation of a [`Dump`] into normalized export entities.
//!
//! Parsers run in three global phases. Every parser finishes a phase before
//! any parser starts the next one:
//!
//! 1. `prepare`: load auxiliary state, e.g. the translations of the loaded
//!    mods or the icon lookup table
//! 2. `parse`: create the entities, querying the icon lookup table through
//!    [`ParseContext::icon_hash`]
//! 3. `validate`: second pass cleanup once all entities exist, e.g. dropping
//!    icons nobody referenced
//!
//! Entities are collected in the [`ParseContext`]. Only after the last phase
//! does the [`ParserManager`] store them in the scratch registry of the
//! combination and fill its hash lists.

mod icon;
mod item;
mod machine;
mod mods;
mod recipe;
mod translation;

pub use icon::IconParser;
pub use item::ItemParser;
pub use machine::{MachineParser, normalize_energy_usage};
pub use mods::{ModMetadata, ModParser};
pub use recipe::RecipeParser;
pub use translation::TranslationParser;

use anyhow::Result;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::dump::Dump;
use crate::entity::{Combination, EntityKind, ExportEntity, Icon, Item, Machine, Recipe};
use crate::registry::EntityRegistry;
use crate::translator::{LocaleCatalog, Translator};

/// One step of the parser pipeline.
pub trait Parser: Send + Sync {
    /// Load auxiliary state before any parser parses.
    fn prepare(&self, _dump: &Dump, _context: &mut ParseContext) -> Result<()> {
        Ok(())
    }

    /// Create the entities of this parser.
    fn parse(&self, dump: &Dump, combination: &mut Combination, context: &mut ParseContext) -> Result<()>;

    /// Clean up after all parsers have parsed.
    fn validate(&self, _combination: &mut Combination, _context: &mut ParseContext) -> Result<()> {
        Ok(())
    }
}

/// State shared by the parsers of one combination.
#[derive(Debug, Default)]
pub struct ParseContext {
    /// Translations of all loaded mods
    pub catalog: LocaleCatalog,
    /// Icons by content hash
    pub icons: BTreeMap<String, Icon>,
    icon_lookup: HashMap<(String, String), String>,
    used_icon_hashes: HashSet<String>,
    /// Items and fluids
    pub items: Vec<Item>,
    /// Crafting machines
    pub machines: Vec<Machine>,
    /// Recipes of both modes, without duplicates
    pub recipes: Vec<Recipe>,
    /// Metadata of the loaded mods
    pub mods: Vec<ModMetadata>,
}

impl ParseContext {
    /// Register the icon hash for a name within a namespace.
    ///
    /// Returns `false` without changing anything if the name is already taken.
    pub fn register_icon(&mut self, namespace: &str, name: &str, hash: &str) -> bool {
        let key = (namespace.to_string(), name.to_string());
        if self.icon_lookup.contains_key(&key) {
            return false;
        }
        self.icon_lookup.insert(key, hash.to_string());
        true
    }

    /// The hash of the icon of `name` in `namespace`, empty if there is none.
    ///
    /// Every returned icon counts as used and survives the validation of the
    /// icon parser.
    pub fn icon_hash(&mut self, namespace: &str, name: &str) -> String {
        match self.icon_lookup.get(&(namespace.to_string(), name.to_string())) {
            Some(hash) => {
                self.used_icon_hashes.insert(hash.clone());
                hash.clone()
            }
            None => String::new(),
        }
    }

    /// Whether an icon hash was requested by any parser.
    #[must_use]
    pub fn is_icon_used(&self, hash: &str) -> bool {
        self.used_icon_hashes.contains(hash)
    }
}

/// Result of parsing one dump.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    /// Metadata of the loaded mods, to be applied by the orchestrator
    pub mods: Vec<ModMetadata>,
}

/// Runs all parsers over a dump.
pub struct ParserManager {
    parsers: Vec<Box<dyn Parser>>,
}

impl ParserManager {
    /// The default pipeline of all parsers.
    #[must_use]
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self::with_parsers(vec![
            Box::new(TranslationParser::new(translator)),
            Box::new(IconParser),
            Box::new(ModParser),
            Box::new(ItemParser),
            Box::new(MachineParser),
            Box::new(RecipeParser),
        ])
    }

    /// A pipeline of custom parsers.
    #[must_use]
    pub fn with_parsers(parsers: Vec<Box<dyn Parser>>) -> Self {
        Self {
            parsers,
        }
    }

    /// Parse `dump` into `combination`, storing the entities in `scratch`.
    pub fn parse(
        &self,
        dump: &Dump,
        combination: &mut Combination,
        scratch: &EntityRegistry,
    ) -> Result<ParseOutcome> {
        let mut context = ParseContext::default();

        for parser in &self.parsers {
            parser.prepare(dump, &mut context)?;
        }
        for parser in &self.parsers {
            parser.parse(dump, combination, &mut context)?;
        }
        for parser in &self.parsers {
            parser.validate(combination, &mut context)?;
        }

        let ParseContext {
            icons,
            items,
            machines,
            recipes,
            mods,
            ..
        } = context;

        let entities = icons
            .into_values()
            .map(ExportEntity::from)
            .chain(items.into_iter().map(ExportEntity::from))
            .chain(machines.into_iter().map(ExportEntity::from))
            .chain(recipes.into_iter().map(ExportEntity::from));

        for kind in EntityKind::ALL {
            combination.hashes_mut(kind).clear();
        }
        for entity in entities {
            let kind = entity.kind();
            let hash = scratch.set(entity)?;
            let hashes = combination.hashes_mut(kind);
            if !hashes.contains(&hash) {
                hashes.push(hash);
            }
        }

        tracing::debug!(
            target: "parser",
            "Parsed {}: {} icons, {} items, {} machines, {} recipes",
            combination.name,
            combination.icon_hashes.len(),
            combination.item_hashes.len(),
            combination.machine_hashes.len(),
            combination.recipe_hashes.len()
        );

        Ok(ParseOutcome {
            mods,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{MemoryRegistry, Registry, fetch_entity};
    use crate::translator::StaticTranslator;

    fn translator() -> Arc<dyn Translator> {
        Arc::new(
            StaticTranslator::new()
                .with_text("base", "en", "item-name.coal", "Coal")
                .with_text("base", "de", "item-name.coal", "Kohle")
                .with_text("base", "en", "item-description.coal", "Burns well")
                .with_text("base", "en", "fluid-name.water", "Water")
                .with_text("base", "en", "item-name.assembler", "Assembler")
                .with_text("base", "en", "entity-name.assembler", "Assembler")
                .with_text("base", "en", "recipe-name.coal", "Make coal")
                .with_text("bobplates", "en", "mod-name.bobplates", "Bob's plates"),
        )
    }

    fn combination() -> Combination {
        let mut combination = Combination::new("bobplates", Vec::new());
        combination.loaded_mod_names = vec!["bobplates".to_string(), "base".to_string()];
        combination
    }

    #[test]
    fn test_full_pipeline() {
        let scratch = MemoryRegistry::<ExportEntity>::new();
        let mut combination = combination();
        let manager = ParserManager::new(translator());

        let outcome = manager.parse(&test_dump::dump(), &mut combination, &scratch).unwrap();

        assert_eq!(combination.loaded_mod_names, vec!["base", "bobplates"]);
        assert_eq!(combination.item_hashes.len(), 3);
        assert_eq!(combination.machine_hashes.len(), 1);
        // coal dedupes to one entry, assembler differs between the modes
        assert_eq!(combination.recipe_hashes.len(), 3);
        // coal, water, assembler machine, assembler item and the mod thumbnail
        assert_eq!(combination.icon_hashes.len(), 5);

        for hash in &combination.recipe_hashes {
            assert!(fetch_entity(&scratch, EntityKind::Recipe, hash).is_ok());
        }

        let bobplates = outcome.mods.iter().find(|m| m.name == "bobplates").unwrap();
        assert_eq!(bobplates.titles["en"], "Bob's plates");
        assert!(!bobplates.thumbnail_hash.is_empty());
    }

    #[test]
    fn test_reparse_replaces_hash_lists() {
        let scratch = MemoryRegistry::<ExportEntity>::new();
        let mut combination = combination();
        let manager = ParserManager::new(translator());

        manager.parse(&test_dump::dump(), &mut combination, &scratch).unwrap();
        let first = combination.clone();
        manager.parse(&test_dump::dump(), &mut combination, &scratch).unwrap();

        assert_eq!(first, combination);
        assert_eq!(scratch.len(), first.icon_hashes.len() + 3 + 1 + 3);
        assert!(scratch.get(&first.item_hashes[0]).unwrap().is_some());
    }
}
