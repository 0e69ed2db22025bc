use anyhow::Result;
use serde_json::json;

use super::{ParseContext, Parser};
use crate::constants::DUMP_MOD_NAME;
use crate::dump::Dump;
use crate::entity::{Combination, Mod, Translations};

/// Metadata of a mod as seen by the game.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModMetadata {
    /// Name of the mod
    pub name: String,
    /// Localised titles
    pub titles: Translations,
    /// Localised descriptions
    pub descriptions: Translations,
    /// Hash of the thumbnail icon, empty if the mod has none
    pub thumbnail_hash: String,
}

impl ModMetadata {
    /// Copy the non-empty values onto the registry record of the mod.
    pub fn apply_to(&self, mod_: &mut Mod) {
        if !self.titles.is_empty() {
            mod_.titles = self.titles.clone();
        }
        if !self.descriptions.is_empty() {
            mod_.descriptions = self.descriptions.clone();
        }
        if !self.thumbnail_hash.is_empty() {
            mod_.thumbnail_hash = self.thumbnail_hash.clone();
        }
    }
}

/// Applies the load order detected by the game and collects mod metadata.
pub struct ModParser;

impl ModParser {
    /// Order the loaded mods of the combination as the game loaded them.
    ///
    /// Mods the game reported but the combination does not load are ignored,
    /// loaded mods the game did not report keep their place at the end.
    fn apply_load_order(dump: &Dump, combination: &mut Combination) {
        let mut ordered: Vec<String> =
            dump.mod_names.iter().filter(|name| combination.loads(name)).cloned().collect();
        for name in &combination.loaded_mod_names {
            if !ordered.contains(name) {
                ordered.push(name.clone());
            }
        }
        combination.loaded_mod_names = ordered;
    }
}

impl Parser for ModParser {
    fn parse(&self, dump: &Dump, combination: &mut Combination, context: &mut ParseContext) -> Result<()> {
        Self::apply_load_order(dump, combination);

        for name in &combination.loaded_mod_names {
            if name == DUMP_MOD_NAME {
                continue;
            }

            let mut metadata = ModMetadata {
                name: name.clone(),
                ..ModMetadata::default()
            };
            context.catalog.add_translations_to_entity(
                &mut metadata.titles,
                "mod",
                &json!([format!("mod-name.{name}")]),
                None,
            );
            context.catalog.add_translations_to_entity(
                &mut metadata.descriptions,
                "mod",
                &json!([format!("mod-description.{name}")]),
                None,
            );
            metadata.thumbnail_hash = context.icon_hash("mod", name);
            context.mods.push(metadata);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::test_dump;

    #[test]
    fn test_load_order_from_dump() {
        let dump = test_dump::dump();
        let mut combination = Combination::new("bobplates", Vec::new());
        combination.loaded_mod_names =
            vec!["bobplates".to_string(), "extra".to_string(), "base".to_string()];

        let mut context = ParseContext::default();
        ModParser.parse(&dump, &mut combination, &mut context).unwrap();

        assert_eq!(combination.loaded_mod_names, vec!["base", "bobplates", "extra"]);
        assert_eq!(context.mods.len(), 3);
    }

    #[test]
    fn test_apply_keeps_existing_values() {
        let mut mod_ = Mod::new("bobplates", "0.17.5");
        mod_.titles.insert("en".to_string(), "Bob's plates".to_string());

        let metadata = ModMetadata {
            name: "bobplates".to_string(),
            thumbnail_hash: "abc".to_string(),
            ..ModMetadata::default()
        };
        metadata.apply_to(&mut mod_);

        assert_eq!(mod_.titles["en"], "Bob's plates");
        assert_eq!(mod_.thumbnail_hash, "abc");
    }
}
