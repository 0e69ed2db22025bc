use anyhow::{Context, Result};
use std::sync::Arc;

use super::{ParseContext, Parser};
use crate::dump::Dump;
use crate::entity::Combination;
use crate::translator::Translator;

/// Loads the translations of all mods loaded by the dump.
pub struct TranslationParser {
    translator: Arc<dyn Translator>,
}

impl TranslationParser {
    /// Create the parser around a translator.
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self {
            translator,
        }
    }
}

impl Parser for TranslationParser {
    fn prepare(&self, dump: &Dump, context: &mut ParseContext) -> Result<()> {
        context.catalog = self
            .translator
            .load_from_mod_names(&dump.mod_names)
            .context("Failed to load translations")?;
        Ok(())
    }

    fn parse(&self, _dump: &Dump, _combination: &mut Combination, _context: &mut ParseContext) -> Result<()> {
        Ok(())
    }
}
