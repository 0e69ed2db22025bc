use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;

use super::{LocaleCatalog, Translator};

/// Translator reading one `<mod>.json` file per mod from a directory.
///
/// Each file maps locales to their texts: `{"en": {"item-name.coal": "Coal"}}`.
/// Mods without a file simply contribute no texts.
#[derive(Debug, Clone)]
pub struct JsonLocaleTranslator {
    locale_directory: PathBuf,
}

impl JsonLocaleTranslator {
    /// Create a translator reading from `locale_directory`.
    pub fn new(locale_directory: impl Into<PathBuf>) -> Self {
        Self {
            locale_directory: locale_directory.into(),
        }
    }
}

impl Translator for JsonLocaleTranslator {
    fn load_from_mod_names(&self, mod_names: &[String]) -> Result<LocaleCatalog> {
        let mut catalog = LocaleCatalog::default();

        for name in mod_names {
            let path = self.locale_directory.join(format!("{name}.json"));
            if !path.is_file() {
                continue;
            }

            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read locale file {}", path.display()))?;
            let locales: HashMap<String, HashMap<String, String>> = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse locale file {}", path.display()))?;

            for (locale, texts) in locales {
                for (key, text) in texts {
                    catalog.add(&locale, &key, text);
                }
            }
        }

        Ok(catalog)
    }
}
