//! Resolution of Factorio localised strings.
//!
//! A localised string is either a plain text or an array whose first element
//! is a locale key and whose remaining elements are parameters, substituted
//! for `__1__`, `__2__` and so on. The empty key concatenates its parameters.
//!
//! ```rust
//! use factorio_export::translator::LocaleCatalog;
//! use serde_json::json;
//!
//! let mut catalog = LocaleCatalog::default();
//! catalog.add("en", "item-name.foo", "Foo __1__");
//! catalog.add("en", "item-name.bar", "Bar");
//!
//! let value = json!(["item-name.foo", ["item-name.bar"]]);
//! assert_eq!(catalog.resolve(&value, "en").as_deref(), Some("Foo Bar"));
//! ```

mod json_locale;

pub use json_locale::JsonLocaleTranslator;

use anyhow::Result;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::constants::DEFAULT_LOCALE;
use crate::entity::Translations;

/// Loads the locale texts of a set of mods.
pub trait Translator: Send + Sync {
    /// Load the texts of all given mods. Later mods override earlier ones.
    fn load_from_mod_names(&self, mod_names: &[String]) -> Result<LocaleCatalog>;
}

/// Locale texts keyed by locale and key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocaleCatalog {
    locales: BTreeMap<String, HashMap<String, String>>,
}

impl LocaleCatalog {
    /// Add a single text.
    pub fn add(&mut self, locale: &str, key: &str, text: impl Into<String>) {
        self.locales.entry(locale.to_string()).or_default().insert(key.to_string(), text.into());
    }

    /// Add all texts of `other`, overriding existing keys.
    pub fn merge(&mut self, other: Self) {
        for (locale, texts) in other.locales {
            self.locales.entry(locale).or_default().extend(texts);
        }
    }

    /// The known locales, always including the default locale.
    #[must_use]
    pub fn locales(&self) -> BTreeSet<&str> {
        let mut locales: BTreeSet<&str> = self.locales.keys().map(String::as_str).collect();
        locales.insert(DEFAULT_LOCALE);
        locales
    }

    /// Resolve a localised string for one locale.
    ///
    /// Returns `None` if any referenced key is unknown in that locale.
    #[must_use]
    pub fn resolve(&self, value: &Value, locale: &str) -> Option<String> {
        match value {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            Value::Array(elements) => {
                let (key, parameters) = elements.split_first()?;
                let key = key.as_str()?;
                let parameters = parameters
                    .iter()
                    .map(|parameter| self.resolve(parameter, locale))
                    .collect::<Option<Vec<_>>>()?;

                if key.is_empty() {
                    return Some(parameters.concat());
                }

                let template = self.locales.get(locale)?.get(key)?;
                let mut text = template.clone();
                for (index, parameter) in parameters.iter().enumerate() {
                    text = text.replace(&format!("__{}__", index + 1), parameter);
                }
                Some(text)
            }
            Value::Null | Value::Object(_) => None,
        }
    }

    /// Resolve a top level value. Plain texts only belong to the default locale.
    fn resolve_top(&self, value: &Value, locale: &str) -> Option<String> {
        let text = match value {
            Value::String(_) if locale != DEFAULT_LOCALE => None,
            _ => self.resolve(value, locale),
        };
        text.filter(|text| !text.trim().is_empty())
    }

    /// Fill `target` with the texts of `primary`, falling back to `fallback`
    /// per locale. Locales resolving to neither stay absent.
    pub fn add_translations_to_entity(
        &self,
        target: &mut Translations,
        entity_type: &str,
        primary: &Value,
        fallback: Option<&Value>,
    ) {
        for locale in self.locales() {
            let text = self
                .resolve_top(primary, locale)
                .or_else(|| fallback.and_then(|fallback| self.resolve_top(fallback, locale)));

            if let Some(text) = text {
                target.insert(locale.to_string(), text);
            }
        }

        if target.is_empty() && !primary.is_null() {
            tracing::trace!(target: "parser", "No translation for {entity_type} {primary}");
        }
    }
}

/// Translator serving fixed tables per mod.
#[derive(Debug, Clone, Default)]
pub struct StaticTranslator {
    mods: HashMap<String, LocaleCatalog>,
}

impl StaticTranslator {
    /// Create an empty translator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text belonging to the given mod.
    #[must_use]
    pub fn with_text(mut self, mod_name: &str, locale: &str, key: &str, text: &str) -> Self {
        self.mods.entry(mod_name.to_string()).or_default().add(locale, key, text);
        self
    }
}

impl Translator for StaticTranslator {
    fn load_from_mod_names(&self, mod_names: &[String]) -> Result<LocaleCatalog> {
        let mut catalog = LocaleCatalog::default();
        for name in mod_names {
            if let Some(texts) = self.mods.get(name) {
                catalog.merge(texts.clone());
            }
        }
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> LocaleCatalog {
        let translator = StaticTranslator::new()
            .with_text("base", "en", "item-name.coal", "Coal")
            .with_text("base", "de", "item-name.coal", "Kohle")
            .with_text("base", "en", "entity-name.furnace", "Furnace")
            .with_text("base", "en", "recipe-name.fill", "Fill __1__ barrel")
            .with_text("mod", "en", "item-name.coal", "Better coal");
        translator.load_from_mod_names(&["base".to_string(), "mod".to_string()]).unwrap()
    }

    #[test]
    fn test_later_mods_override() {
        let catalog = catalog();
        assert_eq!(catalog.resolve(&json!(["item-name.coal"]), "en").as_deref(), Some("Better coal"));
        assert_eq!(catalog.resolve(&json!(["item-name.coal"]), "de").as_deref(), Some("Kohle"));
    }

    #[test]
    fn test_parameters_and_concatenation() {
        let catalog = catalog();
        let value = json!(["recipe-name.fill", ["item-name.coal"]]);
        assert_eq!(catalog.resolve(&value, "en").as_deref(), Some("Fill Better coal barrel"));

        let value = json!(["", ["item-name.coal"], " & ", 42]);
        assert_eq!(catalog.resolve(&value, "en").as_deref(), Some("Better coal & 42"));

        assert!(catalog.resolve(&json!(["unknown.key"]), "en").is_none());
        assert_eq!(catalog.resolve(&value, "de").as_deref(), Some("Kohle & 42"));
        assert!(catalog.resolve(&json!(["recipe-name.fill", "x"]), "de").is_none());
    }

    #[test]
    fn test_fallback_per_locale() {
        let catalog = catalog();
        let mut labels = Translations::new();
        catalog.add_translations_to_entity(
            &mut labels,
            "item",
            &json!(["entity-name.furnace"]),
            Some(&json!(["item-name.coal"])),
        );

        assert_eq!(labels["en"], "Furnace");
        assert_eq!(labels["de"], "Kohle");
    }

    #[test]
    fn test_plain_text_belongs_to_default_locale() {
        let catalog = catalog();
        let mut labels = Translations::new();
        catalog.add_translations_to_entity(&mut labels, "item", &json!("Literal"), None);

        assert_eq!(labels.len(), 1);
        assert_eq!(labels["en"], "Literal");
    }

    #[test]
    fn test_unresolved_stays_empty() {
        let catalog = catalog();
        let mut labels = Translations::new();
        catalog.add_translations_to_entity(&mut labels, "item", &Value::Null, None);
        assert!(labels.is_empty());
    }
}
