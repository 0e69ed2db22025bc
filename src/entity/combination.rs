use serde::{Deserialize, Serialize};

use super::{EntityKind, HashCalculator};

/// A set of mods loaded together, with the data exported from them.
///
/// The identity of a combination only depends on its main mod and the set of
/// loaded optional mods. The four hash lists are filled by the parsers and
/// later shrunk by the reducers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Combination {
    /// Identity derived from the name
    pub id: String,
    /// `{main}-{optional mods sorted by name}`
    pub name: String,
    /// The mod the combination belongs to
    pub main_mod_name: String,
    /// All loaded mods in load order
    pub loaded_mod_names: Vec<String>,
    /// The loaded optional mods, the combinatorial dimension
    pub loaded_optional_mod_names: Vec<String>,
    /// Hashes of the icons
    #[serde(default)]
    pub icon_hashes: Vec<String>,
    /// Hashes of the items
    #[serde(default)]
    pub item_hashes: Vec<String>,
    /// Hashes of the machines
    #[serde(default)]
    pub machine_hashes: Vec<String>,
    /// Hashes of the recipes
    #[serde(default)]
    pub recipe_hashes: Vec<String>,
}

impl Combination {
    /// Create a combination without any loaded mods or data yet.
    pub fn new(main_mod_name: impl Into<String>, optional_mod_names: Vec<String>) -> Self {
        let main_mod_name = main_mod_name.into();
        let name = Self::build_name(&main_mod_name, &optional_mod_names);

        Self {
            id: Self::calculate_id(&name),
            name,
            main_mod_name,
            loaded_mod_names: Vec::new(),
            loaded_optional_mod_names: optional_mod_names,
            ..Self::default()
        }
    }

    /// The deterministic name of a combination.
    ///
    /// ```rust
    /// use factorio_export::entity::Combination;
    ///
    /// let optional = vec!["FNEI".to_string(), "angelsrefining".to_string()];
    /// assert_eq!(Combination::build_name("bobplates", &optional), "bobplates-FNEI-angelsrefining");
    /// assert_eq!(Combination::build_name("bobplates", &[]), "bobplates");
    /// ```
    #[must_use]
    pub fn build_name(main_mod_name: &str, optional_mod_names: &[String]) -> String {
        let mut sorted = optional_mod_names.to_vec();
        sorted.sort();
        std::iter::once(main_mod_name.to_string()).chain(sorted).collect::<Vec<_>>().join("-")
    }

    /// The id for a combination name.
    #[must_use]
    pub fn calculate_id(name: &str) -> String {
        HashCalculator::new("combination").text(name).finish()
    }

    /// The hash list of the given entity kind.
    #[must_use]
    pub fn hashes(&self, kind: EntityKind) -> &[String] {
        match kind {
            EntityKind::Icon => &self.icon_hashes,
            EntityKind::Item => &self.item_hashes,
            EntityKind::Machine => &self.machine_hashes,
            EntityKind::Recipe => &self.recipe_hashes,
        }
    }

    /// Mutable access to the hash list of the given entity kind.
    pub fn hashes_mut(&mut self, kind: EntityKind) -> &mut Vec<String> {
        match kind {
            EntityKind::Icon => &mut self.icon_hashes,
            EntityKind::Item => &mut self.item_hashes,
            EntityKind::Machine => &mut self.machine_hashes,
            EntityKind::Recipe => &mut self.recipe_hashes,
        }
    }

    /// Whether the combination has no data at all.
    #[must_use]
    pub fn has_no_data(&self) -> bool {
        EntityKind::ALL.iter().all(|kind| self.hashes(*kind).is_empty())
    }

    /// Whether this is the base combination of its mod.
    #[must_use]
    pub fn is_base(&self) -> bool {
        self.loaded_optional_mod_names.is_empty()
    }

    /// Whether the combination loads the given mod.
    #[must_use]
    pub fn loads(&self, mod_name: &str) -> bool {
        self.loaded_mod_names.iter().any(|name| name == mod_name)
    }
}
