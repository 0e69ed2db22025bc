use semver::Version;
use serde::{Deserialize, Serialize};

use super::Translations;
use crate::constants::BASE_MOD_NAME;

/// A dependency of a mod onto another mod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Name of the required mod
    pub required_mod_name: String,
    /// Minimal version of the required mod, empty if any version will do
    #[serde(default)]
    pub required_version: String,
    /// `false` for optional dependencies (`?` in info.json)
    pub is_mandatory: bool,
}

impl Dependency {
    /// Create a mandatory dependency.
    pub fn mandatory(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            required_mod_name: name.into(),
            required_version: version.into(),
            is_mandatory: true,
        }
    }

    /// Create an optional dependency.
    pub fn optional(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            required_mod_name: name.into(),
            required_version: version.into(),
            is_mandatory: false,
        }
    }

    /// Parse a dependency string of an info.json.
    ///
    /// Supported prefixes are `?` and `(?)` for optional dependencies, `~` for
    /// mandatory dependencies without load order effect and `!` for
    /// incompatibilities. Incompatibilities are not dependencies, so `None` is
    /// returned for them.
    ///
    /// ```rust
    /// use factorio_export::entity::Dependency;
    ///
    /// let dependency = Dependency::parse("? bobplates >= 0.17.5").unwrap();
    /// assert_eq!(dependency.required_mod_name, "bobplates");
    /// assert_eq!(dependency.required_version, "0.17.5");
    /// assert!(!dependency.is_mandatory);
    /// assert!(Dependency::parse("! angelsrefining").is_none());
    /// ```
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let (is_mandatory, rest) = if let Some(rest) = value.strip_prefix("(?)") {
            (false, rest)
        } else if let Some(rest) = value.strip_prefix('?') {
            (false, rest)
        } else if let Some(rest) = value.strip_prefix('~') {
            (true, rest)
        } else if value.starts_with('!') {
            return None;
        } else {
            (true, value)
        };

        let rest = rest.trim();
        let (name, version) = match rest.find(['<', '>', '=']) {
            Some(position) => {
                let version = rest[position..].trim_start_matches(['<', '>', '=']).trim();
                (rest[..position].trim(), version)
            }
            None => (rest, ""),
        };

        if name.is_empty() {
            return None;
        }

        Some(Self {
            required_mod_name: name.to_string(),
            required_version: version.to_string(),
            is_mandatory,
        })
    }
}

/// A mod known to the exporter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Mod {
    /// Unique name of the mod
    pub name: String,
    /// File name of the mod inside the mods directory, empty for the base mod
    #[serde(default)]
    pub file_name: String,
    /// Version as declared in info.json
    pub version: String,
    /// Author as declared in info.json
    #[serde(default)]
    pub author: String,
    /// Localised titles
    #[serde(default)]
    pub titles: Translations,
    /// Localised descriptions
    #[serde(default)]
    pub descriptions: Translations,
    /// Dependencies, always including the base mod for every other mod
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    /// Global load order, lower loads first
    #[serde(default)]
    pub order: u32,
    /// Ids of the exported combinations with this mod as main mod
    #[serde(default)]
    pub combination_hashes: Vec<String>,
    /// Hash of the thumbnail icon
    #[serde(default)]
    pub thumbnail_hash: String,
}

impl Mod {
    /// Create a mod with an implicit dependency on the base mod.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        let name = name.into();
        let dependencies = if name == BASE_MOD_NAME {
            Vec::new()
        } else {
            vec![Dependency::mandatory(BASE_MOD_NAME, "")]
        };

        Self {
            name,
            version: version.into(),
            dependencies,
            ..Self::default()
        }
    }

    /// Add a dependency, replacing an earlier one onto the same mod.
    pub fn add_dependency(&mut self, dependency: Dependency) {
        self.dependencies.retain(|d| d.required_mod_name != dependency.required_mod_name);
        self.dependencies.push(dependency);
    }

    /// Dependencies of the requested strength.
    pub fn dependencies_where(&self, mandatory: bool) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter().filter(move |d| d.is_mandatory == mandatory)
    }

    /// The version parsed leniently, see [`parse_version`].
    #[must_use]
    pub fn parsed_version(&self) -> Option<Version> {
        parse_version(&self.version)
    }
}

/// Parse a Factorio version, padding missing components with zero.
///
/// Factorio versions look like semver but may omit components and carry
/// leading zeros (`0.17`, `1.01.2`).
#[must_use]
pub fn parse_version(value: &str) -> Option<Version> {
    let mut parts = value.trim().split('.').map(|part| part.trim().parse::<u64>());
    let major = parts.next()?.ok()?;
    let minor = parts.next().transpose().ok()?.unwrap_or(0);
    let patch = parts.next().transpose().ok()?.unwrap_or(0);
    Some(Version::new(major, minor, patch))
}
