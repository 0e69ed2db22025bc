//! Normalized export entities.
//!
//! The exporter produces four content-addressed entity kinds ([`Icon`],
//! [`Item`], [`Machine`], [`Recipe`]) plus the [`Combination`] and [`Mod`]
//! records which reference them. Two identities are kept strictly apart:
//!
//! - the **content hash** ([`ExportEntity::content_hash`]): a pure function of
//!   the normalized fields, used as the storage key. A changed entity is a new
//!   entity with a new hash.
//! - the **business identifier** ([`ExportEntity::identifier`]): the
//!   domain key (type and name of an item, mode and name of a recipe) used to
//!   match an entity against its counterpart in a parent combination.
//!
//! Entities are stored as the closed [`ExportEntity`] union. Code which needs
//! one specific kind converts with [`ExportEntity::into_item`] and friends,
//! which turn a kind mismatch into [`ExportError::EntityKindMismatch`].

mod combination;
mod hash;
mod icon;
mod item;
mod machine;
mod mods;
mod recipe;

pub use combination::Combination;
pub use hash::HashCalculator;
pub use icon::{Color, Icon, Layer};
pub use item::Item;
pub use machine::{Machine, MachineData};
pub use mods::{Dependency, Mod, parse_version};
pub use recipe::{Ingredient, MODE_EXPENSIVE, MODE_NORMAL, Product, Recipe, RecipeData};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::core::ExportError;

/// Localised texts of an entity, keyed by locale.
pub type Translations = BTreeMap<String, String>;

/// The kinds of content-addressed entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Icons, atomic and deduplicated by content only
    Icon,
    /// Items and fluids
    Item,
    /// Crafting machines
    Machine,
    /// Recipes in normal or expensive mode
    Recipe,
}

impl EntityKind {
    /// All kinds in the order they appear on a combination.
    pub const ALL: [Self; 4] = [Self::Icon, Self::Item, Self::Machine, Self::Recipe];
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Icon => write!(f, "icon"),
            Self::Item => write!(f, "item"),
            Self::Machine => write!(f, "machine"),
            Self::Recipe => write!(f, "recipe"),
        }
    }
}

/// Any content-addressed entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "entity", rename_all = "lowercase")]
pub enum ExportEntity {
    /// An icon
    Icon(Icon),
    /// An item or fluid
    Item(Item),
    /// A crafting machine
    Machine(Machine),
    /// A recipe
    Recipe(Recipe),
}

impl ExportEntity {
    /// The kind of the wrapped entity.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Icon(_) => EntityKind::Icon,
            Self::Item(_) => EntityKind::Item,
            Self::Machine(_) => EntityKind::Machine,
            Self::Recipe(_) => EntityKind::Recipe,
        }
    }

    /// The content hash of the wrapped entity.
    #[must_use]
    pub fn content_hash(&self) -> String {
        match self {
            Self::Icon(icon) => icon.content_hash(),
            Self::Item(item) => item.content_hash(),
            Self::Machine(machine) => machine.content_hash(),
            Self::Recipe(recipe) => recipe.content_hash(),
        }
    }

    /// The business identifier, `None` for icons which have no business identity.
    #[must_use]
    pub fn identifier(&self) -> Option<String> {
        match self {
            Self::Icon(_) => None,
            Self::Item(item) => Some(item.identifier()),
            Self::Machine(machine) => Some(machine.identifier()),
            Self::Recipe(recipe) => Some(recipe.identifier()),
        }
    }

    fn mismatch(&self, expected: EntityKind) -> ExportError {
        ExportError::EntityKindMismatch {
            hash: self.content_hash(),
            expected: expected.to_string(),
            actual: self.kind().to_string(),
        }
    }

    /// Unwrap an icon.
    pub fn into_icon(self) -> Result<Icon, ExportError> {
        match self {
            Self::Icon(icon) => Ok(icon),
            other => Err(other.mismatch(EntityKind::Icon)),
        }
    }

    /// Unwrap an item.
    pub fn into_item(self) -> Result<Item, ExportError> {
        match self {
            Self::Item(item) => Ok(item),
            other => Err(other.mismatch(EntityKind::Item)),
        }
    }

    /// Unwrap a machine.
    pub fn into_machine(self) -> Result<Machine, ExportError> {
        match self {
            Self::Machine(machine) => Ok(machine),
            other => Err(other.mismatch(EntityKind::Machine)),
        }
    }

    /// Unwrap a recipe.
    pub fn into_recipe(self) -> Result<Recipe, ExportError> {
        match self {
            Self::Recipe(recipe) => Ok(recipe),
            other => Err(other.mismatch(EntityKind::Recipe)),
        }
    }

    /// Check that the entity is of the expected kind.
    pub fn expect_kind(self, expected: EntityKind) -> Result<Self, ExportError> {
        if self.kind() == expected {
            Ok(self)
        } else {
            Err(self.mismatch(expected))
        }
    }
}

impl From<Icon> for ExportEntity {
    fn from(icon: Icon) -> Self {
        Self::Icon(icon)
    }
}

impl From<Item> for ExportEntity {
    fn from(item: Item) -> Self {
        Self::Item(item)
    }
}

impl From<Machine> for ExportEntity {
    fn from(machine: Machine) -> Self {
        Self::Machine(machine)
    }
}

impl From<Recipe> for ExportEntity {
    fn from(recipe: Recipe) -> Self {
        Self::Recipe(recipe)
    }
}

/// Entities with a business identifier, matched across combinations by merge and reduce.
pub trait IdentifiedEntity: Clone + Into<ExportEntity> {
    /// The kind of the entity.
    const KIND: EntityKind;

    /// The business identifier.
    fn identifier(&self) -> String;

    /// Unwrap the entity from the union.
    fn from_entity(entity: ExportEntity) -> Result<Self, ExportError>;
}

impl IdentifiedEntity for Item {
    const KIND: EntityKind = EntityKind::Item;

    fn identifier(&self) -> String {
        Item::identifier(self)
    }

    fn from_entity(entity: ExportEntity) -> Result<Self, ExportError> {
        entity.into_item()
    }
}

impl IdentifiedEntity for Machine {
    const KIND: EntityKind = EntityKind::Machine;

    fn identifier(&self) -> String {
        Machine::identifier(self)
    }

    fn from_entity(entity: ExportEntity) -> Result<Self, ExportError> {
        entity.into_machine()
    }
}

impl IdentifiedEntity for Recipe {
    const KIND: EntityKind = EntityKind::Recipe;

    fn identifier(&self) -> String {
        Recipe::identifier(self)
    }

    fn from_entity(entity: ExportEntity) -> Result<Self, ExportError> {
        entity.into_recipe()
    }
}

/// Round a value to three decimal places, the precision of all exported numbers.
#[must_use]
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
