//! Content hashing of export entities.
//!
//! Every entity is stored under a SHA-256 digest of its normalized fields.
//! Fields are fed into the digest explicitly and length-prefixed, so that the
//! hash never depends on serialization details and two different field
//! layouts can never collide by concatenation.

use sha2::{Digest, Sha256};

use super::Translations;

/// Incremental builder of a content hash.
///
/// # Examples
///
/// ```rust
/// use factorio_export::entity::HashCalculator;
///
/// let a = HashCalculator::new("item").text("item").text("iron-plate").finish();
/// let b = HashCalculator::new("item").text("itemiron").text("-plate").finish();
/// assert_ne!(a, b);
/// assert_eq!(a.len(), 64);
/// ```
pub struct HashCalculator {
    hasher: Sha256,
}

impl HashCalculator {
    /// Start a new hash for an entity of the given kind.
    #[must_use]
    pub fn new(kind: &str) -> Self {
        Self {
            hasher: Sha256::new(),
        }
        .text(kind)
    }

    /// Feed a string.
    #[must_use]
    pub fn text(mut self, value: &str) -> Self {
        self.hasher.update((value.len() as u64).to_le_bytes());
        self.hasher.update(value.as_bytes());
        self
    }

    /// Feed a list of strings, keeping their order.
    #[must_use]
    pub fn texts(self, values: &[String]) -> Self {
        values.iter().fold(self.integer(values.len() as u64), |calculator, value| {
            calculator.text(value)
        })
    }

    /// Feed an unsigned integer.
    #[must_use]
    pub fn integer(mut self, value: u64) -> Self {
        self.hasher.update(value.to_le_bytes());
        self
    }

    /// Feed a signed integer.
    #[must_use]
    pub fn signed(mut self, value: i64) -> Self {
        self.hasher.update(value.to_le_bytes());
        self
    }

    /// Feed a float. Negative zero hashes like zero.
    #[must_use]
    pub fn number(mut self, value: f64) -> Self {
        let value = if value == 0.0 { 0.0 } else { value };
        self.hasher.update(value.to_bits().to_le_bytes());
        self
    }

    /// Feed a boolean flag.
    #[must_use]
    pub fn flag(mut self, value: bool) -> Self {
        self.hasher.update([u8::from(value)]);
        self
    }

    /// Feed a translation map in locale order.
    #[must_use]
    pub fn translations(self, translations: &Translations) -> Self {
        translations.iter().fold(
            self.integer(translations.len() as u64),
            |calculator, (locale, value)| calculator.text(locale).text(value),
        )
    }

    /// Finish the hash as lowercase hex.
    #[must_use]
    pub fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        let first = HashCalculator::new("icon").number(1.5).integer(32).finish();
        let second = HashCalculator::new("icon").number(1.5).integer(32).finish();
        assert_eq!(first, second);
    }

    #[test]
    fn test_kind_is_part_of_hash() {
        let item = HashCalculator::new("item").text("coal").finish();
        let machine = HashCalculator::new("machine").text("coal").finish();
        assert_ne!(item, machine);
    }

    #[test]
    fn test_negative_zero() {
        let zero = HashCalculator::new("x").number(0.0).finish();
        let negative = HashCalculator::new("x").number(-0.0).finish();
        assert_eq!(zero, negative);
    }

    #[test]
    fn test_translation_order_independent_of_insertion() {
        let mut a = Translations::new();
        a.insert("en".to_string(), "Coal".to_string());
        a.insert("de".to_string(), "Kohle".to_string());
        let mut b = Translations::new();
        b.insert("de".to_string(), "Kohle".to_string());
        b.insert("en".to_string(), "Coal".to_string());

        assert_eq!(
            HashCalculator::new("item").translations(&a).finish(),
            HashCalculator::new("item").translations(&b).finish()
        );
    }
}
