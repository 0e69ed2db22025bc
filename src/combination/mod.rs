//! Combination lifecycle: creation of the power set of optional mods and
//! lookup of the parent combinations used by merge and reduce.
//!
//! A mod with `k` optional mods has `2^k` combinations. They are built
//! incrementally, one optional mod per export step: step 0 only contains the
//! base combination, step `n` derives every combination with `n` optional
//! mods from the persisted combinations of step `n - 1`.

mod creator;
mod parent_finder;

pub use creator::CombinationCreator;
pub use parent_finder::ParentCombinationFinder;
