//! Mod dependency resolution.
//!
//! Two concerns live here:
//!
//! - [`DependencyResolver`] computes the closure of a set of mods over their
//!   mandatory (and optionally their optional) dependencies, ordered so that
//!   every mod comes after its dependencies.
//! - [`ModOrderCalculator`] assigns the global load `order` to every mod of
//!   the registry, the way the game itself orders mods.
//!
//! Both build a [`petgraph`] graph of the involved mods and derive the
//! order from it, using the declared mod order and the name as priority
//! among mods which could load at the same time.

mod dependency_resolver;
mod graph;
mod mod_order;

pub use dependency_resolver::DependencyResolver;
pub use mod_order::ModOrderCalculator;
