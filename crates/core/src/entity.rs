//! Records that keep their identity while their stock or cost changes.

use core::fmt::Display;
use core::hash::Hash;

/// Raw materials and finished items are entities: two records with the same
/// identifier are the same record, whatever their stock or cost says.
///
/// Identifiers are small `Copy` values so stores can key maps by them and log
/// them with `%`.
pub trait Entity {
    type Id: Copy + Ord + Hash + Display;

    fn id(&self) -> &Self::Id;
}
