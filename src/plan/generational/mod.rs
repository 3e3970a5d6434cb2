//! Generational plan: a copying young generation in front of a free-list old generation.

use enum_map::Enum;
use strum_macros::Display;

pub mod barrier;
pub mod full_heap;
pub mod gc_work;
pub mod global;
pub mod nursery;
pub mod remset;

pub use self::global::{Gen, ObjectPosition};

/// The kind of a collection.
#[derive(Copy, Clone, Debug, Display, Enum, PartialEq, Eq)]
pub enum CollectionKind {
    /// Evacuate the young generation only.
    Minor,
    /// Trace the whole heap and reclaim the old generation.
    Major,
}
