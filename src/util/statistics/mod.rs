//! Counters gathered by the heap: per collection, and totals since the heap was created.

pub mod counter;
pub mod stats;

pub use self::stats::{GcStats, Stats};
