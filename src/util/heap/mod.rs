//! Heap-wide layout and reporting.

pub mod inspection;
pub mod layout;

pub use self::inspection::{HeapUsage, SpaceUsage};
pub use self::layout::HeapLayout;
