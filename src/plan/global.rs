use enum_map::Enum;
use strum_macros::Display;

/// Allocation semantics that the heap provides.
/// Each allocation request requires a desired semantic for the object to allocate.
#[repr(i32)]
#[derive(Clone, Copy, Debug, Display, Enum, PartialEq, Eq, Default)]
pub enum AllocationSemantics {
    /// The default semantic. The object is allocated in eden, unless it is larger than the large
    /// object threshold (large object space) or than eden itself (old generation).
    #[default]
    Default = 0,
    /// The object is allocated directly in the old generation. It is not moved by minor
    /// collections, and is only reclaimed by a major collection.
    Mature = 1,
    /// Large objects. They are allocated with page granularity and will not be moved.
    Los = 2,
}
