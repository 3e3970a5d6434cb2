//! The generational collector.
//!
//! The heap is split into a young generation, collected by copying, and an old generation
//! collected by marking. Generally the plan consists of a few parts:
//! * The spaces and the policies that decide where an object is allocated and when a
//!   collection escalates ([`generational::global`]).
//! * The write barrier that records old-to-young references ([`generational::barrier`]).
//! * The work of a minor and of a major collection ([`generational::gc_work`] and
//!   [`generational::full_heap`]).

mod global;
pub mod generational;
pub mod tracing;

pub use self::global::AllocationSemantics;
