//! Utilities used by the spaces and the collectors.

/// Address and object reference types.
pub mod address;
/// Allocation primitives and the out-of-memory path.
pub mod alloc;
/// Constants used in the crate.
pub mod constants;
/// Calculation, conversion and rounding for memory related numbers.
pub mod conversions;
/// Finalization support.
pub mod finalizable_processor;
/// The object header.
pub mod header;
/// Heap layout and usage reports.
pub mod heap;
/// Iterate over the objects of a bump region.
pub mod linear_scan;
/// Logger initialization
pub mod logger;
/// Wrapping functions for raw memory operations.
pub mod memory;
/// Heap options, settable programmatically or by environment variables.
pub mod options;
#[cfg(feature = "extreme_assertions")]
pub(crate) mod sanity;
/// Counters of the collections.
pub mod statistics;
#[cfg(test)]
pub mod test_util;
/// Weak reference support.
pub mod weak_processor;

pub use self::address::Address;
pub use self::address::ObjectReference;
