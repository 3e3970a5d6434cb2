//! Memory policies that can be used for spaces.

/// This class defines and manages spaces.  Each policy is an instance
/// of a space.  A space is a region of virtual memory (contiguous or
/// discontigous) which is subject to the same memory management
/// regime.  Multiple spaces (instances of this class or its
/// descendants) may have the same policy (eg there could be numerous
/// instances of CopySpace, each with different roles).
pub mod space;

/// Copy space: bump allocation, objects are evacuated out of it.
pub mod copyspace;
/// Large object space: one mapping per object, never moved.
pub mod largeobjectspace;
/// Free-list node space, collected by mark-sweep or mark-compact.
pub mod marksweepspace;
