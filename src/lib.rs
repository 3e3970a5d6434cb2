//! genheap is a generational moving garbage collector.
//!
//! New objects are allocated in the young generation (eden) and evacuated by Cheney-style
//! copying into a survivor space. Objects that survive enough minor collections, or that do not
//! fit in the survivor space, are promoted into the old generation, a space of fixed size nodes
//! collected by mark-sweep or by mark-compact. A write barrier keeps a remembered set of the old
//! objects that refer to young objects, so that a minor collection never scans the old
//! generation.
//!
//! The mutator is single threaded, and every collection is stop-the-world on the mutator's
//! thread. All the functions the mutator uses are in [`memory_manager`]:
//!
//! * create a heap with [`memory_manager::heap_init`] or [`memory_manager::heap_init_with_builder`];
//! * describe object layouts with [`ClassDescriptor`] and [`memory_manager::register_class`];
//! * allocate with [`memory_manager::alloc`], passing the roots of the mutator;
//! * store references with [`memory_manager::object_reference_write`].

#[macro_use]
extern crate log;
#[cfg(test)]
#[macro_use]
extern crate lazy_static;

mod heap_state;
pub mod memory_manager;
pub mod plan;
pub mod policy;
pub mod util;
pub mod vm;

#[cfg(test)]
mod tests;

pub use crate::heap_state::{HeapBuilder, HeapInitError, HeapState};
pub use crate::plan::generational::{CollectionKind, ObjectPosition};
pub use crate::plan::AllocationSemantics;
pub use crate::util::heap::{HeapUsage, SpaceUsage};
pub use crate::util::options::MajorCollector;
pub use crate::util::{Address, ObjectReference};
pub use crate::vm::{
    ClassDescriptor, ClassError, ClassId, FinalizerCallback, FinalizerError, RootHandle, RootSet,
    RootTable,
};
