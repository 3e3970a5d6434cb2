//! Allocation primitives shared by the spaces.

mod bumppointer;
pub use bumppointer::BumpPointer;

/// The type of an allocation failure that the heap could not recover from by collecting.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// The old generation has no free node left after a major collection.
    HeapOutOfMemory,
    /// The large object space budget is exhausted after a major collection.
    LargeObjectSpaceOutOfMemory,
    /// The operating system refused to map memory.
    MmapOutOfMemory,
}

/// The out-of-memory path. An allocation request cannot be satisfied even after a collection,
/// and the heap cannot grow, so the process aborts.
pub(crate) fn out_of_memory(err: AllocationError) -> ! {
    error!("Out of memory: {:?}", err);
    panic!("Out of memory: {:?}", err);
}
