pub mod alloc;
pub mod collect;

pub use criterion::Criterion;

use genheap::{ClassDescriptor, ClassId, HeapBuilder, HeapState};

pub fn bench(c: &mut Criterion) {
    alloc::bench(c);
    collect::bench(c);
}

/// A heap for benchmarks, with a class of two references and one data word.
pub fn bench_heap(eden_size: usize) -> (HeapState, ClassId) {
    let mut builder = HeapBuilder::new_no_env_vars();
    builder
        .set_young_sizes(eden_size, eden_size / 4)
        .set_old_size(64 << 20);
    let mut heap = genheap::memory_manager::heap_init_with_builder(builder).unwrap();
    let class = genheap::memory_manager::register_class(
        &mut heap,
        ClassDescriptor::new("Pair", 24).with_fields(&[0, 8]),
    )
    .unwrap();
    (heap, class)
}
