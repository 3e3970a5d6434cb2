use criterion::Criterion;

use genheap::memory_manager;
use genheap::{AllocationSemantics, ObjectReference};

use super::bench_heap;

pub fn bench(c: &mut Criterion) {
    let (mut heap, class) = bench_heap(4 << 20);
    let mut roots: Vec<Option<ObjectReference>> = vec![];

    // Nothing survives: each minor collection is almost free.
    c.bench_function("alloc", |b| {
        b.iter(|| memory_manager::alloc(&mut heap, &mut roots, class))
    });

    c.bench_function("alloc_mature", |b| {
        b.iter(|| {
            memory_manager::alloc_with_semantics(
                &mut heap,
                &mut roots,
                class,
                AllocationSemantics::Mature,
            )
        })
    });
}
