use criterion::Criterion;

use genheap::memory_manager;
use genheap::{HeapState, ObjectReference};

use super::bench_heap;

/// A linked list of `len` young objects, rooted at its head.
fn young_list(heap: &mut HeapState, class: genheap::ClassId, len: usize) -> Vec<Option<ObjectReference>> {
    let mut roots: Vec<Option<ObjectReference>> = vec![None];
    for _ in 0..len {
        let object = memory_manager::alloc(heap, &mut roots, class);
        memory_manager::object_reference_write(heap, object, 0, roots[0]);
        roots[0] = Some(object);
    }
    roots
}

pub fn bench(c: &mut Criterion) {
    let (mut heap, class) = bench_heap(1 << 20);

    c.bench_function("minor_gc_1000_survivors", |b| {
        b.iter(|| {
            let mut roots = young_list(&mut heap, class, 1000);
            memory_manager::collect_young(&mut heap, &mut roots);
        })
    });

    c.bench_function("full_gc", |b| {
        let mut roots = young_list(&mut heap, class, 1000);
        b.iter(|| memory_manager::collect(&mut heap, &mut roots))
    });
}
