// Random mutators checked against a model of the object graph.

use crate::memory_manager;
use crate::util::test_util::fixtures::*;
use crate::{AllocationSemantics, HeapState, MajorCollector, ObjectReference};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::{HashMap, HashSet};

const MAX_ROOTS: usize = 32;
const FIELDS: [usize; 2] = [PAIR_LEFT, PAIR_RIGHT];

/// The expected graph: every object is named by the id stored in it.
#[derive(Default)]
struct Model {
    root_ids: Vec<usize>,
    edges: HashMap<usize, [Option<usize>; 2]>,
}

fn id_of(heap: &HeapState, object: ObjectReference) -> usize {
    memory_manager::read_word(heap, object, TAGGED_ID)
}

/// Walk the heap from the roots and compare every reachable object with the model.
fn verify(heap: &HeapState, roots: &[Option<ObjectReference>], model: &Model) -> usize {
    let mut visited = HashSet::new();
    let mut stack: Vec<ObjectReference> = vec![];
    for (root, id) in roots.iter().zip(model.root_ids.iter()) {
        let object = root.unwrap();
        assert_eq!(id_of(heap, object), *id);
        stack.push(object);
    }
    while let Some(object) = stack.pop() {
        assert!(memory_manager::is_valid(heap, object.to_raw_address()), "{} is not valid", object);
        let id = id_of(heap, object);
        if !visited.insert(id) {
            continue;
        }
        for (field, expected) in FIELDS.iter().zip(model.edges[&id].iter()) {
            let child = memory_manager::object_reference_read(heap, object, *field);
            assert_eq!(child.map(|c| id_of(heap, c)), *expected, "field {} of object {}", field, id);
            stack.extend(child);
        }
    }
    visited.len()
}

fn run_random_mutator(collector: MajorCollector, seed: u64) {
    let mut builder = builder(2048, 512, 2048);
    builder.set_major_collector(collector).set_promotion_age(2);
    builder.options.stress_factor = 1024;
    builder.options.full_heap_every = 5;
    let (mut heap, c) = heap_with(builder);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut roots: Vec<Option<ObjectReference>> = vec![];
    let mut model = Model::default();

    for next_id in 0..1500 {
        match rng.random_range(0..100) {
            0..=49 => {
                let semantics = if rng.random_bool(0.1) {
                    AllocationSemantics::Mature
                } else {
                    AllocationSemantics::Default
                };
                let object = memory_manager::alloc_with_semantics(&mut heap, &mut roots, c.tagged, semantics);
                memory_manager::write_word(&heap, object, TAGGED_ID, next_id);
                roots.push(Some(object));
                model.root_ids.push(next_id);
                model.edges.insert(next_id, [None, None]);
            }
            50..=94 if !roots.is_empty() => {
                let src = rng.random_range(0..roots.len());
                let field = rng.random_range(0..FIELDS.len());
                let target = if rng.random_bool(0.8) {
                    Some(rng.random_range(0..roots.len()))
                } else {
                    None
                };
                memory_manager::object_reference_write(
                    &mut heap,
                    roots[src].unwrap(),
                    FIELDS[field],
                    target.and_then(|t| roots[t]),
                );
                let src_id = model.root_ids[src];
                let target_id = target.map(|t| model.root_ids[t]);
                model.edges.get_mut(&src_id).unwrap()[field] = target_id;
            }
            _ if !roots.is_empty() => {
                let victim = rng.random_range(0..roots.len());
                roots.swap_remove(victim);
                model.root_ids.swap_remove(victim);
            }
            _ => {}
        }
        if roots.len() > MAX_ROOTS {
            let victim = rng.random_range(0..roots.len());
            roots.swap_remove(victim);
            model.root_ids.swap_remove(victim);
        }
        if next_id % 250 == 0 {
            verify(&heap, &roots, &model);
        }
    }

    memory_manager::collect(&mut heap, &mut roots);
    let reachable = verify(&heap, &roots, &model);
    // Only reachable objects are left once both generations have been collected.
    let usage = memory_manager::heap_usage(&heap);
    assert_eq!(usage.objects(), reachable);
    assert_eq!(usage.space("eden").unwrap().objects, 0);

    let stats = memory_manager::statistics(&heap);
    assert!(stats.collections(crate::CollectionKind::Minor) > 0);
    assert!(stats.collections(crate::CollectionKind::Major) > 0);

    let before = cleanups();
    memory_manager::heap_destroy(heap);
    assert_eq!(cleanups() - before, reachable);
}

macro_rules! random_mutator_tests {
    ($($collector:ident),*) => {
        paste::paste! {
            $(
                #[test]
                fn [<random_mutator_ $collector:snake>]() {
                    for seed in 0..4 {
                        run_random_mutator(MajorCollector::$collector, seed);
                    }
                }
            )*
        }
    };
}

random_mutator_tests!(MarkSweep, MarkCompact);
