// Not every test uses every class, so not all the code in this module will be used.
#![allow(dead_code)]

use crate::memory_manager;
use crate::util::constants::BYTES_IN_WORD;
use crate::util::ObjectReference;
use crate::vm::{ClassDescriptor, ClassId};
use crate::{HeapBuilder, HeapState};
use std::cell::Cell;

/// Size of an old generation node in the test heaps.
pub const NODE_SIZE: usize = 128;

thread_local! {
    static CLEANUPS: Cell<usize> = const { Cell::new(0) };
}

fn count_cleanup(_object: ObjectReference) {
    CLEANUPS.with(|c| c.set(c.get() + 1));
}

/// The number of cleanup hooks run on this thread so far.
pub fn cleanups() -> usize {
    CLEANUPS.with(|c| c.get())
}

/// The classes of the test heaps. Every class counts its cleanups.
pub struct TestClasses {
    /// One data word. 32 bytes.
    pub leaf: ClassId,
    /// One strong reference. 32 bytes.
    pub link: ClassId,
    /// A strong reference at 0, a data word at 8. 40 bytes.
    pub node: ClassId,
    /// Strong references at 0 and 8. 40 bytes.
    pub pair: ClassId,
    /// A strong reference at 0, a weak reference at 8. 40 bytes.
    pub weak: ClassId,
    /// A finalizable object with a strong reference at 0. 32 bytes.
    pub finalizable: ClassId,
    /// A data-only object larger than an old generation node.
    pub large: ClassId,
    /// Strong references at 0 and 8, an id word at 16. 48 bytes.
    pub tagged: ClassId,
}

pub const NODE_NEXT: usize = 0;
pub const NODE_DATA: usize = BYTES_IN_WORD;
pub const PAIR_LEFT: usize = 0;
pub const PAIR_RIGHT: usize = BYTES_IN_WORD;
pub const WEAK_STRONG: usize = 0;
pub const WEAK_REFERENT: usize = BYTES_IN_WORD;
pub const TAGGED_ID: usize = 2 * BYTES_IN_WORD;

impl TestClasses {
    pub fn register(heap: &mut HeapState) -> TestClasses {
        let mut register = |class: ClassDescriptor| {
            memory_manager::register_class(&mut *heap, class.with_cleanup(count_cleanup)).unwrap()
        };
        TestClasses {
            leaf: register(ClassDescriptor::new("Leaf", BYTES_IN_WORD)),
            link: register(ClassDescriptor::new("Link", BYTES_IN_WORD).with_fields(&[0])),
            node: register(ClassDescriptor::new("Node", 2 * BYTES_IN_WORD).with_fields(&[NODE_NEXT])),
            pair: register(
                ClassDescriptor::new("Pair", 2 * BYTES_IN_WORD).with_fields(&[PAIR_LEFT, PAIR_RIGHT]),
            ),
            weak: register(
                ClassDescriptor::new("WeakRef", 2 * BYTES_IN_WORD)
                    .with_fields(&[WEAK_STRONG])
                    .with_weak_fields(&[WEAK_REFERENT]),
            ),
            finalizable: register(
                ClassDescriptor::new("Finalizable", BYTES_IN_WORD)
                    .with_fields(&[0])
                    .with_finalizer(),
            ),
            large: register(ClassDescriptor::new("Large", 2 * NODE_SIZE)),
            tagged: register(
                ClassDescriptor::new("Tagged", 3 * BYTES_IN_WORD).with_fields(&[PAIR_LEFT, PAIR_RIGHT]),
            ),
        }
    }
}

/// A builder for a small heap with explicit space sizes, ignoring environment variables.
pub fn builder(eden_size: usize, survivor_size: usize, old_nodes: usize) -> HeapBuilder {
    let mut builder = HeapBuilder::new_no_env_vars();
    builder
        .set_young_sizes(eden_size, survivor_size)
        .set_node_size(NODE_SIZE)
        .set_old_size(old_nodes * NODE_SIZE);
    builder
}

/// Create a heap from the builder and register the test classes.
pub fn heap_with(builder: HeapBuilder) -> (HeapState, TestClasses) {
    let mut heap = memory_manager::heap_init_with_builder(builder).unwrap();
    let classes = TestClasses::register(&mut heap);
    (heap, classes)
}

/// A heap with room for a few hundred young objects.
pub fn default_heap() -> (HeapState, TestClasses) {
    heap_with(builder(16 * 1024, 4 * 1024, 512))
}
