//! The public API of the heap.
//!
//! A mutator creates a [`HeapState`] with [`heap_init`] or [`heap_init_with_builder`], registers
//! its classes, and then allocates and stores references only through the functions of this
//! module. Every function takes the heap explicitly; there is no global heap.
//!
//! Allocation is the only point where a collection may happen. The mutator passes its roots to
//! every allocation request, and a collection rewrites the root slots in place. Any reference the
//! mutator keeps outside its roots is invalid after an allocation.

use crate::heap_state::{HeapBuilder, HeapInitError, HeapState};
use crate::plan::generational::barrier::Barrier;
use crate::plan::generational::{CollectionKind, ObjectPosition};
use crate::plan::AllocationSemantics;
use crate::util::constants::{BYTES_IN_WORD, HEADER_BYTES};
use crate::util::header;
use crate::util::heap::HeapUsage;
use crate::util::statistics::Stats;
use crate::util::{Address, ObjectReference};
use crate::vm::{ClassDescriptor, ClassError, ClassId, FinalizerCallback, RootSet, SimpleSlot};

/// Initialize a heap of `heap_size` bytes. Other options are read from `GENHEAP_*` environment
/// variables.
///
/// Note that this method will attempt to initialize a logger. If the mutator would like to use
/// its own logger, it should initialize the logger before calling this method.
///
/// Arguments:
/// * `heap_size`: The total size of the young and old generations. The large object space has
///   its own budget (option `los_size`).
pub fn heap_init(heap_size: usize) -> Result<HeapState, HeapInitError> {
    let mut builder = HeapBuilder::new();
    builder.set_heap_size(heap_size);
    heap_init_with_builder(builder)
}

/// Initialize a heap from a builder.
///
/// Note that this method will attempt to initialize a logger. If the mutator would like to use
/// its own logger, it should initialize the logger before calling this method.
///
/// Arguments:
/// * `builder`: The heap builder, with its options set.
pub fn heap_init_with_builder(builder: HeapBuilder) -> Result<HeapState, HeapInitError> {
    match crate::util::logger::try_init() {
        Ok(_) => debug!("genheap initialized the logger."),
        Err(_) => debug!(
            "genheap failed to initialize the logger. Possibly a logger has been initialized by user."
        ),
    }
    builder.build()
}

/// Process a run-time option. Returns true if the option is set successfully.
///
/// Arguments:
/// * `builder`: The heap builder.
/// * `name`: The name of the option.
/// * `value`: The value of the option (as a string).
pub fn process(builder: &mut HeapBuilder, name: &str, value: &str) -> bool {
    builder.set_option(name, value)
}

/// Process multiple run-time options, separated by white space, such as
/// `"promotion_age=2 major_collector=MarkCompact"`. Returns true if all the options are
/// processed successfully.
///
/// Arguments:
/// * `builder`: The heap builder.
/// * `options`: The options.
pub fn process_bulk(builder: &mut HeapBuilder, options: &str) -> bool {
    let mut all_ok = true;
    for opt in options.split_ascii_whitespace() {
        match opt.split_once('=') {
            Some((name, value)) => all_ok &= process(builder, name, value),
            None => {
                warn!("Ignoring option {} without a value", opt);
                all_ok = false;
            }
        }
    }
    all_ok
}

/// Destroy a heap. The cleanup hook of every object still in the heap runs, and the memory of
/// every space is unmapped.
///
/// Arguments:
/// * `heap`: The heap to destroy.
pub fn heap_destroy(heap: HeapState) {
    heap.destroy();
}

/// Register a class. Instances of a class are allocated with the returned id.
///
/// Arguments:
/// * `heap`: A reference to the heap.
/// * `class`: The class descriptor.
pub fn register_class(heap: &mut HeapState, class: ClassDescriptor) -> Result<ClassId, ClassError> {
    heap.classes.register(class)
}

/// Allocate an instance of a class in the young generation (or in the old generation if it is
/// large). The payload of the new object is zeroed. A collection may happen before the
/// allocation, in which case the root slots are updated.
///
/// Arguments:
/// * `heap`: A reference to the heap.
/// * `roots`: Every reference the mutator holds.
/// * `class`: The class of the object.
pub fn alloc(heap: &mut HeapState, roots: &mut dyn RootSet, class: ClassId) -> ObjectReference {
    heap.alloc(roots, class, AllocationSemantics::Default)
}

/// Allocate an instance of a class with the given allocation semantics.
///
/// Arguments:
/// * `heap`: A reference to the heap.
/// * `roots`: Every reference the mutator holds.
/// * `class`: The class of the object.
/// * `semantics`: The allocation semantic required for the allocation.
pub fn alloc_with_semantics(
    heap: &mut HeapState,
    roots: &mut dyn RootSet,
    class: ClassId,
    semantics: AllocationSemantics,
) -> ObjectReference {
    heap.alloc(roots, class, semantics)
}

/// Store a reference into a reference field of an object, with the write barrier.
///
/// Arguments:
/// * `heap`: A reference to the heap.
/// * `src`: The modified object.
/// * `offset`: The payload offset of a strong or weak reference field of its class.
/// * `target`: The new value of the field.
pub fn object_reference_write(
    heap: &mut HeapState,
    src: ObjectReference,
    offset: usize,
    target: Option<ObjectReference>,
) {
    heap.write_reference(src, offset, target)
}

/// The write barrier alone, for a mutator that did the store itself.
///
/// Arguments:
/// * `heap`: A reference to the heap.
/// * `src`: The modified object.
/// * `target`: The value that was stored.
pub fn write_barrier(heap: &mut HeapState, src: ObjectReference, target: Option<ObjectReference>) {
    let slot = SimpleSlot::from_address(header::payload(src));
    heap.plan.object_reference_write_post(src, slot, target);
}

/// Load a reference field of an object.
///
/// Arguments:
/// * `heap`: A reference to the heap.
/// * `object`: The object.
/// * `offset`: The payload offset of a reference field of its class.
pub fn object_reference_read(
    heap: &HeapState,
    object: ObjectReference,
    offset: usize,
) -> Option<ObjectReference> {
    debug_assert!(heap.classes.class_of(object).is_reference_field(offset));
    SimpleSlot::from_address(header::payload(object) + offset).load()
}

/// Store a word into a non-reference field of an object. No barrier is needed.
pub fn write_word(heap: &HeapState, object: ObjectReference, offset: usize, value: usize) {
    debug_assert!(
        !heap.classes.class_of(object).is_reference_field(offset),
        "offset {} of {} is a reference field",
        offset,
        object
    );
    debug_assert!(offset + BYTES_IN_WORD <= header::object_size(object) - HEADER_BYTES);
    unsafe { (header::payload(object) + offset).store::<usize>(value) }
}

/// Load a word from a non-reference field of an object.
pub fn read_word(heap: &HeapState, object: ObjectReference, offset: usize) -> usize {
    debug_assert!(!heap.classes.class_of(object).is_reference_field(offset));
    unsafe { (header::payload(object) + offset).load::<usize>() }
}

/// Run a full heap collection: a major collection followed by a minor one.
///
/// Arguments:
/// * `heap`: A reference to the heap.
/// * `roots`: Every reference the mutator holds.
pub fn collect(heap: &mut HeapState, roots: &mut dyn RootSet) {
    heap.collect(roots, CollectionKind::Major, true)
}

/// Run a minor collection. It becomes a major collection if the old generation may not have room
/// for the promoted objects.
pub fn collect_young(heap: &mut HeapState, roots: &mut dyn RootSet) {
    heap.collect(roots, CollectionKind::Minor, true)
}

/// Run a major collection only. Dead young objects stay in the young generation until the next
/// minor collection.
pub fn collect_old(heap: &mut HeapState, roots: &mut dyn RootSet) {
    heap.collect(roots, CollectionKind::Major, false)
}

/// Set the callback that is given every finalizable object found unreachable. It runs on the
/// mutator thread once the collection that found the object is over. If it stores the object
/// somewhere reachable, the object lives on; it is never finalized again.
///
/// Arguments:
/// * `heap`: A reference to the heap.
/// * `callback`: The finalizer.
pub fn set_finalizer_callback(heap: &mut HeapState, callback: FinalizerCallback) {
    heap.set_finalizer(callback)
}

/// Is `addr` an object of this heap that the mutator may hold?
pub fn is_valid(heap: &HeapState, addr: Address) -> bool {
    validate_object(heap, addr) == ObjectPosition::Valid
}

/// Where `addr` lies in the heap, for diagnostics.
pub fn validate_object(heap: &HeapState, addr: Address) -> ObjectPosition {
    heap.plan.object_position(addr)
}

/// Capacity and usage of every space.
pub fn heap_usage(heap: &HeapState) -> HeapUsage {
    heap.heap_usage()
}

/// Log the heap usage report at `info` level.
pub fn dump_heap_usage(heap: &HeapState) {
    info!("Heap usage:\n{}", heap.heap_usage());
}

/// Counters accumulated since the heap was created.
pub fn statistics(heap: &HeapState) -> &Stats {
    &heap.stats
}

/// Is `object` in the remembered set?
pub fn is_remembered(heap: &HeapState, object: ObjectReference) -> bool {
    heap.plan.remset.contains(object)
}

/// The number of objects in the remembered set.
pub fn remembered_set_len(heap: &HeapState) -> usize {
    heap.plan.remset.len()
}

/// Is `object` in the young generation?
pub fn is_young_object(heap: &HeapState, object: ObjectReference) -> bool {
    heap.plan.is_young(object.to_raw_address())
}

/// Is `object` in the old generation, including the large object space?
pub fn is_mature_object(heap: &HeapState, object: ObjectReference) -> bool {
    heap.plan.is_mature(object.to_raw_address())
}

/// The number of minor collections `object` has survived in the young generation.
pub fn object_age(_heap: &HeapState, object: ObjectReference) -> u8 {
    header::age(object)
}
