//! The heap instance and its builder.

use crate::plan::generational::barrier::Barrier;
use crate::plan::generational::full_heap::FullHeapCollection;
use crate::plan::generational::gc_work::NurseryCollection;
use crate::plan::generational::{CollectionKind, Gen};
use crate::plan::AllocationSemantics;
use crate::util::alloc::{out_of_memory, AllocationError};
use crate::util::finalizable_processor::FinalizableProcessor;
use crate::util::heap::{HeapLayout, HeapUsage};
use crate::util::options::{MajorCollector, Options};
use crate::util::statistics::{GcStats, Stats};
use crate::util::{Address, ObjectReference};
use crate::vm::{self, ClassId, ClassRegistry, FinalizerCallback, RootSet, SimpleSlot};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// An error when creating a heap.
#[derive(Debug)]
pub enum HeapInitError {
    /// The options describe a heap that cannot work.
    InvalidOption(String),
    /// The operating system refused to map a space.
    Mmap(std::io::Error),
}

impl fmt::Display for HeapInitError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HeapInitError::InvalidOption(msg) => write!(f, "invalid heap options: {}", msg),
            HeapInitError::Mmap(e) => write!(f, "failed to map the heap: {}", e),
        }
    }
}

impl std::error::Error for HeapInitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HeapInitError::Mmap(e) => Some(e),
            HeapInitError::InvalidOption(_) => None,
        }
    }
}

impl From<std::io::Error> for HeapInitError {
    fn from(e: std::io::Error) -> Self {
        HeapInitError::Mmap(e)
    }
}

/// Build a heap with options.
/// Users can configure the heap with the builder, and then create a heap instance from it.
pub struct HeapBuilder {
    pub options: Options,
}

impl HeapBuilder {
    /// Create a heap builder with options read from environment variables.
    pub fn new() -> Self {
        let mut builder = Self::new_no_env_vars();
        builder.options.read_env_var_settings();
        builder
    }

    /// Create a heap builder with the default options, ignoring environment variables.
    pub fn new_no_env_vars() -> Self {
        HeapBuilder {
            options: Options::default(),
        }
    }

    /// Set an option by name.
    pub fn set_option(&mut self, name: &str, val: &str) -> bool {
        self.options.set_from_str(name, val)
    }

    pub fn set_heap_size(&mut self, heap_size: usize) -> &mut Self {
        self.options.heap_size = heap_size;
        self
    }

    /// Set the size of eden and of each survivor space explicitly.
    pub fn set_young_sizes(&mut self, eden_size: usize, survivor_size: usize) -> &mut Self {
        self.options.eden_size = eden_size;
        self.options.survivor_size = survivor_size;
        self
    }

    pub fn set_old_size(&mut self, old_size: usize) -> &mut Self {
        self.options.old_size = old_size;
        self
    }

    pub fn set_node_size(&mut self, node_size: usize) -> &mut Self {
        self.options.node_size = node_size;
        self
    }

    pub fn set_promotion_age(&mut self, age: u8) -> &mut Self {
        self.options.promotion_age = age;
        self
    }

    pub fn set_major_collector(&mut self, collector: MajorCollector) -> &mut Self {
        self.options.major_collector = collector;
        self
    }

    /// Create the heap.
    pub fn build(self) -> Result<HeapState, HeapInitError> {
        HeapState::new(self.options)
    }
}

impl Default for HeapBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A heap instance: its spaces, the registered classes and the collector state. All the
/// functions in [`crate::memory_manager`] take it explicitly.
pub struct HeapState {
    pub(crate) options: Options,
    pub(crate) classes: ClassRegistry,
    pub(crate) plan: Gen,
    pub(crate) finalizable_processor: FinalizableProcessor,
    pub(crate) stats: Stats,
    finalizer: Option<FinalizerCallback>,
}

impl HeapState {
    fn new(options: Options) -> Result<HeapState, HeapInitError> {
        let layout = HeapLayout::from_options(&options)?;
        let plan = Gen::new(&layout, &options)?;
        info!("Initialized heap: {}", layout);
        Ok(HeapState {
            options,
            classes: ClassRegistry::new(),
            plan,
            finalizable_processor: FinalizableProcessor::new(),
            stats: Stats::default(),
            finalizer: None,
        })
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub(crate) fn set_finalizer(&mut self, callback: FinalizerCallback) {
        self.finalizer = Some(callback);
    }

    /// Allocate an instance of `class`. May collect before allocating.
    pub(crate) fn alloc<R: RootSet + ?Sized>(
        &mut self,
        roots: &mut R,
        class: ClassId,
        semantics: AllocationSemantics,
    ) -> ObjectReference {
        let descriptor = self.classes.get(class);
        let size = descriptor.instance_size();
        let finalizable = descriptor.finalizable;
        let semantics = self.plan.select_semantics(size, semantics);

        if self.options.is_stress_test_gc_enabled()
            && self.plan.stress_collection_due(self.options.stress_factor)
        {
            trace!("Stress collection before allocating {} bytes", size);
            self.collect(roots, CollectionKind::Minor, true);
        }

        let addr = match semantics {
            AllocationSemantics::Default => self.alloc_young(roots, size),
            AllocationSemantics::Mature => self.alloc_mature(roots, size),
            AllocationSemantics::Los => self.alloc_los(roots, size),
        };
        let object = vm::initialize_object(addr, class, self.classes.get(class));
        if finalizable && !self.options.no_finalizer {
            self.finalizable_processor.add(object);
        }
        self.stats.record_alloc(semantics, size);
        trace!("Allocated {} ({} bytes, {:?})", object, size, semantics);
        object
    }

    fn alloc_young<R: RootSet + ?Sized>(&mut self, roots: &mut R, size: usize) -> Address {
        if let Some(addr) = self.plan.alloc_young(size) {
            return addr;
        }
        self.collect(roots, CollectionKind::Minor, true);
        match self.plan.alloc_young(size) {
            Some(addr) => addr,
            None => out_of_memory(AllocationError::HeapOutOfMemory),
        }
    }

    fn alloc_mature<R: RootSet + ?Sized>(&mut self, roots: &mut R, size: usize) -> Address {
        if let Some(addr) = self.plan.alloc_mature(size) {
            return addr;
        }
        self.collect(roots, CollectionKind::Major, true);
        match self.plan.alloc_mature(size) {
            Some(addr) => addr,
            None => out_of_memory(AllocationError::HeapOutOfMemory),
        }
    }

    fn alloc_los<R: RootSet + ?Sized>(&mut self, roots: &mut R, size: usize) -> Address {
        if let Ok(addr) = self.plan.alloc_los(size) {
            return addr;
        }
        self.collect(roots, CollectionKind::Major, true);
        match self.plan.alloc_los(size) {
            Ok(addr) => addr,
            Err(e) => out_of_memory(e),
        }
    }

    /// Run a collection of at least the requested kind. After a major collection, the young
    /// generation is evacuated as well if `evacuate_young` is set. Finalizers of the objects found
    /// unreachable run once the pause is over.
    pub(crate) fn collect<R: RootSet + ?Sized>(
        &mut self,
        roots: &mut R,
        requested: CollectionKind,
        evacuate_young: bool,
    ) {
        let kind = self.plan.select_collection_kind(requested);
        let start = Instant::now();
        let trace_weak_as_strong = self.options.no_weak_references;
        let mut gc = GcStats::default();
        if kind == CollectionKind::Major {
            let major = FullHeapCollection::new(&mut self.plan, &self.classes, trace_weak_as_strong);
            gc.merge(&major.run(roots, &mut self.finalizable_processor));
        }
        if kind == CollectionKind::Minor || evacuate_young {
            let minor = NurseryCollection::new(&mut self.plan, &self.classes, trace_weak_as_strong);
            gc.merge(&minor.run(roots, &mut self.finalizable_processor));
        }
        self.plan.end_of_gc();
        let pause = start.elapsed();
        self.stats.record_collection(kind, &gc, pause);
        info!(
            "{} collection {} in {:.3} ms: {}",
            kind,
            self.plan.collection_count(),
            pause.as_secs_f64() * 1e3,
            gc
        );
        self.run_finalizers();
    }

    /// Hand every object waiting for finalization to the finalizer callback. A failing or
    /// panicking finalizer is logged and skipped.
    fn run_finalizers(&mut self) {
        while let Some(object) = self.finalizable_processor.get_ready_object() {
            let Some(callback) = self.finalizer.as_mut() else {
                debug!("No finalizer callback for {}", object);
                continue;
            };
            let succeeded = match panic::catch_unwind(AssertUnwindSafe(|| callback(object))) {
                Ok(Ok(())) => true,
                Ok(Err(e)) => {
                    warn!("Finalizer for {} failed: {}", object, e);
                    false
                }
                Err(_) => {
                    warn!("Finalizer for {} panicked", object);
                    false
                }
            };
            self.stats.record_finalizer(succeeded);
        }
    }

    pub(crate) fn write_reference(
        &mut self,
        object: ObjectReference,
        offset: usize,
        value: Option<ObjectReference>,
    ) {
        debug_assert!(
            self.classes.class_of(object).is_reference_field(offset),
            "offset {} of {} is not a reference field",
            offset,
            object
        );
        let slot = SimpleSlot::from_address(crate::util::header::payload(object) + offset);
        self.plan.object_reference_write(object, slot, value);
    }

    pub(crate) fn heap_usage(&self) -> HeapUsage {
        HeapUsage {
            finalizable_candidates: self.finalizable_processor.candidates().len(),
            ready_for_finalize: self.finalizable_processor.ready_for_finalize().len(),
            ..self.plan.heap_usage()
        }
    }

    /// Run the cleanup hook of every object left in the heap, and log the statistics. The memory
    /// is unmapped when the heap is dropped.
    pub(crate) fn destroy(self) {
        let mut remaining = 0;
        for object in self.plan.all_objects() {
            self.classes.run_cleanup(object);
            remaining += 1;
        }
        info!("Heap destroyed with {} objects left", remaining);
        info!("{}", self.stats);
    }
}
