//! Major collection: mark the whole heap, then sweep or compact the old generation.

use super::global::Gen;
use crate::plan::tracing::{ObjectQueue, TraceContext, VectorObjectQueue};
use crate::policy::space::Space;
use crate::util::finalizable_processor::FinalizableProcessor;
use crate::util::header;
use crate::util::options::MajorCollector;
use crate::util::statistics::GcStats;
use crate::util::weak_processor::WeakProcessor;
use crate::util::ObjectReference;
use crate::vm::{ClassRegistry, ObjectTracer, RootSet, SimpleSlot};

/// One major collection. Marking covers every generation. Only the old generation (nodes and
/// large objects) is reclaimed here; dead young objects are left to the minor collection that
/// follows.
pub struct FullHeapCollection<'a> {
    plan: &'a mut Gen,
    classes: &'a ClassRegistry,
    trace_weak_as_strong: bool,
    mark_stack: VectorObjectQueue,
    weak: WeakProcessor,
    stats: GcStats,
}

impl<'a> FullHeapCollection<'a> {
    pub fn new(plan: &'a mut Gen, classes: &'a ClassRegistry, trace_weak_as_strong: bool) -> Self {
        FullHeapCollection {
            plan,
            classes,
            trace_weak_as_strong,
            mark_stack: VectorObjectQueue::new(),
            weak: WeakProcessor::new(),
            stats: GcStats::default(),
        }
    }

    pub fn run<R: RootSet + ?Sized>(
        mut self,
        roots: &mut R,
        finalizable: &mut FinalizableProcessor,
    ) -> GcStats {
        let collector = self.plan.major_collector;
        debug!(
            "Major collection ({}): {} old nodes used, {} large objects",
            collector,
            self.plan.mature.used_nodes(),
            self.plan.los.object_count()
        );
        roots.scan_roots(&mut |slot: &mut Option<ObjectReference>| {
            if let Some(object) = *slot {
                self.trace_object(object);
            }
        });
        finalizable.forward_ready(&mut self);
        self.complete_closure();

        let ready = finalizable.scan(&mut self);
        self.stats.finalizable_ready.inc_by(ready as u64);
        let cleared = self.weak.process(self.classes, &self);
        self.stats.weak_cleared.inc_by(cleared as u64);
        self.plan.remset.retain(header::is_marked);

        match collector {
            MajorCollector::MarkSweep => self.sweep(),
            MajorCollector::MarkCompact => self.compact(roots, finalizable),
        }
        for object in self.plan.nursery.from_objects() {
            header::clear_mark(object);
        }
        debug!(
            "Major collection done: {} reclaimed ({} bytes), {} moved, {} old nodes free",
            self.stats.reclaimed.objects,
            self.stats.reclaimed.bytes,
            self.stats.moved,
            self.plan.mature.free_nodes()
        );
        self.stats
    }

    fn scan_object(&mut self, object: ObjectReference) {
        let classes = self.classes;
        let class = classes.class_of(object);
        let trace_weak_as_strong = self.trace_weak_as_strong;
        let mut visit = |slot: SimpleSlot| {
            if let Some(referent) = slot.load() {
                self.trace_object(referent);
            }
        };
        class.for_each_strong_slot(object, &mut visit);
        if class.has_weak_fields() {
            if trace_weak_as_strong {
                class.for_each_weak_slot(object, &mut visit);
            } else {
                self.weak.add_holder(object);
            }
        }
    }

    fn sweep(&mut self) {
        let classes = self.classes;
        self.stats.reclaimed += self.plan.mature.sweep(|o| classes.run_cleanup(o));
        self.stats.reclaimed += self.plan.los.sweep(|o| classes.run_cleanup(o));
    }

    /// Sliding compaction of the old generation in three passes. Large objects are swept first,
    /// so that every object left in the old generation is live when references are updated.
    fn compact<R: RootSet + ?Sized>(&mut self, roots: &mut R, finalizable: &mut FinalizableProcessor) {
        let classes = self.classes;
        self.stats.reclaimed += self
            .plan
            .mature
            .calculate_forwarding_pointers(|o| classes.run_cleanup(o));
        self.stats.reclaimed += self.plan.los.sweep(|o| classes.run_cleanup(o));

        let plan: &Gen = self.plan;
        let forward = |object: ObjectReference| {
            if plan.mature.contains(object.to_raw_address()) {
                plan.mature.get_forwarded_object(object)
            } else {
                object
            }
        };
        let update_slots = |object: ObjectReference| {
            classes.class_of(object).for_each_slot(object, |slot| {
                if let Some(referent) = slot.load() {
                    let new_referent = forward(referent);
                    if new_referent != referent {
                        slot.store(Some(new_referent));
                    }
                }
            });
        };
        plan.nursery
            .from_objects()
            .filter(|o| header::is_marked(*o))
            .for_each(update_slots);
        plan.mature.object_iter().for_each(update_slots);
        plan.los.object_iter().for_each(update_slots);
        roots.scan_roots(&mut |slot: &mut Option<ObjectReference>| {
            *slot = slot.map(forward);
        });
        finalizable.forward_all(forward);

        self.plan.remset.forward_all(|o| {
            if self.plan.mature.contains(o.to_raw_address()) {
                self.plan.mature.get_forwarded_object(o)
            } else {
                o
            }
        });
        let moved = self.plan.mature.compact();
        self.stats.moved.inc_by(moved as u64);
    }
}

impl ObjectTracer for FullHeapCollection<'_> {
    /// Mark `object` and push it on the mark stack if it was not marked. Objects do not move
    /// while marking. Values outside the heap are left alone.
    fn trace_object(&mut self, object: ObjectReference) -> ObjectReference {
        if !self.plan.is_heap_address(object.to_raw_address()) {
            return object;
        }
        if header::attempt_mark(object) {
            trace!("Mark {}", object);
            self.mark_stack.enqueue(object);
        }
        object
    }
}

impl TraceContext for FullHeapCollection<'_> {
    fn is_live(&self, object: ObjectReference) -> bool {
        !self.plan.is_heap_address(object.to_raw_address()) || header::is_marked(object)
    }

    fn get_forwarded_object(&self, object: ObjectReference) -> ObjectReference {
        object
    }

    fn complete_closure(&mut self) {
        while let Some(object) = self.mark_stack.pop() {
            self.scan_object(object);
        }
    }
}
