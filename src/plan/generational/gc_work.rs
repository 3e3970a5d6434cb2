//! Minor collection: evacuate eden and the from-survivor space.

use super::global::Gen;
use crate::plan::tracing::{ObjectQueue, TraceContext, VectorObjectQueue};
use crate::util::alloc::{out_of_memory, AllocationError};
use crate::util::finalizable_processor::FinalizableProcessor;
use crate::util::header;
use crate::util::statistics::GcStats;
use crate::util::weak_processor::WeakProcessor;
use crate::util::ObjectReference;
use crate::vm::{self, ClassRegistry, ObjectTracer, RootSet};

/// One minor collection. Young objects reachable from the roots, the remembered set and the
/// objects waiting for finalization are copied breadth first into the to-survivor space, or
/// promoted into the old generation once they are old enough or when to-space is full.
pub struct NurseryCollection<'a> {
    plan: &'a mut Gen,
    classes: &'a ClassRegistry,
    trace_weak_as_strong: bool,
    /// Promoted objects that still have to be scanned.
    promoted: VectorObjectQueue,
    weak: WeakProcessor,
    stats: GcStats,
}

impl<'a> NurseryCollection<'a> {
    pub fn new(plan: &'a mut Gen, classes: &'a ClassRegistry, trace_weak_as_strong: bool) -> Self {
        NurseryCollection {
            plan,
            classes,
            trace_weak_as_strong,
            promoted: VectorObjectQueue::new(),
            weak: WeakProcessor::new(),
            stats: GcStats::default(),
        }
    }

    pub fn run<R: RootSet + ?Sized>(
        mut self,
        roots: &mut R,
        finalizable: &mut FinalizableProcessor,
    ) -> GcStats {
        debug!(
            "Minor collection: {} young objects, {} remembered",
            self.plan.nursery.objects_in_from(),
            self.plan.remset.len()
        );
        self.scan_roots(roots);
        for object in self.plan.remset.take() {
            self.scan_object(object, true);
        }
        finalizable.forward_ready(&mut self);
        self.scan_loop();

        let ready = finalizable.scan(&mut self);
        self.stats.finalizable_ready.inc_by(ready as u64);
        let cleared = self.weak.process(self.classes, &self);
        self.stats.weak_cleared.inc_by(cleared as u64);

        self.release();
        self.refine_remembered_set();
        #[cfg(feature = "extreme_assertions")]
        crate::util::sanity::verify_after_minor(self.plan, self.classes);
        self.stats
    }

    fn scan_roots<R: RootSet + ?Sized>(&mut self, roots: &mut R) {
        let mut visitor = |slot: &mut Option<ObjectReference>| {
            if let Some(object) = *slot {
                *slot = Some(self.relocate(object));
            }
        };
        roots.scan_roots(&mut visitor);
    }

    /// Return the location of `object` after this collection, copying or promoting it on the
    /// first visit.
    fn relocate(&mut self, object: ObjectReference) -> ObjectReference {
        if !self.plan.nursery.in_from(object.to_raw_address()) {
            return object;
        }
        if let Some(new_object) = header::get_forwarded_object(object) {
            return new_object;
        }
        let age = header::age(object);
        let new_object = if age >= self.plan.promotion_age {
            self.promote(object)
        } else {
            match self
                .plan
                .nursery
                .to_survivor_mut()
                .copy_object(object, age.saturating_add(1))
            {
                Some(copy) => {
                    self.stats.copied.inc(header::object_size(copy));
                    copy
                }
                None => {
                    trace!("To-space is full, promote {}", object);
                    self.promote(object)
                }
            }
        };
        header::forward_object(object, new_object);
        new_object
    }

    fn promote(&mut self, object: ObjectReference) -> ObjectReference {
        let size = header::object_size(object);
        let Some(addr) = self.plan.mature.alloc(size) else {
            out_of_memory(AllocationError::HeapOutOfMemory)
        };
        let new_object = vm::copy_object(object, addr);
        trace!("Promote {} to {}", object, new_object);
        self.stats.promoted.inc(size);
        self.promoted.enqueue(new_object);
        new_object
    }

    /// Relocate every strong slot of `object`. A mature object that still refers to the young
    /// generation afterwards is remembered.
    fn scan_object(&mut self, object: ObjectReference, mature: bool) {
        let classes = self.classes;
        let class = classes.class_of(object);
        let trace_weak_as_strong = self.trace_weak_as_strong;
        let mut refers_to_young = false;
        let mut visit = |slot: vm::SimpleSlot| {
            if let Some(referent) = slot.load() {
                let new_referent = self.relocate(referent);
                if new_referent != referent {
                    slot.store(Some(new_referent));
                }
                refers_to_young |= self.plan.is_young(new_referent.to_raw_address());
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
        if mature && refers_to_young && self.plan.remset.remember(object) {
            trace!("Remember {} after scanning", object);
        }
    }

    /// Scan until both the to-space scan cursor has caught up and the promotion worklist is empty.
    fn scan_loop(&mut self) {
        loop {
            if let Some(object) = self.plan.nursery.to_survivor_mut().next_unscanned() {
                self.scan_object(object, false);
            } else if let Some(object) = self.promoted.pop() {
                self.scan_object(object, true);
            } else {
                break;
            }
        }
    }

    /// Run the cleanup hook of every young object that was not evacuated, then empty eden and
    /// from-space.
    fn release(&mut self) {
        for object in self.plan.nursery.from_objects() {
            if !header::is_forwarded(object) {
                self.classes.run_cleanup(object);
                self.stats.reclaimed.record(header::object_size(object));
            }
        }
        self.plan.nursery.release();
        debug!(
            "Minor collection done: {} survivors, {} promoted, {} reclaimed",
            self.stats.copied.units(),
            self.stats.promoted.units(),
            self.stats.reclaimed.objects
        );
    }

    /// Weak slots are not seen by [`NurseryCollection::scan_object`]: a mature holder whose weak
    /// slot survived pointing at a young object must be remembered too.
    fn refine_remembered_set(&mut self) {
        let classes = self.classes;
        for holder in self.weak.holders() {
            if self.plan.is_young(holder.to_raw_address()) {
                continue;
            }
            let mut refers_to_young = false;
            classes.class_of(*holder).for_each_weak_slot(*holder, |slot| {
                refers_to_young |= slot
                    .load()
                    .is_some_and(|referent| self.plan.is_young(referent.to_raw_address()));
            });
            if refers_to_young && self.plan.remset.remember(*holder) {
                trace!("Remember {} for a weak reference", holder);
            }
        }
    }
}

impl ObjectTracer for NurseryCollection<'_> {
    fn trace_object(&mut self, object: ObjectReference) -> ObjectReference {
        self.relocate(object)
    }
}

impl TraceContext for NurseryCollection<'_> {
    fn is_live(&self, object: ObjectReference) -> bool {
        !self.plan.nursery.in_from(object.to_raw_address()) || header::is_forwarded(object)
    }

    fn get_forwarded_object(&self, object: ObjectReference) -> ObjectReference {
        if self.plan.nursery.in_from(object.to_raw_address()) {
            header::get_forwarded_object(object).unwrap_or(object)
        } else {
            object
        }
    }

    fn complete_closure(&mut self) {
        self.scan_loop();
    }
}
