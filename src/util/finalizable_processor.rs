use crate::plan::tracing::TraceContext;
use crate::util::ObjectReference;

/// A special processor for finalizable objects.
///
/// Instances of finalizable classes are registered as candidates when they are allocated. When
/// a collection finds a candidate unreachable, the candidate is moved to `ready_for_finalize` and
/// retained, together with everything it references, until the finalizer has seen it.
#[derive(Default, Debug)]
pub struct FinalizableProcessor {
    /// Objects that will be finalized when they become unreachable.
    candidates: Vec<ObjectReference>,
    /// Objects that are unreachable and waiting for their finalizer.
    ready_for_finalize: Vec<ObjectReference>,
}

impl FinalizableProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: ObjectReference) {
        self.candidates.push(object);
    }

    /// Keep the objects waiting for their finalizer alive. They are roots of every collection.
    pub fn forward_ready<T: TraceContext>(&mut self, tracer: &mut T) {
        for reff in self.ready_for_finalize.iter_mut() {
            *reff = tracer.trace_object(*reff);
        }
    }

    /// Called after the strong closure. Live candidates are updated to their new location, dead
    /// ones are retained and moved to the ready list. Returns the number of newly ready objects.
    pub fn scan<T: TraceContext>(&mut self, tracer: &mut T) -> usize {
        let mut ready = vec![];
        self.candidates.retain_mut(|reff| {
            if tracer.is_live(*reff) {
                *reff = tracer.get_forwarded_object(*reff);
                true
            } else {
                ready.push(*reff);
                false
            }
        });

        let newly_ready = ready.len();
        for reff in ready {
            let retained = tracer.trace_object(reff);
            trace!("{} is not live, push {} to ready_for_finalize", reff, retained);
            self.ready_for_finalize.push(retained);
        }
        if newly_ready > 0 {
            tracer.complete_closure();
        }
        debug!(
            "Finalization: {} candidates, {} objects ready to finalize",
            self.candidates.len(),
            self.ready_for_finalize.len()
        );
        newly_ready
    }

    /// Rewrite every registered object with `f`. Used when objects move after liveness is known.
    pub fn forward_all<F: FnMut(ObjectReference) -> ObjectReference>(&mut self, mut f: F) {
        self.candidates
            .iter_mut()
            .chain(self.ready_for_finalize.iter_mut())
            .for_each(|reff| *reff = f(*reff));
    }

    pub fn get_ready_object(&mut self) -> Option<ObjectReference> {
        self.ready_for_finalize.pop()
    }

    pub fn candidates(&self) -> &[ObjectReference] {
        &self.candidates
    }

    pub fn ready_for_finalize(&self) -> &[ObjectReference] {
        &self.ready_for_finalize
    }
}
