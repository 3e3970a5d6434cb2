use crate::plan::tracing::TraceContext;
use crate::util::ObjectReference;
use crate::vm::ClassRegistry;

/// Weak slots are not traced. Every object with weak slots found during a collection is recorded
/// here, and once liveness is final each weak slot is either updated to the new location of its
/// referent or cleared.
#[derive(Default, Debug)]
pub struct WeakProcessor {
    holders: Vec<ObjectReference>,
}

impl WeakProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an object (at its location after this collection) whose weak slots must be processed.
    pub fn add_holder(&mut self, object: ObjectReference) {
        self.holders.push(object);
    }

    pub fn holders(&self) -> &[ObjectReference] {
        &self.holders
    }

    /// Process the weak slots of every holder. Returns the number of cleared slots.
    pub fn process<T: TraceContext>(&self, classes: &ClassRegistry, tracer: &T) -> usize {
        let mut cleared = 0;
        for holder in self.holders.iter() {
            classes.class_of(*holder).for_each_weak_slot(*holder, |slot| {
                if let Some(referent) = slot.load() {
                    if tracer.is_live(referent) {
                        let new_referent = tracer.get_forwarded_object(referent);
                        if new_referent != referent {
                            slot.store(Some(new_referent));
                        }
                    } else {
                        trace!("Clear weak slot {:?} of {} to {}", slot, holder, referent);
                        slot.store(None);
                        cleared += 1;
                    }
                }
            });
        }
        debug!(
            "Weak processing: {} holders, {} slots cleared",
            self.holders.len(),
            cleared
        );
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::header;
    use crate::util::Address;
    use crate::vm::{initialize_object, ClassDescriptor, ObjectTracer, SimpleSlot};

    struct LiveAbove(usize);

    impl ObjectTracer for LiveAbove {
        fn trace_object(&mut self, object: ObjectReference) -> ObjectReference {
            object
        }
    }

    impl TraceContext for LiveAbove {
        fn is_live(&self, object: ObjectReference) -> bool {
            object.value() >= self.0
        }
        fn get_forwarded_object(&self, object: ObjectReference) -> ObjectReference {
            ObjectReference::from_raw_address(unsafe { Address::from_usize(object.value() + 0x100) })
                .unwrap()
        }
        fn complete_closure(&mut self) {}
    }

    #[test]
    fn clear_dead_and_forward_live() {
        let mut classes = ClassRegistry::new();
        let class = ClassDescriptor::new("Weak", 24)
            .with_fields(&[0])
            .with_weak_fields(&[8, 16]);
        let id = classes.register(class.clone()).unwrap();

        let mut storage = [0usize; 6];
        let holder = initialize_object(Address::from_mut_ptr(storage.as_mut_ptr()), id, &class);
        let payload = header::payload(holder);
        let strong = SimpleSlot::from_address(payload);
        let weak_dead = SimpleSlot::from_address(payload + 8usize);
        let weak_live = SimpleSlot::from_address(payload + 16usize);
        let low = ObjectReference::from_raw_address(unsafe { Address::from_usize(0x1000) }).unwrap();
        let high = ObjectReference::from_raw_address(unsafe { Address::from_usize(0x9000) }).unwrap();
        strong.store(Some(low));
        weak_dead.store(Some(low));
        weak_live.store(Some(high));

        let mut processor = WeakProcessor::new();
        processor.add_holder(holder);
        assert_eq!(processor.process(&classes, &LiveAbove(0x8000)), 1);
        assert_eq!(weak_dead.load(), None);
        assert_eq!(weak_live.load().unwrap().value(), 0x9100);
        // Strong slots are not touched.
        assert_eq!(strong.load(), Some(low));
    }
}
