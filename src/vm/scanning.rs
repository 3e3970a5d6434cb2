use crate::util::ObjectReference;

/// Callback trait of scanning functions that directly trace through slots.
pub trait ObjectTracer {
    /// Call this function for the content of each slot,
    /// and assign the returned value back to the slot.
    fn trace_object(&mut self, object: ObjectReference) -> ObjectReference;
}

/// This lets us use closures as ObjectTracer.
impl<F: FnMut(ObjectReference) -> ObjectReference> ObjectTracer for F {
    fn trace_object(&mut self, object: ObjectReference) -> ObjectReference {
        self(object)
    }
}

/// The roots of the mutator. A collection visits every root slot and may rewrite it in place
/// when the referent moves. Root slots hold object references only; they are never tagged.
pub trait RootSet {
    /// Call `visitor` for each root slot.
    fn scan_roots(&mut self, visitor: &mut dyn FnMut(&mut Option<ObjectReference>));
}

impl RootSet for [Option<ObjectReference>] {
    fn scan_roots(&mut self, visitor: &mut dyn FnMut(&mut Option<ObjectReference>)) {
        for slot in self.iter_mut() {
            visitor(slot);
        }
    }
}

impl RootSet for Vec<Option<ObjectReference>> {
    fn scan_roots(&mut self, visitor: &mut dyn FnMut(&mut Option<ObjectReference>)) {
        self.as_mut_slice().scan_roots(visitor)
    }
}

impl RootSet for Vec<ObjectReference> {
    fn scan_roots(&mut self, visitor: &mut dyn FnMut(&mut Option<ObjectReference>)) {
        for object in self.iter_mut() {
            let mut slot = Some(*object);
            visitor(&mut slot);
            // A collection never clears a strong root.
            debug_assert!(slot.is_some());
            if let Some(new_object) = slot {
                *object = new_object;
            }
        }
    }
}

/// An empty root set.
impl RootSet for () {
    fn scan_roots(&mut self, _visitor: &mut dyn FnMut(&mut Option<ObjectReference>)) {}
}

/// Index of a slot in a [`RootTable`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RootHandle(usize);

/// A stack of root slots. The mutator pushes handles while it works with objects and pops them,
/// or truncates back to a saved depth, when they are no longer needed.
#[derive(Default, Debug)]
pub struct RootTable {
    slots: Vec<Option<ObjectReference>>,
}

impl RootTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, object: Option<ObjectReference>) -> RootHandle {
        self.slots.push(object);
        RootHandle(self.slots.len() - 1)
    }

    pub fn pop(&mut self) -> Option<ObjectReference> {
        self.slots.pop().flatten()
    }

    pub fn get(&self, handle: RootHandle) -> Option<ObjectReference> {
        self.slots[handle.0]
    }

    pub fn set(&mut self, handle: RootHandle, object: Option<ObjectReference>) {
        self.slots[handle.0] = object;
    }

    /// The current depth, to be passed to [`RootTable::restore`] later.
    pub fn depth(&self) -> usize {
        self.slots.len()
    }

    /// Drop every slot pushed after `depth` was taken.
    pub fn restore(&mut self, depth: usize) {
        self.slots.truncate(depth);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl RootSet for RootTable {
    fn scan_roots(&mut self, visitor: &mut dyn FnMut(&mut Option<ObjectReference>)) {
        self.slots.scan_roots(visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::Address;

    fn fake(addr: usize) -> ObjectReference {
        ObjectReference::from_raw_address(unsafe { Address::from_usize(addr) }).unwrap()
    }

    #[test]
    fn root_table_push_pop_restore() {
        let mut table = RootTable::new();
        let a = table.push(Some(fake(0x1000)));
        let depth = table.depth();
        table.push(None);
        table.push(Some(fake(0x2000)));
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(a), Some(fake(0x1000)));
        assert_eq!(table.pop(), Some(fake(0x2000)));
        table.restore(depth);
        assert_eq!(table.len(), 1);
        table.set(a, None);
        assert_eq!(table.get(a), None);
    }

    #[test]
    fn roots_are_rewritten_in_place() {
        let mut roots: Vec<ObjectReference> = vec![fake(0x1000), fake(0x2000)];
        roots.scan_roots(&mut |slot| {
            *slot = slot.map(|o| fake(o.value() + 0x10));
        });
        assert_eq!(roots, vec![fake(0x1010), fake(0x2010)]);

        let mut table = RootTable::new();
        let h = table.push(Some(fake(0x3000)));
        table.push(None);
        let mut visited = 0;
        table.scan_roots(&mut |slot| {
            visited += 1;
            *slot = slot.map(|_| fake(0x4000));
        });
        assert_eq!(visited, 2);
        assert_eq!(table.get(h), Some(fake(0x4000)));
    }

    #[test]
    fn closure_as_tracer() {
        let mut tracer = |o: ObjectReference| fake(o.value() * 2);
        assert_eq!(tracer.trace_object(fake(0x100)), fake(0x200));
    }
}
