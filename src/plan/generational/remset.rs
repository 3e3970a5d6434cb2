use crate::util::header;
use crate::util::ObjectReference;

/// Old objects that may hold references into the young generation.
///
/// An object is in the set iff the remembered bit in its header is set, so each object appears at
/// most once. Entries are added by the write barrier and by minor collections, and are roots of
/// every minor collection.
#[derive(Default, Debug)]
pub struct RememberedSet {
    entries: Vec<ObjectReference>,
}

impl RememberedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `object` unless it is already remembered. Returns true if it was added.
    pub fn remember(&mut self, object: ObjectReference) -> bool {
        if header::is_remembered(object) {
            return false;
        }
        header::set_remembered(object, true);
        self.entries.push(object);
        true
    }

    /// Take every entry out of the set. The remembered bits are cleared, so the caller can add
    /// back the objects that still refer to the young generation.
    pub fn take(&mut self) -> Vec<ObjectReference> {
        let entries = std::mem::take(&mut self.entries);
        for object in entries.iter() {
            debug_assert!(
                header::is_remembered(*object),
                "{} is in the remembered set without its bit",
                object
            );
            header::set_remembered(*object, false);
        }
        entries
    }

    /// Drop the entries for which `f` returns false.
    pub fn retain<F: FnMut(ObjectReference) -> bool>(&mut self, mut f: F) {
        self.entries.retain(|object| {
            let keep = f(*object);
            if !keep {
                header::set_remembered(*object, false);
            }
            keep
        });
    }

    /// Rewrite every entry with `f`. Used when the old generation is compacted.
    pub fn forward_all<F: FnMut(ObjectReference) -> ObjectReference>(&mut self, mut f: F) {
        self.entries.iter_mut().for_each(|object| *object = f(*object));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectReference> {
        self.entries.iter()
    }

    pub fn contains(&self, object: ObjectReference) -> bool {
        header::is_remembered(object)
    }
}
