use crate::util::header;
use crate::util::Address;
use crate::util::ObjectReference;

/// Iterate over the objects in an address range that is densely packed with objects, such as
/// the allocated part of a bump region. Each object is found by adding the size recorded in
/// the header of the previous one.
pub struct ObjectIterator {
    cursor: Address,
    end: Address,
}

impl ObjectIterator {
    /// Create an iterator for `[start, end)`. Every byte of the range must belong to an object.
    pub fn new(start: Address, end: Address) -> Self {
        debug_assert!(start <= end);
        ObjectIterator { cursor: start, end }
    }
}

impl std::iter::Iterator for ObjectIterator {
    type Item = ObjectReference;

    fn next(&mut self) -> Option<<Self as Iterator>::Item> {
        if self.cursor < self.end {
            let object = unsafe { ObjectReference::from_raw_address_unchecked(self.cursor) };
            let size = header::object_size(object);
            debug_assert!(size > 0, "Corrupted object at {}", self.cursor);
            self.cursor += size;
            debug_assert!(self.cursor <= self.end);
            Some(object)
        } else {
            None
        }
    }
}
