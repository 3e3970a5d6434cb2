use crate::policy::copyspace::CopySpace;
use crate::policy::space::Space;
use crate::util::constants::BYTES_IN_PAGE;
use crate::util::memory;
use crate::util::{Address, ObjectReference};

/// The young generation: eden followed by two survivor spaces, in one mapping.
///
/// The mutator allocates in eden. A minor collection evacuates eden and the `from` survivor
/// space into the `to` survivor space (or the old generation), then empties eden and `from`
/// and swaps the survivor roles. Between collections `to` is empty.
pub struct Nursery {
    start: Address,
    extent: usize,
    pub eden: CopySpace,
    survivors: [CopySpace; 2],
    /// Index of the `to` survivor space.
    to: usize,
}

impl Nursery {
    pub fn new(eden_size: usize, survivor_size: usize) -> std::io::Result<Self> {
        let extent = eden_size + 2 * survivor_size;
        let start = memory::dzmmap_anywhere(extent.max(BYTES_IN_PAGE))?;
        let survivor0 = start + eden_size;
        let survivor1 = survivor0 + survivor_size;
        debug!(
            "Created young generation at {}: eden {} bytes, survivors {} bytes each",
            start, eden_size, survivor_size
        );
        Ok(Nursery {
            start,
            extent,
            eden: CopySpace::new("eden", start, eden_size),
            survivors: [
                CopySpace::new("from", survivor0, survivor_size),
                CopySpace::new("to", survivor1, survivor_size),
            ],
            to: 1,
        })
    }

    pub fn from_survivor(&self) -> &CopySpace {
        &self.survivors[1 - self.to]
    }

    pub fn to_survivor(&self) -> &CopySpace {
        &self.survivors[self.to]
    }

    pub fn to_survivor_mut(&mut self) -> &mut CopySpace {
        &mut self.survivors[self.to]
    }

    /// Is `addr` anywhere in the young generation?
    pub fn in_nursery(&self, addr: Address) -> bool {
        addr.is_in_range(self.start, self.start + self.extent)
    }

    /// Is `addr` in the part of the young generation that the next minor collection evacuates?
    pub fn in_from(&self, addr: Address) -> bool {
        self.eden.contains(addr) || self.from_survivor().contains(addr)
    }

    pub fn in_to(&self, addr: Address) -> bool {
        self.to_survivor().contains(addr)
    }

    /// The number of objects that the next minor collection may have to evacuate.
    pub fn objects_in_from(&self) -> usize {
        self.eden.object_count() + self.from_survivor().object_count()
    }

    /// Iterate over the objects in eden and in the `from` survivor space.
    pub fn from_objects(&self) -> impl Iterator<Item = ObjectReference> + '_ {
        self.eden.object_iter().chain(self.from_survivor().object_iter())
    }

    /// Is `addr` the start of a young object that the mutator may hold?
    pub fn is_object(&self, addr: Address) -> bool {
        self.eden.is_object(addr) || self.from_survivor().is_object(addr)
    }

    /// End of a minor collection: discard eden and `from`, and let the survivors become `from`.
    pub fn release(&mut self) {
        debug_assert!(!self.to_survivor().has_unscanned_objects());
        self.eden.reset();
        self.survivors[1 - self.to].reset();
        self.to = 1 - self.to;
        self.survivors[self.to].rename("to");
        self.survivors[1 - self.to].rename("from");
    }

    pub fn spaces(&self) -> [&CopySpace; 3] {
        [&self.eden, self.from_survivor(), self.to_survivor()]
    }
}

impl Drop for Nursery {
    fn drop(&mut self) {
        if let Err(e) = memory::munmap(self.start, self.extent.max(BYTES_IN_PAGE)) {
            warn!("Failed to unmap the young generation at {}: {}", self.start, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::constants::HEADER_BYTES;
    use crate::util::header;

    #[test]
    fn layout_and_flip() {
        let mut nursery = Nursery::new(4 * HEADER_BYTES, 2 * HEADER_BYTES).unwrap();
        let eden_object = header::initialize_header(nursery.eden.alloc(HEADER_BYTES).unwrap(), 0, HEADER_BYTES);
        assert!(nursery.in_nursery(eden_object.to_raw_address()));
        assert!(nursery.in_from(eden_object.to_raw_address()));
        assert!(nursery.is_object(eden_object.to_raw_address()));
        assert_eq!(nursery.objects_in_from(), 1);

        let survivor = nursery.to_survivor_mut().copy_object(eden_object, 1).unwrap();
        assert!(nursery.in_to(survivor.to_raw_address()));
        assert!(!nursery.in_from(survivor.to_raw_address()));
        assert_eq!(nursery.to_survivor_mut().next_unscanned(), Some(survivor));

        nursery.release();
        assert_eq!(nursery.eden.object_count(), 0);
        assert!(nursery.in_from(survivor.to_raw_address()));
        assert!(!nursery.in_to(survivor.to_raw_address()));
        assert_eq!(nursery.from_objects().collect::<Vec<_>>(), vec![survivor]);
        assert_eq!(nursery.from_survivor().name(), "from");
        assert_eq!(nursery.to_survivor().name(), "to");
        assert_eq!(nursery.to_survivor().used_bytes(), 0);
    }
}
