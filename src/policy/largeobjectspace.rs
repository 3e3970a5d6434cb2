use crate::policy::space::{Reclaimed, Space};
use crate::util::alloc::AllocationError;
use crate::util::conversions;
use crate::util::header;
use crate::util::memory;
use crate::util::{Address, ObjectReference};
use std::collections::BTreeMap;

/// Objects too large for an old generation node. Each object gets its own mapping. Large objects
/// belong to the old generation: they are never moved, and only a major collection reclaims them.
pub struct LargeObjectSpace {
    /// Start of each mapping, and its size in bytes.
    chunks: BTreeMap<Address, usize>,
    /// The maximum number of mapped bytes.
    budget: usize,
    mapped: usize,
}

impl LargeObjectSpace {
    pub fn new(budget: usize) -> Self {
        LargeObjectSpace {
            chunks: BTreeMap::new(),
            budget,
            mapped: 0,
        }
    }

    /// Map a chunk for an object of `size` bytes. Returns the object address.
    pub fn alloc(&mut self, size: usize) -> Result<Address, AllocationError> {
        let bytes = conversions::pages_to_bytes(conversions::bytes_to_pages_up(size));
        if self.mapped + bytes > self.budget {
            trace!(
                "Large object of {} bytes exceeds the budget ({} of {} bytes mapped)",
                size,
                self.mapped,
                self.budget
            );
            return Err(AllocationError::LargeObjectSpaceOutOfMemory);
        }
        let start = memory::dzmmap_anywhere(bytes).map_err(|e| {
            warn!("Failed to map {} bytes for a large object: {}", bytes, e);
            AllocationError::MmapOutOfMemory
        })?;
        self.chunks.insert(start, bytes);
        self.mapped += bytes;
        trace!("Allocated large object at {} ({} bytes)", start, size);
        Ok(start)
    }

    /// Iterate over the objects in address order.
    pub fn object_iter(&self) -> impl Iterator<Item = ObjectReference> + '_ {
        self.chunks
            .keys()
            .map(|start| unsafe { ObjectReference::from_raw_address_unchecked(*start) })
    }

    /// Unmap every unmarked object and clear the marks of the others.
    pub fn sweep<F: FnMut(ObjectReference)>(&mut self, mut on_reclaim: F) -> Reclaimed {
        let mut reclaimed = Reclaimed::default();
        let mut dead = vec![];
        for object in self.object_iter() {
            if header::is_marked(object) {
                header::clear_mark(object);
            } else {
                on_reclaim(object);
                reclaimed.record(header::object_size(object));
                dead.push(object.to_raw_address());
            }
        }
        for start in dead {
            if let Some(bytes) = self.chunks.remove(&start) {
                self.mapped -= bytes;
                if let Err(e) = memory::munmap(start, bytes) {
                    warn!("Failed to unmap large object at {}: {}", start, e);
                }
            }
        }
        debug!(
            "Swept {}: {} objects reclaimed, {} bytes mapped",
            self.name(),
            reclaimed.objects,
            self.mapped
        );
        reclaimed
    }
}

impl Space for LargeObjectSpace {
    fn name(&self) -> &'static str {
        "los"
    }

    fn contains(&self, addr: Address) -> bool {
        self.chunks
            .range(..=addr)
            .next_back()
            .is_some_and(|(start, bytes)| addr.is_in_range(*start, *start + *bytes))
    }

    fn is_object(&self, addr: Address) -> bool {
        self.chunks.contains_key(&addr)
    }

    fn reserved_bytes(&self) -> usize {
        self.budget
    }

    fn used_bytes(&self) -> usize {
        self.mapped
    }

    fn object_count(&self) -> usize {
        self.chunks.len()
    }
}

impl Drop for LargeObjectSpace {
    fn drop(&mut self) {
        for (start, bytes) in std::mem::take(&mut self.chunks) {
            if let Err(e) = memory::munmap(start, bytes) {
                warn!("Failed to unmap large object at {}: {}", start, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::constants::BYTES_IN_PAGE;

    fn alloc(los: &mut LargeObjectSpace, size: usize) -> ObjectReference {
        let addr = los.alloc(size).unwrap();
        header::initialize_header(addr, 0, size)
    }

    #[test]
    fn alloc_within_budget() {
        let mut los = LargeObjectSpace::new(2 * BYTES_IN_PAGE);
        let a = alloc(&mut los, 1000);
        assert!(los.contains(a.to_raw_address()));
        assert!(los.contains(a.to_raw_address() + (BYTES_IN_PAGE - 1)));
        assert!(los.is_object(a.to_raw_address()));
        assert!(!los.is_object(a.to_raw_address() + 8usize));
        assert_eq!(los.used_bytes(), BYTES_IN_PAGE);
        let _b = alloc(&mut los, 1000);
        assert_eq!(los.alloc(1000), Err(AllocationError::LargeObjectSpaceOutOfMemory));
        assert_eq!(los.object_count(), 2);
    }

    #[test]
    fn sweep_unmaps_dead_objects() {
        let mut los = LargeObjectSpace::new(4 * BYTES_IN_PAGE);
        let a = alloc(&mut los, 2000);
        let b = alloc(&mut los, BYTES_IN_PAGE + 8);
        header::attempt_mark(a);
        let mut dead = vec![];
        let reclaimed = los.sweep(|o| dead.push(o));
        assert_eq!(dead, vec![b]);
        assert_eq!(reclaimed.bytes, BYTES_IN_PAGE + 8);
        assert!(!los.contains(b.to_raw_address()));
        assert!(!header::is_marked(a));
        assert_eq!(los.used_bytes(), BYTES_IN_PAGE);
        // The freed budget can be reused.
        let _c = alloc(&mut los, 2 * BYTES_IN_PAGE);
        assert_eq!(los.object_count(), 2);
    }
}
