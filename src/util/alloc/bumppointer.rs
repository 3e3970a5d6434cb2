use crate::util::Address;

/// A contiguous bump allocation region with a Cheney scan cursor.
///
/// `start <= scan <= cursor <= limit` always holds. Objects are allocated at `cursor`; a copying
/// collection scans the objects between `scan` and `cursor` and advances `scan` past them.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct BumpPointer {
    start: Address,
    /// The next allocation address.
    pub cursor: Address,
    /// The end of the region.
    pub limit: Address,
    /// The next object to scan.
    pub scan: Address,
}

impl BumpPointer {
    pub fn new(start: Address, size: usize) -> Self {
        BumpPointer {
            start,
            cursor: start,
            limit: start + size,
            scan: start,
        }
    }

    /// Bump allocate `size` bytes. Returns `None`, leaving the cursor untouched, if the region
    /// cannot hold them.
    pub fn alloc(&mut self, size: usize) -> Option<Address> {
        let result = self.cursor;
        if self.limit.get_extent(result) < size {
            trace!(
                "Bump allocation of {} bytes failed: cursor {}, limit {}",
                size,
                self.cursor,
                self.limit
            );
            return None;
        }
        self.cursor = result + size;
        Some(result)
    }

    /// Rewind the allocation and scan cursors to the start.
    pub fn reset(&mut self) {
        self.cursor = self.start;
        self.scan = self.start;
    }

    pub fn start(&self) -> Address {
        self.start
    }

    /// Is `addr` within the region, allocated or not?
    pub fn contains(&self, addr: Address) -> bool {
        addr.is_in_range(self.start, self.limit)
    }

    /// Is `addr` within the allocated part of the region?
    pub fn contains_allocated(&self, addr: Address) -> bool {
        addr.is_in_range(self.start, self.cursor)
    }

    pub fn capacity(&self) -> usize {
        self.limit - self.start
    }

    pub fn used(&self) -> usize {
        self.cursor - self.start
    }

    pub fn free(&self) -> usize {
        self.limit - self.cursor
    }

    /// Are there allocated objects that have not been scanned?
    pub fn has_unscanned(&self) -> bool {
        self.scan < self.cursor
    }
}
