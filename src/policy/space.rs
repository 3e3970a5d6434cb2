use crate::util::Address;

/// Functions every space provides to the rest of the heap, regardless of its policy.
pub trait Space {
    /// The space name, used in logs and usage reports.
    fn name(&self) -> &'static str;
    /// Is `addr` inside the memory of this space?
    fn contains(&self, addr: Address) -> bool;
    /// Is `addr` the start of an object currently allocated in this space?
    fn is_object(&self, addr: Address) -> bool;
    /// The number of bytes this space can hold.
    fn reserved_bytes(&self) -> usize;
    /// The number of bytes in use.
    fn used_bytes(&self) -> usize;
    /// The number of objects currently allocated.
    fn object_count(&self) -> usize;

    fn free_bytes(&self) -> usize {
        self.reserved_bytes().saturating_sub(self.used_bytes())
    }
}

/// What a sweep or a compaction reclaimed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Reclaimed {
    pub objects: usize,
    pub bytes: usize,
}

impl Reclaimed {
    pub fn record(&mut self, object_bytes: usize) {
        self.objects += 1;
        self.bytes += object_bytes;
    }
}

impl std::ops::AddAssign for Reclaimed {
    fn add_assign(&mut self, other: Reclaimed) {
        self.objects += other.objects;
        self.bytes += other.bytes;
    }
}
