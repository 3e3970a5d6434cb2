use crate::policy::space::Space;
use crate::util::alloc::BumpPointer;
use crate::util::header;
use crate::util::linear_scan::ObjectIterator;
use crate::util::memory;
use crate::util::{Address, ObjectReference};
use crate::vm;

/// A bump allocated region that objects are allocated into or copied into. Eden and the two
/// survivor spaces of the young generation are copy spaces.
pub struct CopySpace {
    name: &'static str,
    region: BumpPointer,
    objects: usize,
}

impl CopySpace {
    pub fn new(name: &'static str, start: Address, size: usize) -> Self {
        CopySpace {
            name,
            region: BumpPointer::new(start, size),
            objects: 0,
        }
    }

    /// Allocate room for one object of `size` bytes.
    pub fn alloc(&mut self, size: usize) -> Option<Address> {
        let result = self.region.alloc(size)?;
        self.objects += 1;
        Some(result)
    }

    /// Copy `object` into this space with the given age. `None` if the space is full.
    pub fn copy_object(&mut self, object: ObjectReference, age: u8) -> Option<ObjectReference> {
        let to = self.alloc(header::object_size(object))?;
        let copy = vm::copy_object(object, to);
        header::update_status(copy, |s| s.set_age(age));
        trace!("Copy {} to {} in {} (age {})", object, copy, self.name, age);
        Some(copy)
    }

    /// Take the next object that has been allocated but not scanned yet, and advance the scan
    /// cursor past it.
    pub fn next_unscanned(&mut self) -> Option<ObjectReference> {
        if self.region.has_unscanned() {
            let object = unsafe { ObjectReference::from_raw_address_unchecked(self.region.scan) };
            self.region.scan += header::object_size(object);
            Some(object)
        } else {
            None
        }
    }

    pub fn has_unscanned_objects(&self) -> bool {
        self.region.has_unscanned()
    }

    /// Discard every object in the space. The used part is zeroed, so that the next objects
    /// allocated there start with null fields.
    pub fn reset(&mut self) {
        memory::zero(self.region.start(), self.region.used());
        self.region.reset();
        self.objects = 0;
    }

    /// Iterate over the allocated objects in address order.
    pub fn object_iter(&self) -> ObjectIterator {
        ObjectIterator::new(self.region.start(), self.region.cursor)
    }

    pub fn start(&self) -> Address {
        self.region.start()
    }

    pub fn cursor(&self) -> Address {
        self.region.cursor
    }

    pub fn limit(&self) -> Address {
        self.region.limit
    }

    pub fn rename(&mut self, name: &'static str) {
        self.name = name;
    }
}

impl Space for CopySpace {
    fn name(&self) -> &'static str {
        self.name
    }

    fn contains(&self, addr: Address) -> bool {
        self.region.contains(addr)
    }

    fn is_object(&self, addr: Address) -> bool {
        self.region.contains_allocated(addr)
            && self
                .object_iter()
                .take_while(|o| o.to_raw_address() <= addr)
                .any(|o| o.to_raw_address() == addr)
    }

    fn reserved_bytes(&self) -> usize {
        self.region.capacity()
    }

    fn used_bytes(&self) -> usize {
        self.region.used()
    }

    fn object_count(&self) -> usize {
        self.objects
    }
}
