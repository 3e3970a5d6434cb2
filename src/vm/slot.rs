use crate::util::{Address, ObjectReference};
use std::fmt;

/// A reference slot: a word-sized field that holds either zero (null) or a raw word that may be a
/// heap reference. Values that do not point into the heap are left alone by the collector.
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct SimpleSlot {
    slot_addr: Address,
}

impl SimpleSlot {
    /// Create a simple slot from an address.
    pub fn from_address(address: Address) -> Self {
        debug_assert!(crate::util::conversions::is_address_aligned(address));
        Self { slot_addr: address }
    }

    /// Get the address of the slot.
    pub fn as_address(&self) -> Address {
        self.slot_addr
    }

    /// Load the raw word in the slot.
    pub fn load_raw(&self) -> usize {
        unsafe { self.slot_addr.load::<usize>() }
    }

    /// Load the slot as an object reference. Zero is `None`.
    pub fn load(&self) -> Option<ObjectReference> {
        ObjectReference::from_slot_value(self.load_raw())
    }

    /// Store an object reference, or null, into the slot.
    pub fn store(&self, object: Option<ObjectReference>) {
        unsafe { self.slot_addr.store::<usize>(ObjectReference::to_slot_value(object)) }
    }
}

impl fmt::Debug for SimpleSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slot_addr)
    }
}
