//! The object header.
//!
//! Every object starts with three words:
//!
//! | word | content |
//! |------|---------|
//! | 0    | class index (`u32`), total object size in bytes (`u32`) |
//! | 1    | status word ([`HeaderWord`]) |
//! | 2    | forwarding pointer, zero while the object is not forwarded |
//!
//! The payload follows the header.

use crate::util::constants::*;
use crate::util::{Address, ObjectReference};
use std::fmt;

static_assertions::const_assert!(2 * std::mem::size_of::<u32>() <= BYTES_IN_WORD);
static_assertions::const_assert_eq!(std::mem::size_of::<HeaderWord>(), BYTES_IN_WORD);

const CLASS_OFFSET: usize = 0;
const SIZE_OFFSET: usize = std::mem::size_of::<u32>();
const STATUS_OFFSET: usize = BYTES_IN_WORD;
const FORWARDING_OFFSET: usize = 2 * BYTES_IN_WORD;

const MARK_BIT: usize = 1 << 0;
const FORWARDED_BIT: usize = 1 << 1;
const REMEMBERED_BIT: usize = 1 << 2;
const AGE_SHIFT: usize = 8;
const AGE_MASK: usize = (u8::MAX as usize) << AGE_SHIFT;

/// The packed status word of an object: mark, forwarded and remembered bits, and the age.
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub struct HeaderWord(usize);

impl HeaderWord {
    /// A fresh status word: unmarked, unforwarded, not remembered, age zero.
    pub const fn new() -> Self {
        HeaderWord(0)
    }

    pub fn is_marked(self) -> bool {
        self.0 & MARK_BIT != 0
    }

    pub fn set_marked(&mut self, marked: bool) {
        self.set_bit(MARK_BIT, marked)
    }

    pub fn is_forwarded(self) -> bool {
        self.0 & FORWARDED_BIT != 0
    }

    pub fn set_forwarded(&mut self, forwarded: bool) {
        self.set_bit(FORWARDED_BIT, forwarded)
    }

    pub fn is_remembered(self) -> bool {
        self.0 & REMEMBERED_BIT != 0
    }

    pub fn set_remembered(&mut self, remembered: bool) {
        self.set_bit(REMEMBERED_BIT, remembered)
    }

    /// The number of minor collections this object has survived in the young generation.
    pub fn age(self) -> u8 {
        ((self.0 & AGE_MASK) >> AGE_SHIFT) as u8
    }

    pub fn set_age(&mut self, age: u8) {
        self.0 = (self.0 & !AGE_MASK) | ((age as usize) << AGE_SHIFT);
    }

    /// The status word of a fresh copy of an object: all collector bits are cleared, the age is kept.
    pub fn for_copy(self) -> HeaderWord {
        let mut word = HeaderWord::new();
        word.set_age(self.age());
        word
    }

    fn set_bit(&mut self, bit: usize, value: bool) {
        if value {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }
    }
}

impl fmt::Debug for HeaderWord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("HeaderWord")
            .field("marked", &self.is_marked())
            .field("forwarded", &self.is_forwarded())
            .field("remembered", &self.is_remembered())
            .field("age", &self.age())
            .finish()
    }
}

/// Write a fresh header at `addr` and return the object reference.
pub fn initialize_header(addr: Address, class_index: u32, size: usize) -> ObjectReference {
    debug_assert!(!addr.is_zero());
    debug_assert!(size >= MIN_OBJECT_SIZE && size <= u32::MAX as usize);
    unsafe {
        (addr + CLASS_OFFSET).store::<u32>(class_index);
        (addr + SIZE_OFFSET).store::<u32>(size as u32);
        (addr + STATUS_OFFSET).store::<HeaderWord>(HeaderWord::new());
        (addr + FORWARDING_OFFSET).store::<usize>(0);
        ObjectReference::from_raw_address_unchecked(addr)
    }
}

pub fn class_index(object: ObjectReference) -> u32 {
    unsafe { (object.to_raw_address() + CLASS_OFFSET).load::<u32>() }
}

/// The total size of the object in bytes, header included.
pub fn object_size(object: ObjectReference) -> usize {
    unsafe { (object.to_raw_address() + SIZE_OFFSET).load::<u32>() as usize }
}

/// The start of the field area.
pub fn payload(object: ObjectReference) -> Address {
    object.to_raw_address() + HEADER_BYTES
}

/// The address right after the object.
pub fn object_end(object: ObjectReference) -> Address {
    object.to_raw_address() + object_size(object)
}

pub fn load_status(object: ObjectReference) -> HeaderWord {
    unsafe { (object.to_raw_address() + STATUS_OFFSET).load::<HeaderWord>() }
}

pub fn store_status(object: ObjectReference, status: HeaderWord) {
    unsafe { (object.to_raw_address() + STATUS_OFFSET).store::<HeaderWord>(status) }
}

/// Read-modify-write the status word.
pub fn update_status<F: FnOnce(&mut HeaderWord)>(object: ObjectReference, f: F) {
    let mut status = load_status(object);
    f(&mut status);
    store_status(object, status);
}

pub fn is_marked(object: ObjectReference) -> bool {
    load_status(object).is_marked()
}

/// Set the mark bit. Returns true if the object was not marked before.
pub fn attempt_mark(object: ObjectReference) -> bool {
    let mut status = load_status(object);
    if status.is_marked() {
        return false;
    }
    status.set_marked(true);
    store_status(object, status);
    true
}

pub fn clear_mark(object: ObjectReference) {
    update_status(object, |s| s.set_marked(false))
}

pub fn is_remembered(object: ObjectReference) -> bool {
    load_status(object).is_remembered()
}

pub fn set_remembered(object: ObjectReference, remembered: bool) {
    update_status(object, |s| s.set_remembered(remembered))
}

pub fn age(object: ObjectReference) -> u8 {
    load_status(object).age()
}

pub fn is_forwarded(object: ObjectReference) -> bool {
    load_status(object).is_forwarded()
}

/// Read the forwarding word. `None` if it has not been written.
pub fn read_forwarding_pointer(object: ObjectReference) -> Option<ObjectReference> {
    ObjectReference::from_slot_value(unsafe {
        (object.to_raw_address() + FORWARDING_OFFSET).load::<usize>()
    })
}

/// Write the forwarding word without touching the forwarded bit. Mark-compact uses the word alone
/// to carry the target of a live object during compaction.
pub fn write_forwarding_pointer(object: ObjectReference, target: Option<ObjectReference>) {
    unsafe {
        (object.to_raw_address() + FORWARDING_OFFSET)
            .store::<usize>(ObjectReference::to_slot_value(target))
    }
}

/// Mark `object` as moved to `new_object`.
pub fn forward_object(object: ObjectReference, new_object: ObjectReference) {
    debug_assert!(
        !is_forwarded(object),
        "{} is already forwarded to {:?}",
        object,
        read_forwarding_pointer(object)
    );
    write_forwarding_pointer(object, Some(new_object));
    update_status(object, |s| s.set_forwarded(true));
}

/// The current location of a forwarded young object.
pub fn get_forwarded_object(object: ObjectReference) -> Option<ObjectReference> {
    if is_forwarded(object) {
        read_forwarding_pointer(object)
    } else {
        None
    }
}
