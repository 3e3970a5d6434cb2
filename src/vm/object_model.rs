//! Class descriptors and the class registry.
//!
//! A class describes the payload of its instances: its size, and which payload words are strong
//! or weak reference slots. The collector walks objects only through these offset tables, so no
//! per-class code runs during tracing except the optional cleanup hook when an instance is
//! reclaimed.

use crate::util::constants::*;
use crate::util::conversions;
use crate::util::header;
use crate::util::memory;
use crate::util::{Address, ObjectReference};
use crate::vm::slot::SimpleSlot;
use std::fmt;

/// Identifies a registered class. It is stored in the header of every instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

impl ClassId {
    pub fn as_index(self) -> usize {
        self.0 as usize
    }
}

/// A hook that runs once when an instance of the class is reclaimed.
pub type CleanupHook = fn(ObjectReference);

/// The layout of a class. Offsets are payload-relative byte offsets.
#[derive(Clone, Debug)]
pub struct ClassDescriptor {
    pub name: String,
    /// Payload size in bytes, excluding the header.
    pub size: usize,
    /// Offsets of the strong reference slots.
    pub field_offsets: Vec<usize>,
    /// Offsets of the weak reference slots.
    pub weak_field_offsets: Vec<usize>,
    /// Instances are registered for finalization when allocated.
    pub finalizable: bool,
    pub cleanup: Option<CleanupHook>,
}

impl ClassDescriptor {
    /// A class with a payload of `size` bytes and no reference slots.
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        ClassDescriptor {
            name: name.into(),
            size,
            field_offsets: vec![],
            weak_field_offsets: vec![],
            finalizable: false,
            cleanup: None,
        }
    }

    pub fn with_fields(mut self, offsets: &[usize]) -> Self {
        self.field_offsets = offsets.to_vec();
        self
    }

    pub fn with_weak_fields(mut self, offsets: &[usize]) -> Self {
        self.weak_field_offsets = offsets.to_vec();
        self
    }

    pub fn with_finalizer(mut self) -> Self {
        self.finalizable = true;
        self
    }

    pub fn with_cleanup(mut self, hook: CleanupHook) -> Self {
        self.cleanup = Some(hook);
        self
    }

    /// The size of an instance including its header, rounded up to words.
    pub fn instance_size(&self) -> usize {
        conversions::word_align_up(HEADER_BYTES + self.size)
    }

    pub fn has_weak_fields(&self) -> bool {
        !self.weak_field_offsets.is_empty()
    }

    /// Is the payload offset a declared reference slot (strong or weak)?
    pub fn is_reference_field(&self, offset: usize) -> bool {
        self.field_offsets.contains(&offset) || self.weak_field_offsets.contains(&offset)
    }

    /// Visit every strong reference slot of `object`.
    pub fn for_each_strong_slot<F: FnMut(SimpleSlot)>(&self, object: ObjectReference, mut f: F) {
        let payload = header::payload(object);
        for offset in self.field_offsets.iter() {
            f(SimpleSlot::from_address(payload + *offset));
        }
    }

    /// Visit every weak reference slot of `object`.
    pub fn for_each_weak_slot<F: FnMut(SimpleSlot)>(&self, object: ObjectReference, mut f: F) {
        let payload = header::payload(object);
        for offset in self.weak_field_offsets.iter() {
            f(SimpleSlot::from_address(payload + *offset));
        }
    }

    /// Visit every reference slot of `object`, strong ones first.
    pub fn for_each_slot<F: FnMut(SimpleSlot)>(&self, object: ObjectReference, mut f: F) {
        self.for_each_strong_slot(object, &mut f);
        self.for_each_weak_slot(object, &mut f);
    }

    fn validate(&self) -> Result<(), ClassError> {
        if self.size > u32::MAX as usize - HEADER_BYTES - BYTES_IN_WORD {
            return Err(ClassError::TooLarge {
                class: self.name.clone(),
                size: self.size,
            });
        }
        for (i, offset) in self.field_offsets.iter().chain(self.weak_field_offsets.iter()).enumerate() {
            if !conversions::raw_is_aligned(*offset, BYTES_IN_WORD) {
                return Err(ClassError::MisalignedOffset {
                    class: self.name.clone(),
                    offset: *offset,
                });
            }
            if offset.checked_add(BYTES_IN_WORD).map_or(true, |end| end > self.size) {
                return Err(ClassError::OffsetOutOfBounds {
                    class: self.name.clone(),
                    offset: *offset,
                    size: self.size,
                });
            }
            if self
                .field_offsets
                .iter()
                .chain(self.weak_field_offsets.iter())
                .take(i)
                .any(|o| o == offset)
            {
                return Err(if self.field_offsets.contains(offset) && self.weak_field_offsets.contains(offset) {
                    ClassError::StrongAndWeak {
                        class: self.name.clone(),
                        offset: *offset,
                    }
                } else {
                    ClassError::DuplicateOffset {
                        class: self.name.clone(),
                        offset: *offset,
                    }
                });
            }
        }
        Ok(())
    }
}

/// Why a class descriptor was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassError {
    /// A reference offset is not word aligned.
    MisalignedOffset { class: String, offset: usize },
    /// A reference slot does not fit in the payload.
    OffsetOutOfBounds {
        class: String,
        offset: usize,
        size: usize,
    },
    /// An offset is declared both strong and weak.
    StrongAndWeak { class: String, offset: usize },
    /// An offset is declared twice.
    DuplicateOffset { class: String, offset: usize },
    /// The instance size does not fit in the header.
    TooLarge { class: String, size: usize },
    /// The registry is full.
    TooManyClasses,
}

impl fmt::Display for ClassError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ClassError::MisalignedOffset { class, offset } => {
                write!(f, "class {}: offset {} is not word aligned", class, offset)
            }
            ClassError::OffsetOutOfBounds {
                class,
                offset,
                size,
            } => write!(
                f,
                "class {}: slot at offset {} does not fit in a payload of {} bytes",
                class, offset, size
            ),
            ClassError::StrongAndWeak { class, offset } => {
                write!(f, "class {}: offset {} is both strong and weak", class, offset)
            }
            ClassError::DuplicateOffset { class, offset } => {
                write!(f, "class {}: offset {} is declared twice", class, offset)
            }
            ClassError::TooLarge { class, size } => {
                write!(f, "class {}: payload of {} bytes is too large", class, size)
            }
            ClassError::TooManyClasses => write!(f, "too many classes"),
        }
    }
}

impl std::error::Error for ClassError {}

/// All the classes known to a heap. Classes are never removed.
#[derive(Default, Debug)]
pub struct ClassRegistry {
    classes: Vec<ClassDescriptor>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register a class.
    pub fn register(&mut self, class: ClassDescriptor) -> Result<ClassId, ClassError> {
        class.validate()?;
        let index = u32::try_from(self.classes.len()).map_err(|_| ClassError::TooManyClasses)?;
        debug!(
            "Register class {} as {}: {} bytes, {} strong, {} weak slots",
            class.name,
            index,
            class.instance_size(),
            class.field_offsets.len(),
            class.weak_field_offsets.len()
        );
        self.classes.push(class);
        Ok(ClassId(index))
    }

    pub fn get(&self, id: ClassId) -> &ClassDescriptor {
        &self.classes[id.as_index()]
    }

    /// The class of an object, read from its header.
    pub fn class_of(&self, object: ObjectReference) -> &ClassDescriptor {
        &self.classes[header::class_index(object) as usize]
    }

    pub fn class_id_of(&self, object: ObjectReference) -> ClassId {
        ClassId(header::class_index(object))
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Run the cleanup hook of a reclaimed object, if its class has one.
    pub fn run_cleanup(&self, object: ObjectReference) {
        if let Some(hook) = self.class_of(object).cleanup {
            trace!("Cleanup {}", object);
            hook(object);
        }
    }
}

/// Write a fresh instance header of `class` at `addr`.
pub fn initialize_object(addr: Address, id: ClassId, class: &ClassDescriptor) -> ObjectReference {
    header::initialize_header(addr, id.0, class.instance_size())
}

/// Copy `from` to `to`. The copy has no collector bits set and keeps the age of the original.
pub fn copy_object(from: ObjectReference, to: Address) -> ObjectReference {
    let size = header::object_size(from);
    memory::memory_copy(from.to_raw_address(), to, size);
    let copy = unsafe { ObjectReference::from_raw_address_unchecked(to) };
    header::store_status(copy, header::load_status(from).for_copy());
    header::write_forwarding_pointer(copy, None);
    copy
}
