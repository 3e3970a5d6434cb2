//! The interface between the heap and the mutator: how objects are laid out, how the mutator
//! exposes its roots, and how it is told about finalizable objects.

mod finalizable;
mod object_model;
mod scanning;
pub mod slot;

pub use self::finalizable::{FinalizerCallback, FinalizerError};
pub use self::object_model::{
    copy_object, initialize_object, ClassDescriptor, ClassError, ClassId, ClassRegistry,
    CleanupHook,
};
pub use self::scanning::{ObjectTracer, RootHandle, RootSet, RootTable};
pub use self::slot::SimpleSlot;
