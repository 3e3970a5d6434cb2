use crate::util::ObjectReference;
use std::fmt;

/// A finalizer reported a failure. The heap logs it and moves on to the next object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinalizerError {
    message: String,
}

impl FinalizerError {
    pub fn new(message: impl Into<String>) -> Self {
        FinalizerError {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for FinalizerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "finalizer failed: {}", self.message)
    }
}

impl std::error::Error for FinalizerError {}

/// The mutator's finalizer. It is called once for each finalizable object found unreachable,
/// after the collection that found it. The object is still valid during the call.
pub type FinalizerCallback =
    Box<dyn FnMut(ObjectReference) -> Result<(), FinalizerError> + Send>;
