//! This module contains code useful for tracing,
//! i.e. visiting the reachable objects by traversing all or part of an object graph.

use crate::util::ObjectReference;
use crate::vm::ObjectTracer;

/// This trait represents an object queue to enqueue objects during tracing.
pub trait ObjectQueue {
    /// Enqueue an object into the queue.
    fn enqueue(&mut self, object: ObjectReference);
}

pub type VectorObjectQueue = VectorQueue<ObjectReference>;

/// An implementation of `ObjectQueue` using a `Vec`.
///
/// This can also be used as a buffer. For example, the mark stack or the promotion worklist.
pub struct VectorQueue<T> {
    /// Enqueued nodes.
    buffer: Vec<T>,
}

impl<T> VectorQueue<T> {
    /// Reserve a capacity of this on first enqueue to avoid frequent resizing.
    const CAPACITY: usize = 4096;

    /// Create an empty `VectorObjectQueue`.
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Return `true` if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Return the contents of the underlying vector.  It will empty the queue.
    pub fn take(&mut self) -> Vec<T> {
        std::mem::take(&mut self.buffer)
    }

    #[inline(always)]
    pub fn push(&mut self, v: T) {
        if self.buffer.is_empty() {
            self.buffer.reserve(Self::CAPACITY);
        }
        self.buffer.push(v);
    }

    /// Pop the most recently pushed element. Used as a stack, the queue gives a depth-first
    /// traversal with an explicit worklist instead of recursion.
    #[inline(always)]
    pub fn pop(&mut self) -> Option<T> {
        self.buffer.pop()
    }
}

impl<T> Default for VectorQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectQueue for VectorQueue<ObjectReference> {
    #[inline(always)]
    fn enqueue(&mut self, v: ObjectReference) {
        self.push(v);
    }
}

/// A collection in progress, as seen by the reference and finalizer processors. It can retain
/// more objects, and it can answer whether an object has been reached so far.
pub trait TraceContext: ObjectTracer {
    /// Is `object` live so far in this collection? Objects outside the spaces being collected
    /// are always live.
    fn is_live(&self, object: ObjectReference) -> bool;
    /// The location of a live object after this collection.
    fn get_forwarded_object(&self, object: ObjectReference) -> ObjectReference;
    /// Trace everything reachable from the objects retained so far.
    fn complete_closure(&mut self);
}
