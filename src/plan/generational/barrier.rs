//! The generational write barrier.

use super::global::Gen;
use crate::util::ObjectReference;
use crate::vm::SimpleSlot;

/// A barrier is a combination of fast-path behaviour and slow-path semantics around a reference
/// store. The store itself is done by [`Barrier::object_reference_write`], with the pre and post
/// hooks around it.
pub trait Barrier {
    /// Subsuming barrier for object reference write
    fn object_reference_write(
        &mut self,
        src: ObjectReference,
        slot: SimpleSlot,
        target: Option<ObjectReference>,
    ) {
        self.object_reference_write_pre(src, slot, target);
        slot.store(target);
        self.object_reference_write_post(src, slot, target);
    }

    /// Full pre-barrier for object reference write
    fn object_reference_write_pre(
        &mut self,
        _src: ObjectReference,
        _slot: SimpleSlot,
        _target: Option<ObjectReference>,
    ) {
    }

    /// Full post-barrier for object reference write
    fn object_reference_write_post(
        &mut self,
        _src: ObjectReference,
        _slot: SimpleSlot,
        _target: Option<ObjectReference>,
    ) {
    }
}

/// Object remembering barrier: an old object is remembered the first time a reference to a young
/// object is stored into it. The remembered bit in its header filters later stores.
impl Barrier for Gen {
    fn object_reference_write_post(
        &mut self,
        src: ObjectReference,
        _slot: SimpleSlot,
        target: Option<ObjectReference>,
    ) {
        let Some(target) = target else {
            return;
        };
        if self.is_young(target.to_raw_address())
            && self.is_mature(src.to_raw_address())
            && self.remset.remember(src)
        {
            trace!("Remember {} for a reference to young {}", src, target);
        }
    }
}
