use crate::policy::space::{Reclaimed, Space};
use crate::util::constants::*;
use crate::util::header;
use crate::util::memory;
use crate::util::{Address, ObjectReference};

const NEXT_OFFSET: usize = 0;
const SIZE_OFFSET: usize = BYTES_IN_WORD;
const USED_OFFSET: usize = BYTES_IN_WORD + std::mem::size_of::<u32>();

/// The old generation: a region of fixed size nodes, each holding at most one object.
///
/// A node is a two word header `{ next, size, used }` followed by the object. Free nodes are
/// chained through `next`. A major collection either sweeps the dead nodes back to the free
/// list, or compacts the live objects into the lowest nodes.
pub struct MarkSweepSpace {
    start: Address,
    node_size: usize,
    node_count: usize,
    /// The first free node. Zero if there is none.
    free_head: Address,
    free_nodes: usize,
}

impl MarkSweepSpace {
    /// Map `size` bytes and carve them into nodes of `node_size` bytes.
    pub fn new(size: usize, node_size: usize) -> std::io::Result<Self> {
        debug_assert!(node_size >= MIN_NODE_SIZE && node_size % BYTES_IN_WORD == 0);
        let node_count = size / node_size;
        let start = memory::dzmmap_anywhere((node_count * node_size).max(BYTES_IN_PAGE))?;
        let mut space = MarkSweepSpace {
            start,
            node_size,
            node_count,
            free_head: Address::ZERO,
            free_nodes: 0,
        };
        space.rebuild_free_list();
        debug!(
            "Created old generation at {}: {} nodes of {} bytes",
            start, node_count, node_size
        );
        Ok(space)
    }

    fn node(&self, index: usize) -> Address {
        debug_assert!(index < self.node_count);
        self.start + index * self.node_size
    }

    /// The node index of an object or node address in this space.
    pub fn node_index(&self, addr: Address) -> usize {
        (addr - self.start) / self.node_size
    }

    fn node_of(&self, object: ObjectReference) -> Address {
        self.node(self.node_index(object.to_raw_address()))
    }

    fn object_in(node: Address) -> ObjectReference {
        unsafe { ObjectReference::from_raw_address_unchecked(node + NODE_HEADER_BYTES) }
    }

    fn next_of(node: Address) -> Address {
        unsafe { (node + NEXT_OFFSET).load::<Address>() }
    }

    fn set_next(node: Address, next: Address) {
        unsafe { (node + NEXT_OFFSET).store::<Address>(next) }
    }

    fn is_used(node: Address) -> bool {
        unsafe { (node + USED_OFFSET).load::<u32>() != 0 }
    }

    /// The size of the object held by the node. Zero for a free node.
    fn size_of(node: Address) -> usize {
        unsafe { (node + SIZE_OFFSET).load::<u32>() as usize }
    }

    fn set_used(node: Address, object_size: usize) {
        unsafe {
            (node + SIZE_OFFSET).store::<u32>(object_size as u32);
            (node + USED_OFFSET).store::<u32>(1);
        }
    }

    fn clear_node(&self, node: Address) {
        memory::zero(node, self.node_size);
    }

    /// The largest object a node can hold.
    pub fn node_capacity(&self) -> usize {
        self.node_size - NODE_HEADER_BYTES
    }

    pub fn node_size(&self) -> usize {
        self.node_size
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn free_nodes(&self) -> usize {
        self.free_nodes
    }

    pub fn used_nodes(&self) -> usize {
        self.node_count - self.free_nodes
    }

    /// Pop the first free node for an object of `size` bytes. Returns the object address.
    pub fn alloc(&mut self, size: usize) -> Option<Address> {
        debug_assert!(
            size <= self.node_capacity(),
            "{} bytes do not fit in a node",
            size
        );
        if self.free_head.is_zero() {
            trace!("No free node for {} bytes", size);
            return None;
        }
        let node = self.free_head;
        debug_assert!(!Self::is_used(node));
        self.free_head = Self::next_of(node);
        self.free_nodes -= 1;
        Self::set_next(node, Address::ZERO);
        Self::set_used(node, size);
        trace!("Allocated node {} for {} bytes", self.node_index(node), size);
        Some(node + NODE_HEADER_BYTES)
    }

    /// Chain every unused node into the free list, lowest address first.
    fn rebuild_free_list(&mut self) {
        self.free_head = Address::ZERO;
        self.free_nodes = 0;
        for i in (0..self.node_count).rev() {
            let node = self.node(i);
            if !Self::is_used(node) {
                Self::set_next(node, self.free_head);
                self.free_head = node;
                self.free_nodes += 1;
            }
        }
    }

    /// Iterate over the objects in address order.
    pub fn object_iter(&self) -> impl Iterator<Item = ObjectReference> + '_ {
        (0..self.node_count)
            .map(|i| self.node(i))
            .filter(|node| Self::is_used(*node))
            .map(Self::object_in)
    }

    /// Reclaim every unmarked object and clear the marks of the others. `on_reclaim` is called
    /// for each dead object before its node is cleared.
    pub fn sweep<F: FnMut(ObjectReference)>(&mut self, mut on_reclaim: F) -> Reclaimed {
        let mut reclaimed = Reclaimed::default();
        for i in 0..self.node_count {
            let node = self.node(i);
            if !Self::is_used(node) {
                continue;
            }
            let object = Self::object_in(node);
            if header::is_marked(object) {
                header::clear_mark(object);
            } else {
                trace!("Sweep {} in node {}", object, i);
                on_reclaim(object);
                reclaimed.record(Self::size_of(node));
                self.clear_node(node);
            }
        }
        self.rebuild_free_list();
        debug!(
            "Swept {}: {} objects reclaimed, {} nodes free",
            self.name(),
            reclaimed.objects,
            self.free_nodes
        );
        reclaimed
    }

    /// Compaction pass 1. Reclaim every unmarked object, and assign each marked object, in address
    /// order, the next node from the bottom of the space. The target is kept in the forwarding
    /// word of the object until [`MarkSweepSpace::compact`] moves it.
    pub fn calculate_forwarding_pointers<F: FnMut(ObjectReference)>(
        &mut self,
        mut on_reclaim: F,
    ) -> Reclaimed {
        let mut reclaimed = Reclaimed::default();
        let mut to = 0;
        for i in 0..self.node_count {
            let node = self.node(i);
            if !Self::is_used(node) {
                continue;
            }
            let object = Self::object_in(node);
            if header::is_marked(object) {
                let target = Self::object_in(self.node(to));
                header::write_forwarding_pointer(object, Some(target));
                to += 1;
            } else {
                on_reclaim(object);
                reclaimed.record(Self::size_of(node));
                self.clear_node(node);
            }
        }
        debug!("Compaction: {} live objects", to);
        reclaimed
    }

    /// The location of a live object after compaction. Only valid between
    /// [`MarkSweepSpace::calculate_forwarding_pointers`] and [`MarkSweepSpace::compact`].
    pub fn get_forwarded_object(&self, object: ObjectReference) -> ObjectReference {
        debug_assert!(header::is_marked(object));
        header::read_forwarding_pointer(object).unwrap_or(object)
    }

    /// Compaction pass 3. Move every live object to its target node, clear marks and forwarding
    /// words, and put the nodes above the last live object back on the free list. Returns the
    /// number of objects that moved.
    pub fn compact(&mut self) -> usize {
        let mut moved = 0;
        for i in 0..self.node_count {
            let node = self.node(i);
            if !Self::is_used(node) {
                continue;
            }
            let object = Self::object_in(node);
            debug_assert!(header::is_marked(object));
            let target = self.get_forwarded_object(object);
            header::clear_mark(object);
            header::write_forwarding_pointer(object, None);
            if target != object {
                let size = header::object_size(object);
                let target_node = self.node_of(target);
                debug_assert!(target_node < node);
                self.clear_node(target_node);
                memory::memory_copy(object.to_raw_address(), target.to_raw_address(), size);
                Self::set_used(target_node, size);
                self.clear_node(node);
                trace!("Compact {} to {}", object, target);
                moved += 1;
            }
        }
        self.rebuild_free_list();
        debug!(
            "Compacted {}: {} objects moved, {} nodes free",
            self.name(),
            moved,
            self.free_nodes
        );
        moved
    }
}

impl Space for MarkSweepSpace {
    fn name(&self) -> &'static str {
        "old"
    }

    fn contains(&self, addr: Address) -> bool {
        addr.is_in_range(self.start, self.start + self.node_count * self.node_size)
    }

    fn is_object(&self, addr: Address) -> bool {
        self.contains(addr)
            && (addr - self.start) % self.node_size == NODE_HEADER_BYTES
            && Self::is_used(addr - NODE_HEADER_BYTES)
    }

    fn reserved_bytes(&self) -> usize {
        self.node_count * self.node_size
    }

    fn used_bytes(&self) -> usize {
        self.used_nodes() * self.node_size
    }

    fn object_count(&self) -> usize {
        self.used_nodes()
    }
}

impl Drop for MarkSweepSpace {
    fn drop(&mut self) {
        if let Err(e) = memory::munmap(self.start, (self.node_count * self.node_size).max(BYTES_IN_PAGE)) {
            warn!("Failed to unmap the old generation at {}: {}", self.start, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: usize = HEADER_BYTES + 2 * BYTES_IN_WORD;

    fn alloc(space: &mut MarkSweepSpace, tag: u32) -> ObjectReference {
        let addr = space.alloc(SIZE).unwrap();
        let object = header::initialize_header(addr, tag, SIZE);
        unsafe { header::payload(object).store::<usize>(tag as usize) };
        object
    }

    fn tag(object: ObjectReference) -> usize {
        unsafe { header::payload(object).load::<usize>() }
    }

    #[test]
    fn alloc_pops_nodes_in_address_order() {
        let mut space = MarkSweepSpace::new(10 * DEFAULT_NODE_SIZE, DEFAULT_NODE_SIZE).unwrap();
        assert_eq!(space.node_count(), 10);
        assert_eq!(space.free_nodes(), 10);
        let a = alloc(&mut space, 0);
        let b = alloc(&mut space, 1);
        assert_eq!(space.node_index(a.to_raw_address()), 0);
        assert_eq!(space.node_index(b.to_raw_address()), 1);
        assert!(space.is_object(a.to_raw_address()));
        assert!(!space.is_object(a.to_raw_address() + BYTES_IN_WORD));
        assert_eq!(space.free_nodes(), 8);
        for i in 2..10 {
            alloc(&mut space, i);
        }
        assert_eq!(space.alloc(SIZE), None);
        assert_eq!(space.object_iter().count(), 10);
    }

    #[test]
    fn sweep_reclaims_unmarked() {
        let mut space = MarkSweepSpace::new(10 * DEFAULT_NODE_SIZE, DEFAULT_NODE_SIZE).unwrap();
        let objects: Vec<ObjectReference> = (0..8).map(|i| alloc(&mut space, i)).collect();
        for (i, o) in objects.iter().enumerate() {
            if i % 3 != 1 {
                header::attempt_mark(*o);
            }
        }
        let mut dead = vec![];
        let reclaimed = space.sweep(|o| dead.push(tag(o)));
        assert_eq!(dead, vec![1, 4, 7]);
        assert_eq!(reclaimed.objects, 3);
        assert_eq!(reclaimed.bytes, 3 * SIZE);
        assert_eq!(space.free_nodes(), 5);
        assert!(space.object_iter().all(|o| !header::is_marked(o)));
        // The lowest free node is handed out first.
        let again = space.alloc(SIZE).unwrap();
        assert_eq!(space.node_index(again), 1);
    }

    #[test]
    fn compact_slides_live_objects_down() {
        let mut space = MarkSweepSpace::new(8 * DEFAULT_NODE_SIZE, DEFAULT_NODE_SIZE).unwrap();
        let objects: Vec<ObjectReference> = (0..6).map(|i| alloc(&mut space, i)).collect();
        for i in [1, 3, 5] {
            header::attempt_mark(objects[i]);
        }
        let mut dead = vec![];
        let reclaimed = space.calculate_forwarding_pointers(|o| dead.push(tag(o)));
        assert_eq!(dead, vec![0, 2, 4]);
        assert_eq!(reclaimed.objects, 3);
        let targets: Vec<ObjectReference> = [1, 3, 5]
            .iter()
            .map(|i| space.get_forwarded_object(objects[*i]))
            .collect();
        for (n, t) in targets.iter().enumerate() {
            assert_eq!(space.node_index(t.to_raw_address()), n);
        }
        assert_eq!(space.compact(), 3);
        let tags: Vec<usize> = space.object_iter().map(tag).collect();
        assert_eq!(tags, vec![1, 3, 5]);
        assert_eq!(space.object_iter().collect::<Vec<_>>(), targets);
        for t in targets {
            assert!(!header::is_marked(t));
            assert_eq!(header::read_forwarding_pointer(t), None);
        }
        assert_eq!(space.free_nodes(), 5);
        let next = space.alloc(SIZE).unwrap();
        assert_eq!(space.node_index(next), 3);
    }
}
