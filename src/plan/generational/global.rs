use super::nursery::Nursery;
use super::remset::RememberedSet;
use super::CollectionKind;
use crate::plan::AllocationSemantics;
use crate::policy::largeobjectspace::LargeObjectSpace;
use crate::policy::marksweepspace::MarkSweepSpace;
use crate::policy::space::Space;
use crate::util::alloc::AllocationError;
use crate::util::heap::{HeapLayout, HeapUsage, SpaceUsage};
use crate::util::options::{MajorCollector, Options};
use crate::util::{Address, ObjectReference};

/// Where an address lies, as far as the mutator is concerned.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ObjectPosition {
    /// The start of an object the mutator may hold.
    Valid,
    /// Inside the to-survivor space, which holds no object between collections. A mutator that
    /// holds such an address kept a reference across a collection without a root.
    InWrongYoungHalf,
    /// Not an object of this heap.
    Unknown,
}

/// The spaces of a generational heap, and the policies that decide where objects go and what
/// kind of collection is needed.
pub struct Gen {
    pub nursery: Nursery,
    pub mature: MarkSweepSpace,
    pub los: LargeObjectSpace,
    pub remset: RememberedSet,
    pub major_collector: MajorCollector,
    pub promotion_age: u8,
    large_object_threshold: usize,
    full_heap_every: usize,
    /// Collections done so far, of any kind.
    collection_count: usize,
    /// Bytes allocated since the last collection, for stress testing.
    allocation_bytes: usize,
}

impl Gen {
    pub fn new(layout: &HeapLayout, options: &Options) -> std::io::Result<Self> {
        Ok(Gen {
            nursery: Nursery::new(layout.eden_size, layout.survivor_size)?,
            mature: MarkSweepSpace::new(layout.old_size(), layout.node_size)?,
            los: LargeObjectSpace::new(layout.los_size),
            remset: RememberedSet::new(),
            major_collector: options.major_collector,
            promotion_age: options.promotion_age,
            large_object_threshold: layout.large_object_threshold,
            full_heap_every: options.full_heap_every,
            collection_count: 0,
            allocation_bytes: 0,
        })
    }

    /// Decide where an object of `size` bytes goes.
    pub fn select_semantics(
        &self,
        size: usize,
        requested: AllocationSemantics,
    ) -> AllocationSemantics {
        match requested {
            AllocationSemantics::Default if size > self.large_object_threshold => {
                AllocationSemantics::Los
            }
            AllocationSemantics::Default if size > self.nursery.eden.reserved_bytes() => {
                AllocationSemantics::Mature
            }
            AllocationSemantics::Mature if size > self.mature.node_capacity() => {
                AllocationSemantics::Los
            }
            _ => requested,
        }
    }

    pub fn alloc_young(&mut self, size: usize) -> Option<Address> {
        self.allocation_bytes += size;
        self.nursery.eden.alloc(size)
    }

    pub fn alloc_mature(&mut self, size: usize) -> Option<Address> {
        self.allocation_bytes += size;
        self.mature.alloc(size)
    }

    pub fn alloc_los(&mut self, size: usize) -> Result<Address, AllocationError> {
        self.allocation_bytes += size;
        self.los.alloc(size)
    }

    /// Has the mutator allocated `stress_factor` bytes since the last collection?
    pub fn stress_collection_due(&self, stress_factor: usize) -> bool {
        self.allocation_bytes >= stress_factor
    }

    /// Turn a requested collection into the collection that will actually run. A minor
    /// collection escalates to a major one when it is forced by `full_heap_every`, or when the
    /// old generation may not have room for every object that could be promoted.
    pub fn select_collection_kind(&self, requested: CollectionKind) -> CollectionKind {
        if requested == CollectionKind::Major {
            return CollectionKind::Major;
        }
        if self.full_heap_every > 0 && (self.collection_count + 1) % self.full_heap_every == 0 {
            debug!("Collection {} is forced to be a major collection", self.collection_count + 1);
            return CollectionKind::Major;
        }
        let candidates = self.nursery.objects_in_from();
        if self.mature.free_nodes() < candidates {
            debug!(
                "{} free old nodes for {} young objects, escalate to a major collection",
                self.mature.free_nodes(),
                candidates
            );
            return CollectionKind::Major;
        }
        CollectionKind::Minor
    }

    /// Called at the end of every collection.
    pub fn end_of_gc(&mut self) {
        self.collection_count += 1;
        self.allocation_bytes = 0;
    }

    pub fn collection_count(&self) -> usize {
        self.collection_count
    }

    /// Is `addr` in the young generation?
    pub fn is_young(&self, addr: Address) -> bool {
        self.nursery.in_nursery(addr)
    }

    /// Is `addr` in the old generation, including the large object space?
    pub fn is_mature(&self, addr: Address) -> bool {
        self.mature.contains(addr) || self.los.contains(addr)
    }

    /// Is `addr` inside any space of this heap?
    pub fn is_heap_address(&self, addr: Address) -> bool {
        self.is_young(addr) || self.is_mature(addr)
    }

    pub fn object_position(&self, addr: Address) -> ObjectPosition {
        if self.nursery.in_to(addr) {
            ObjectPosition::InWrongYoungHalf
        } else if self.nursery.is_object(addr)
            || self.mature.is_object(addr)
            || self.los.is_object(addr)
        {
            ObjectPosition::Valid
        } else {
            ObjectPosition::Unknown
        }
    }

    /// Iterate over every object of the heap that the mutator may hold.
    pub fn all_objects(&self) -> impl Iterator<Item = ObjectReference> + '_ {
        self.nursery
            .from_objects()
            .chain(self.mature.object_iter())
            .chain(self.los.object_iter())
    }

    pub fn heap_usage(&self) -> HeapUsage {
        let [eden, from, to] = self.nursery.spaces();
        let spaces: [&dyn Space; 5] = [eden, from, to, &self.mature, &self.los];
        HeapUsage {
            spaces: spaces.iter().map(|s| SpaceUsage::of(*s)).collect(),
            remembered: self.remset.len(),
            finalizable_candidates: 0,
            ready_for_finalize: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::constants::*;

    fn gen(options: &Options) -> Gen {
        let layout = HeapLayout::from_options(options).unwrap();
        Gen::new(&layout, options).unwrap()
    }

    #[test]
    fn semantics_by_size() {
        let options = Options {
            eden_size: 1024,
            survivor_size: 256,
            old_size: 16 * DEFAULT_NODE_SIZE,
            ..Options::default()
        };
        let plan = gen(&options);
        let capacity = DEFAULT_NODE_SIZE - NODE_HEADER_BYTES;
        assert_eq!(
            plan.select_semantics(HEADER_BYTES, AllocationSemantics::Default),
            AllocationSemantics::Default
        );
        assert_eq!(
            plan.select_semantics(capacity + BYTES_IN_WORD, AllocationSemantics::Default),
            AllocationSemantics::Los
        );
        assert_eq!(
            plan.select_semantics(capacity, AllocationSemantics::Mature),
            AllocationSemantics::Mature
        );
        assert_eq!(
            plan.select_semantics(capacity + BYTES_IN_WORD, AllocationSemantics::Mature),
            AllocationSemantics::Los
        );
    }

    #[test]
    fn small_eden_routes_to_old() {
        let options = Options {
            eden_size: 32,
            survivor_size: 32,
            old_size: 4 * DEFAULT_NODE_SIZE,
            ..Options::default()
        };
        let plan = gen(&options);
        assert_eq!(
            plan.select_semantics(48, AllocationSemantics::Default),
            AllocationSemantics::Mature
        );
    }

    #[test]
    fn escalate_when_old_is_short() {
        let options = Options {
            eden_size: 1024,
            survivor_size: 256,
            old_size: 2 * DEFAULT_NODE_SIZE,
            ..Options::default()
        };
        let mut plan = gen(&options);
        assert_eq!(plan.select_collection_kind(CollectionKind::Minor), CollectionKind::Minor);
        for _ in 0..3 {
            plan.alloc_young(HEADER_BYTES).unwrap();
        }
        assert_eq!(plan.select_collection_kind(CollectionKind::Minor), CollectionKind::Major);
    }

    #[test]
    fn full_heap_every() {
        let options = Options {
            full_heap_every: 3,
            ..Options::default()
        };
        let mut plan = gen(&options);
        let kinds: Vec<CollectionKind> = (0..6)
            .map(|_| {
                let kind = plan.select_collection_kind(CollectionKind::Minor);
                plan.end_of_gc();
                kind
            })
            .collect();
        use CollectionKind::*;
        assert_eq!(kinds, vec![Minor, Minor, Major, Minor, Minor, Major]);
    }

    #[test]
    fn positions() {
        let options = Options::default();
        let mut plan = gen(&options);
        let young = plan.alloc_young(HEADER_BYTES).unwrap();
        crate::util::header::initialize_header(young, 0, HEADER_BYTES);
        let old = plan.alloc_mature(HEADER_BYTES).unwrap();
        crate::util::header::initialize_header(old, 0, HEADER_BYTES);
        assert!(plan.is_young(young) && !plan.is_mature(young));
        assert!(plan.is_mature(old) && !plan.is_young(old));
        assert_eq!(plan.object_position(young), ObjectPosition::Valid);
        assert_eq!(plan.object_position(old), ObjectPosition::Valid);
        assert_eq!(plan.object_position(young + BYTES_IN_WORD), ObjectPosition::Unknown);
        assert_eq!(
            plan.object_position(plan.nursery.to_survivor().start()),
            ObjectPosition::InWrongYoungHalf
        );
        assert_eq!(plan.all_objects().count(), 2);
        let usage = plan.heap_usage();
        assert_eq!(usage.objects(), 2);
        assert_eq!(usage.space("old").map(|s| s.used_bytes), Some(DEFAULT_NODE_SIZE));
    }
}
