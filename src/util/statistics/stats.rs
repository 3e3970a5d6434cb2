use super::counter::{EventCounter, SizeCounter, Timer};
use crate::plan::generational::CollectionKind;
use crate::plan::AllocationSemantics;
use crate::policy::space::Reclaimed;
use enum_map::EnumMap;
use std::fmt;
use std::time::Duration;

/// What one collection did.
#[derive(Copy, Clone, Debug, Default)]
pub struct GcStats {
    /// Young objects copied into the to-survivor space.
    pub copied: SizeCounter,
    /// Young objects copied into the old generation.
    pub promoted: SizeCounter,
    pub reclaimed: Reclaimed,
    /// Old objects moved by compaction.
    pub moved: EventCounter,
    pub weak_cleared: EventCounter,
    /// Objects found unreachable that now wait for their finalizer.
    pub finalizable_ready: EventCounter,
}

impl GcStats {
    pub fn merge(&mut self, other: &GcStats) {
        self.copied.merge(&other.copied);
        self.promoted.merge(&other.promoted);
        self.reclaimed += other.reclaimed;
        self.moved.inc_by(other.moved.get());
        self.weak_cleared.inc_by(other.weak_cleared.get());
        self.finalizable_ready.inc_by(other.finalizable_ready.get());
    }
}

impl fmt::Display for GcStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "copied {}, promoted {}, reclaimed {} ({} bytes), moved {}, weak cleared {}, ready to finalize {}",
            self.copied,
            self.promoted,
            self.reclaimed.objects,
            self.reclaimed.bytes,
            self.moved,
            self.weak_cleared,
            self.finalizable_ready
        )
    }
}

/// Totals since the heap was created.
#[derive(Default, Debug)]
pub struct Stats {
    pauses: EnumMap<CollectionKind, Timer>,
    allocated: EnumMap<AllocationSemantics, SizeCounter>,
    totals: GcStats,
    finalizers_run: EventCounter,
    finalizers_failed: EventCounter,
}

impl Stats {
    pub fn record_alloc(&mut self, semantics: AllocationSemantics, size: usize) {
        self.allocated[semantics].inc(size);
    }

    pub fn record_collection(&mut self, kind: CollectionKind, gc: &GcStats, pause: Duration) {
        self.pauses[kind].record(pause);
        self.totals.merge(gc);
    }

    pub fn record_finalizer(&mut self, succeeded: bool) {
        if succeeded {
            self.finalizers_run.inc();
        } else {
            self.finalizers_failed.inc();
        }
    }

    /// The number of collections of the given kind. A major collection that is followed by the
    /// evacuation of the young generation counts as one major collection.
    pub fn collections(&self, kind: CollectionKind) -> u64 {
        self.pauses[kind].count()
    }

    pub fn total_collections(&self) -> u64 {
        self.pauses.values().map(|t| t.count()).sum()
    }

    pub fn pause_time(&self, kind: CollectionKind) -> Duration {
        self.pauses[kind].total()
    }

    pub fn allocated(&self, semantics: AllocationSemantics) -> &SizeCounter {
        &self.allocated[semantics]
    }

    pub fn totals(&self) -> &GcStats {
        &self.totals
    }

    pub fn finalizers_run(&self) -> u64 {
        self.finalizers_run.get()
    }

    pub fn finalizers_failed(&self) -> u64 {
        self.finalizers_failed.get()
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "========================= genheap statistics totals =========================")?;
        for (kind, timer) in self.pauses.iter() {
            writeln!(f, "{} collections: {}, pause {}", kind, timer.count(), timer)?;
        }
        for (semantics, counter) in self.allocated.iter() {
            writeln!(f, "allocated {:?}: {}", semantics, counter)?;
        }
        writeln!(f, "{}", self.totals)?;
        writeln!(
            f,
            "finalizers run {}, failed {}",
            self.finalizers_run, self.finalizers_failed
        )?;
        write!(f, "----------------------- end genheap statistics totals -----------------------")
    }
}
