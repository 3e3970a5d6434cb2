//! Heap usage reports.

use crate::policy::space::Space;
use crate::util::conversions::bytes_to_formatted_string;
use std::fmt;

/// Capacity and usage of one space.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpaceUsage {
    pub name: &'static str,
    pub reserved_bytes: usize,
    pub used_bytes: usize,
    pub free_bytes: usize,
    pub objects: usize,
}

impl SpaceUsage {
    pub fn of(space: &dyn Space) -> SpaceUsage {
        SpaceUsage {
            name: space.name(),
            reserved_bytes: space.reserved_bytes(),
            used_bytes: space.used_bytes(),
            free_bytes: space.free_bytes(),
            objects: space.object_count(),
        }
    }
}

/// A snapshot of every space of the heap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeapUsage {
    pub spaces: Vec<SpaceUsage>,
    pub remembered: usize,
    pub finalizable_candidates: usize,
    pub ready_for_finalize: usize,
}

impl HeapUsage {
    pub fn space(&self, name: &str) -> Option<&SpaceUsage> {
        self.spaces.iter().find(|s| s.name == name)
    }

    pub fn reserved_bytes(&self) -> usize {
        self.spaces.iter().map(|s| s.reserved_bytes).sum()
    }

    pub fn used_bytes(&self) -> usize {
        self.spaces.iter().map(|s| s.used_bytes).sum()
    }

    pub fn objects(&self) -> usize {
        self.spaces.iter().map(|s| s.objects).sum()
    }
}

impl fmt::Display for HeapUsage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "{:<6} {:>10} {:>10} {:>10} {:>8}",
            "space", "reserved", "used", "free", "objects"
        )?;
        for s in self.spaces.iter() {
            writeln!(
                f,
                "{:<6} {:>10} {:>10} {:>10} {:>8}",
                s.name,
                bytes_to_formatted_string(s.reserved_bytes),
                bytes_to_formatted_string(s.used_bytes),
                bytes_to_formatted_string(s.free_bytes),
                s.objects
            )?;
        }
        writeln!(
            f,
            "{:<6} {:>10} {:>10} {:>10} {:>8}",
            "total",
            bytes_to_formatted_string(self.reserved_bytes()),
            bytes_to_formatted_string(self.used_bytes()),
            bytes_to_formatted_string(self.reserved_bytes().saturating_sub(self.used_bytes())),
            self.objects()
        )?;
        write!(
            f,
            "remembered {}, finalizable {}, ready to finalize {}",
            self.remembered, self.finalizable_candidates, self.ready_for_finalize
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage() -> HeapUsage {
        HeapUsage {
            spaces: vec![
                SpaceUsage {
                    name: "eden",
                    reserved_bytes: 2048,
                    used_bytes: 1024,
                    free_bytes: 1024,
                    objects: 10,
                },
                SpaceUsage {
                    name: "old",
                    reserved_bytes: 4096,
                    used_bytes: 256,
                    free_bytes: 3840,
                    objects: 2,
                },
            ],
            remembered: 1,
            finalizable_candidates: 0,
            ready_for_finalize: 0,
        }
    }

    #[test]
    fn totals() {
        let usage = usage();
        assert_eq!(usage.reserved_bytes(), 6144);
        assert_eq!(usage.used_bytes(), 1280);
        assert_eq!(usage.objects(), 12);
        assert_eq!(usage.space("old").map(|s| s.objects), Some(2));
        assert!(usage.space("los").is_none());
    }

    #[test]
    fn report_lists_every_space() {
        let report = usage().to_string();
        assert!(report.contains("eden"));
        assert!(report.contains("old"));
        assert!(report.contains("total"));
        assert!(report.contains("remembered 1"));
    }
}
