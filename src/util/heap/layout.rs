//! The sizes of the spaces, derived from the options.

use crate::heap_state::HeapInitError;
use crate::util::constants::*;
use crate::util::conversions::{bytes_to_formatted_string, raw_align_down};
use crate::util::options::Options;
use std::fmt;

/// The size of every space of a heap.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HeapLayout {
    pub eden_size: usize,
    /// The size of each of the two survivor spaces.
    pub survivor_size: usize,
    /// The number of old generation nodes.
    pub node_count: usize,
    pub node_size: usize,
    /// The byte budget of the large object space.
    pub los_size: usize,
    /// Young objects larger than this go to the large object space. Never larger than the
    /// capacity of a node.
    pub large_object_threshold: usize,
}

impl HeapLayout {
    /// Compute the layout. Space sizes that are not set explicitly are derived from
    /// `heap_size`: the young generation takes `young_ratio` tenths of it, and eden takes
    /// `survivor_ratio` tenths of the young generation. The old generation gets the rest.
    pub fn from_options(options: &Options) -> Result<HeapLayout, HeapInitError> {
        let young = options.heap_size / 10 * options.young_ratio;
        let derived_eden = young / 10 * options.survivor_ratio;
        let derived_survivor = (young - derived_eden) / 2;

        let pick = |explicit: usize, derived: usize| {
            raw_align_down(if explicit != 0 { explicit } else { derived }, BYTES_IN_WORD)
        };
        let eden_size = pick(options.eden_size, derived_eden);
        let survivor_size = pick(options.survivor_size, derived_survivor);
        let old_size = if options.old_size != 0 {
            options.old_size
        } else {
            options.heap_size - young
        };

        if eden_size < MIN_OBJECT_SIZE {
            return Err(HeapInitError::InvalidOption(format!(
                "eden of {} bytes cannot hold an object",
                eden_size
            )));
        }
        let node_size = options.node_size;
        let node_count = old_size / node_size;
        if node_count == 0 {
            return Err(HeapInitError::InvalidOption(format!(
                "old generation of {} bytes holds no node of {} bytes",
                old_size, node_size
            )));
        }

        let node_capacity = node_size - NODE_HEADER_BYTES;
        let large_object_threshold = if options.large_object_threshold > node_capacity {
            debug!(
                "Large object threshold {} is above the node capacity, using {}",
                options.large_object_threshold, node_capacity
            );
            node_capacity
        } else {
            options.large_object_threshold
        };

        Ok(HeapLayout {
            eden_size,
            survivor_size,
            node_count,
            node_size,
            los_size: options.los_size,
            large_object_threshold,
        })
    }

    pub fn old_size(&self) -> usize {
        self.node_count * self.node_size
    }
}

impl fmt::Display for HeapLayout {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "eden {}, survivors 2 x {}, old {} nodes x {} bytes, los {}",
            bytes_to_formatted_string(self.eden_size),
            bytes_to_formatted_string(self.survivor_size),
            self.node_count,
            self.node_size,
            bytes_to_formatted_string(self.los_size)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_from_heap_size() {
        let options = Options {
            heap_size: 10 * BYTES_IN_MBYTE,
            ..Options::default()
        };
        let layout = HeapLayout::from_options(&options).unwrap();
        let young = 10 * BYTES_IN_MBYTE / 10 * DEFAULT_YOUNG_RATIO;
        assert_eq!(layout.eden_size, raw_align_down(young / 10 * 8, BYTES_IN_WORD));
        assert_eq!(layout.survivor_size, raw_align_down((young - young / 10 * 8) / 2, BYTES_IN_WORD));
        assert_eq!(layout.node_count, (10 * BYTES_IN_MBYTE - young) / DEFAULT_NODE_SIZE);
        assert_eq!(layout.large_object_threshold, DEFAULT_NODE_SIZE - NODE_HEADER_BYTES);
    }

    #[test]
    fn explicit_sizes_win() {
        let options = Options {
            eden_size: 96,
            survivor_size: 64,
            old_size: 10 * 128,
            ..Options::default()
        };
        let layout = HeapLayout::from_options(&options).unwrap();
        assert_eq!(layout.eden_size, 96);
        assert_eq!(layout.survivor_size, 64);
        assert_eq!(layout.node_count, 10);
        assert_eq!(layout.old_size(), 1280);
    }

    #[test]
    fn threshold_is_capped_by_node_capacity() {
        let options = Options {
            node_size: 64,
            ..Options::default()
        };
        let layout = HeapLayout::from_options(&options).unwrap();
        assert_eq!(layout.large_object_threshold, 64 - NODE_HEADER_BYTES);
    }

    #[test]
    fn invalid_layouts() {
        let no_nodes = Options {
            old_size: 100,
            ..Options::default()
        };
        assert!(matches!(
            HeapLayout::from_options(&no_nodes),
            Err(HeapInitError::InvalidOption(_))
        ));
        let tiny_eden = Options {
            eden_size: 8,
            ..Options::default()
        };
        assert!(matches!(
            HeapLayout::from_options(&tiny_eden),
            Err(HeapInitError::InvalidOption(_))
        ));
    }
}
