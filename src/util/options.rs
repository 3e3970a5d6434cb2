use crate::util::constants::*;
use std::default::Default;
use strum_macros::{Display, EnumString};

/// The collector used for the old generation in a major collection.
#[derive(Copy, Clone, EnumString, Display, Debug, PartialEq, Eq)]
pub enum MajorCollector {
    /// Mark the live objects and return the dead nodes to the free list.
    MarkSweep,
    /// Mark the live objects and slide them to the bottom of the old generation.
    MarkCompact,
}

fn always_valid<T>(_: &T) -> bool {
    true
}

fn is_ratio(v: &usize) -> bool {
    (1..10).contains(v)
}

fn is_valid_node_size(v: &usize) -> bool {
    *v >= MIN_NODE_SIZE && *v % MIN_ALIGNMENT == 0 && *v <= u32::MAX as usize
}

/// The default large object threshold is the capacity of a default old generation node.
pub const DEFAULT_LARGE_OBJECT_THRESHOLD: usize = DEFAULT_NODE_SIZE - NODE_HEADER_BYTES;

macro_rules! options {
    ($($(#[$outer:meta])* $name:ident: $type:ty[$validator:expr] = $default:expr),*,) => [
        options!($($(#[$outer])* $name: $type[$validator] = $default),*);
    ];
    ($($(#[$outer:meta])* $name:ident: $type:ty[$validator:expr] = $default:expr),*) => [
        /// Heap options. Every option can be set programmatically through
        /// [`crate::HeapBuilder`] or by an environment variable `GENHEAP_<NAME>`.
        #[derive(Clone, Debug)]
        pub struct Options {
            $($(#[$outer])* pub $name: $type),*
        }
        impl Options {
            /// Set an option by its name and a string value. Returns false if the name is
            /// unknown, or if the value cannot be parsed or fails validation. The old value is
            /// kept in that case.
            pub fn set_from_str(&mut self, s: &str, val: &str) -> bool {
                match s {
                    // Parse the given value from str (by env vars or by calling set_option()) to the right type
                    $(stringify!($name) => if let Ok(ref val) = val.parse::<$type>() {
                        // Validate
                        let validate_fn = $validator;
                        let is_valid = validate_fn(val);
                        if is_valid {
                            // Only set value if valid.
                            self.$name = val.clone();
                        } else {
                            eprintln!("Warn: unable to set {}={:?}. Invalid value. Default value will be used.", s, val);
                        }
                        is_valid
                    } else {
                        eprintln!("Warn: unable to set {}={:?}. Cant parse value. Default value will be used.", s, val);
                        false
                    })*
                    _ => {
                        eprintln!("Warn: unknown option {}.", s);
                        false
                    }
                }
            }

            /// Read options from environment variables, and apply those settings to self.
            ///
            /// If we have env vars that start with GENHEAP_ and match any option (such as
            /// GENHEAP_STRESS_FACTOR), we set the option to its value (if it is a valid value).
            pub fn read_env_var_settings(&mut self) {
                const PREFIX: &str = "GENHEAP_";
                for (key, val) in std::env::vars() {
                    // strip the prefix, and get the lower case string
                    if let Some(rest_of_key) = key.strip_prefix(PREFIX) {
                        let lowercase: &str = &rest_of_key.to_lowercase();
                        match lowercase {
                            $(stringify!($name) => { self.set_from_str(lowercase, &val); },)*
                            _ => {}
                        }
                    }
                }
            }
        }
        impl Default for Options {
            fn default() -> Self {
                Options {
                    $($name: $default),*
                }
            }
        }
    ]
}

options! {
    /// Total heap size used to derive the layout when the space sizes below are left at zero.
    heap_size:              usize          [|v: &usize| *v > 0]  = DEFAULT_HEAP_SIZE,
    /// Young generation share of the heap, in tenths.
    young_ratio:            usize          [is_ratio]            = DEFAULT_YOUNG_RATIO,
    /// Eden share of the young generation, in tenths. The two survivor spaces split the rest.
    survivor_ratio:         usize          [is_ratio]            = DEFAULT_SURVIVOR_RATIO,
    /// Size of eden in bytes. Zero means derived from `heap_size`.
    eden_size:              usize          [always_valid]        = 0,
    /// Size of each survivor space in bytes. Zero means derived from `heap_size`.
    survivor_size:          usize          [always_valid]        = 0,
    /// Size of the old generation free-list space in bytes. Zero means derived from `heap_size`.
    old_size:               usize          [always_valid]        = 0,
    /// Byte budget of the large object space.
    los_size:               usize          [always_valid]        = DEFAULT_LOS_SIZE,
    /// Size of an old generation node, including its header.
    node_size:              usize          [is_valid_node_size]  = DEFAULT_NODE_SIZE,
    /// A young object that has survived this many minor collections is promoted.
    promotion_age:          u8             [always_valid]        = DEFAULT_PROMOTION_AGE,
    /// Objects larger than this (in bytes, including the header) go to the large object space.
    large_object_threshold: usize          [|v: &usize| *v >= MIN_OBJECT_SIZE] = DEFAULT_LARGE_OBJECT_THRESHOLD,
    /// The old generation collector.
    major_collector:        MajorCollector [always_valid]        = MajorCollector::MarkSweep,
    /// Should finalization be disabled?
    no_finalizer:           bool           [always_valid]        = false,
    /// Should weak fields be traced as if they were strong?
    no_weak_references:     bool           [always_valid]        = false,
    /// How frequent (every X bytes) should we do a stress GC?
    stress_factor:          usize          [|v: &usize| *v > 0]  = DEFAULT_STRESS_FACTOR,
    /// Force every Nth collection to be a major collection. Zero disables it.
    full_heap_every:        usize          [always_valid]        = 0,
}

impl Options {
    /// Is stress testing enabled?
    pub fn is_stress_test_gc_enabled(&self) -> bool {
        self.stress_factor != DEFAULT_STRESS_FACTOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_util::{serial_test, with_cleanup};

    #[test]
    fn no_env_var() {
        serial_test(|| {
            let mut options = Options::default();
            options.read_env_var_settings();
            assert_eq!(options.stress_factor, DEFAULT_STRESS_FACTOR);
            assert_eq!(options.major_collector, MajorCollector::MarkSweep);
        })
    }

    #[test]
    fn with_valid_env_var() {
        serial_test(|| {
            with_cleanup(
                || {
                    std::env::set_var("GENHEAP_STRESS_FACTOR", "4096");

                    let mut options = Options::default();
                    options.read_env_var_settings();
                    assert_eq!(options.stress_factor, 4096);
                },
                || {
                    std::env::remove_var("GENHEAP_STRESS_FACTOR");
                },
            )
        })
    }

    #[test]
    fn with_multiple_valid_env_vars() {
        serial_test(|| {
            with_cleanup(
                || {
                    std::env::set_var("GENHEAP_STRESS_FACTOR", "4096");
                    std::env::set_var("GENHEAP_NO_FINALIZER", "true");
                    std::env::set_var("GENHEAP_MAJOR_COLLECTOR", "MarkCompact");

                    let mut options = Options::default();
                    options.read_env_var_settings();
                    assert_eq!(options.stress_factor, 4096);
                    assert!(options.no_finalizer);
                    assert_eq!(options.major_collector, MajorCollector::MarkCompact);
                },
                || {
                    std::env::remove_var("GENHEAP_STRESS_FACTOR");
                    std::env::remove_var("GENHEAP_NO_FINALIZER");
                    std::env::remove_var("GENHEAP_MAJOR_COLLECTOR");
                },
            )
        })
    }

    #[test]
    fn with_invalid_env_var_value() {
        serial_test(|| {
            with_cleanup(
                || {
                    // invalid value, we cannot parse the value, so use the default value
                    std::env::set_var("GENHEAP_STRESS_FACTOR", "abc");

                    let mut options = Options::default();
                    options.read_env_var_settings();
                    assert_eq!(options.stress_factor, DEFAULT_STRESS_FACTOR);
                },
                || {
                    std::env::remove_var("GENHEAP_STRESS_FACTOR");
                },
            )
        })
    }

    #[test]
    fn with_invalid_env_var_key() {
        serial_test(|| {
            with_cleanup(
                || {
                    std::env::set_var("GENHEAP_ABC", "42");

                    let mut options = Options::default();
                    options.read_env_var_settings();
                    assert_eq!(options.stress_factor, DEFAULT_STRESS_FACTOR);
                },
                || {
                    std::env::remove_var("GENHEAP_ABC");
                },
            )
        })
    }

    #[test]
    fn set_from_str_validates() {
        let mut options = Options::default();
        assert!(options.set_from_str("node_size", "256"));
        assert_eq!(options.node_size, 256);
        // Smaller than a node header plus a minimal object.
        assert!(!options.set_from_str("node_size", "16"));
        assert_eq!(options.node_size, 256);
        // Not word aligned.
        assert!(!options.set_from_str("node_size", "130"));
        assert!(!options.set_from_str("young_ratio", "10"));
        assert_eq!(options.young_ratio, DEFAULT_YOUNG_RATIO);
        assert!(!options.set_from_str("major_collector", "Copying"));
        assert!(options.set_from_str("major_collector", "MarkCompact"));
        assert_eq!(options.major_collector, MajorCollector::MarkCompact);
        assert!(!options.set_from_str("no_such_option", "1"));
    }

    #[test]
    fn major_collector_display() {
        assert_eq!(MajorCollector::MarkSweep.to_string(), "MarkSweep");
        assert_eq!(MajorCollector::MarkCompact.to_string(), "MarkCompact");
    }

    #[test]
    fn stress_test_flag() {
        let mut options = Options::default();
        assert!(!options.is_stress_test_gc_enabled());
        options.stress_factor = 4096;
        assert!(options.is_stress_test_gc_enabled());
    }
}
