/// log2 of the number of bytes in a kilobyte
pub const LOG_BYTES_IN_KBYTE: u8 = 10;
/// The number of bytes in a kilobyte
pub const BYTES_IN_KBYTE: usize = 1 << LOG_BYTES_IN_KBYTE;

/// log2 of the number of bytes in a megabyte
pub const LOG_BYTES_IN_MBYTE: u8 = 20;
/// The number of bytes in a megabyte
pub const BYTES_IN_MBYTE: usize = 1 << LOG_BYTES_IN_MBYTE;

#[cfg(target_pointer_width = "32")]
/// log2 of the number of bytes in an address
pub const LOG_BYTES_IN_ADDRESS: u8 = 2;
#[cfg(target_pointer_width = "64")]
/// log2 of the number of bytes in an address
pub const LOG_BYTES_IN_ADDRESS: u8 = 3;
/// The number of bytes in an address
pub const BYTES_IN_ADDRESS: usize = 1 << LOG_BYTES_IN_ADDRESS;

/// log2 of the number of bytes in a word
pub const LOG_BYTES_IN_WORD: u8 = LOG_BYTES_IN_ADDRESS;
/// The number of bytes in a word
pub const BYTES_IN_WORD: usize = 1 << LOG_BYTES_IN_WORD;

/// log2 of the number of bytes in a page
pub const LOG_BYTES_IN_PAGE: u8 = 12;
/// The number of bytes in a page
pub const BYTES_IN_PAGE: usize = 1 << LOG_BYTES_IN_PAGE;

/// Every object and every object field is aligned to a word.
pub const MIN_ALIGNMENT: usize = BYTES_IN_WORD;

/// The object header is three words: class/size, status, forwarding pointer.
pub const HEADER_WORDS: usize = 3;
/// The number of bytes in an object header.
pub const HEADER_BYTES: usize = HEADER_WORDS << LOG_BYTES_IN_WORD;
/// The smallest object is a bare header.
pub const MIN_OBJECT_SIZE: usize = HEADER_BYTES;

/// An old generation node header is two words: `next` and `size`/`used`.
pub const NODE_HEADER_WORDS: usize = 2;
/// The number of bytes in a node header.
pub const NODE_HEADER_BYTES: usize = NODE_HEADER_WORDS << LOG_BYTES_IN_WORD;

/// Default size of an old generation node.
pub const DEFAULT_NODE_SIZE: usize = 128;
/// A node must hold at least its own header and one minimal object.
pub const MIN_NODE_SIZE: usize = NODE_HEADER_BYTES + MIN_OBJECT_SIZE;

/// Default age at which a surviving young object is promoted.
pub const DEFAULT_PROMOTION_AGE: u8 = 3;
/// The age is kept in one byte of the status word.
pub const MAX_AGE: u8 = u8::MAX;

/// Default young generation share of the heap, in tenths.
pub const DEFAULT_YOUNG_RATIO: usize = 2;
/// Default eden share of the young generation, in tenths. The two survivor
/// spaces split the rest evenly.
pub const DEFAULT_SURVIVOR_RATIO: usize = 8;

/// Default total heap size used by `heap_init` when the caller has no preference.
pub const DEFAULT_HEAP_SIZE: usize = 10 << LOG_BYTES_IN_MBYTE;
/// Default budget of the large object space.
pub const DEFAULT_LOS_SIZE: usize = 4 << LOG_BYTES_IN_MBYTE;

/// By default we never do a stress GC.
pub const DEFAULT_STRESS_FACTOR: usize = usize::MAX;
