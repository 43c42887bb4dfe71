/// Baseline OS allocation size in bytes. A slab whose page size is smaller
/// requests one chunk of this size and hosts several logical pages in it.
pub const OS_PAGE_SIZE: usize = 4096;

/// Floor on items per page accepted by the page-size shrink step: a halved
/// page is adopted only while it still holds more than this many items.
/// Tunable trade-off between page granularity and internal fragmentation.
pub const PAGE_MIN_ITEMS: usize = 8;

/// Default size-class ladder: 2^4 (16 B) through 2^16 (64 KB).
pub const DEFAULT_MIN_SHIFT: usize = 4;
pub const DEFAULT_MAX_SHIFT: usize = 16;
