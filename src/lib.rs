//! Size-class slab allocation for a single-threaded server runtime.
//!
//! [`Slab`] serves one fixed item size from page-backed chunks; [`Arena`]
//! indexes a ladder of slabs by power-of-two size class and routes frees
//! through a per-slot header. Consumers construct their own instances and
//! pass them by handle; there is no process-wide allocator state.

pub use slabcore_alloc::{
  Arena,
  ArenaError,
  ArenaResult,
  Slab,
  SlabError,
  SlabResult,
  SlabStats,
  config,
};
pub use slabcore_sys::{
  GLOBAL_SYSTEM,
  system::{
    SysError,
    SysResult,
    System,
  },
};

pub mod prelude {
  pub use super::{
    Arena,
    ArenaError,
    ArenaResult,
    Slab,
    SlabError,
    SlabResult,
    SlabStats,
  };
}
