pub mod arena;
pub mod config;
pub mod page;
pub mod slab;
pub mod stats;

pub use arena::{
  Arena,
  ArenaError,
  ArenaResult,
};
pub use slab::{
  Slab,
  SlabError,
  SlabResult,
};
pub use stats::SlabStats;
