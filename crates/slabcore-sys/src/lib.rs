#![cfg_attr(not(test), no_std)]

pub mod math;
pub mod prim;
pub mod system;
pub mod unix;

pub use system::GLOBAL_SYSTEM;

pub mod prelude {
  pub use super::{
    GLOBAL_SYSTEM,
    math::{
      align_down,
      align_up,
      is_aligned,
      is_little_endian,
      log2_floor,
      round_up_pow2,
    },
    prim::{
      page_size,
      word_width,
    },
    system::{
      SysError,
      SysResult,
      System,
    },
  };
}
