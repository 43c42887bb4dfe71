use core::ptr::NonNull;

use slabcore_sys::{
  GLOBAL_SYSTEM,
  math::{
    log2_floor,
    round_up_pow2,
  },
  system::System,
};
use thiserror::Error;
use tracing::trace;

use crate::{
  page::SlotHeader,
  slab::{
    Slab,
    SlabError,
  },
  stats::SlabStats,
};

#[derive(Debug, Error)]
pub enum ArenaError {
  #[error("invalid shift range {min}..={max}")]
  InvalidShifts { min: usize, max: usize },
  /// Degenerate request; sizes of 0 and 1 are rejected.
  #[error("allocation of {0} bytes is too small")]
  InvalidSize(usize),
  /// Request beyond the largest size class. The arena has no slab for it.
  #[error("allocation of {size} bytes exceeds the largest size class of {max} bytes")]
  Oversized { size: usize, max: usize },
  /// The slab table itself could not be allocated; no partial arena is
  /// left behind.
  #[error("failed to reserve the slab table")]
  Bootstrap,
  #[error(transparent)]
  Slab(#[from] SlabError),
}

pub type ArenaResult<T> = Result<T, ArenaError>;

/// Size-class dispatcher: one slab per power of two in
/// `min_shift..=max_shift`. Requests round up to the nearest class; the
/// class index travels in the slot header so `free` needs no size hint.
pub struct Arena {
  min_shift: usize,
  max_shift: usize,
  min_size: usize,
  slabs: Vec<Slab>,
}

impl Arena {
  pub fn new(min_shift: usize, max_shift: usize) -> ArenaResult<Self> {
    Self::with_system(min_shift, max_shift, GLOBAL_SYSTEM)
  }

  pub fn with_system(
    min_shift: usize,
    max_shift: usize,
    system: &'static dyn System,
  ) -> ArenaResult<Self> {
    if min_shift < 1 || min_shift > max_shift || max_shift >= usize::BITS as usize - 1 {
      return Err(ArenaError::InvalidShifts {
        min: min_shift,
        max: max_shift,
      });
    }

    let shift_count = max_shift - min_shift + 1;

    let mut slabs = Vec::new();
    slabs
      .try_reserve_exact(shift_count)
      .map_err(|_| ArenaError::Bootstrap)?;

    for index in 0..shift_count {
      slabs.push(Slab::with_system(1usize << (min_shift + index), system)?);
    }

    Ok(Self {
      min_shift,
      max_shift,
      min_size: 1usize << min_shift,
      slabs,
    })
  }

  pub fn min_shift(&self) -> usize {
    self.min_shift
  }

  pub fn max_shift(&self) -> usize {
    self.max_shift
  }

  /// Smallest size class in bytes; smaller requests clamp up to it.
  pub fn min_size(&self) -> usize {
    self.min_size
  }

  pub fn shift_count(&self) -> usize {
    self.slabs.len()
  }

  pub fn slab(&self, index: usize) -> Option<&Slab> {
    self.slabs.get(index)
  }

  /// Rounds `size` up to its size class and takes a slot from the matching
  /// slab. Requests of 0 or 1 bytes fail, as do requests beyond the
  /// largest class.
  pub fn alloc(&mut self, size: usize) -> ArenaResult<NonNull<u8>> {
    if size <= 1 {
      return Err(ArenaError::InvalidSize(size));
    }

    let rounded = round_up_pow2(size)
      .ok_or(ArenaError::Oversized {
        size,
        max: 1usize << self.max_shift,
      })?
      .max(self.min_size);

    let Some(shift) = log2_floor(rounded) else {
      return Err(ArenaError::InvalidSize(size));
    };

    if shift > self.max_shift {
      return Err(ArenaError::Oversized {
        size,
        max: 1usize << self.max_shift,
      });
    }

    let index = shift - self.min_shift;
    let ptr = self.slabs[index].alloc()?;

    // The slab recorded its slot index here; the class index replaces it
    // so free can route straight back to the right slab.
    unsafe { SlotHeader::of(ptr) }.index = index as u8;

    trace!(size, rounded, class = index, "arena alloc");

    Ok(ptr)
  }

  /// `alloc` with exactly `size` bytes zero-filled (not the rounded size).
  pub fn calloc(&mut self, size: usize) -> ArenaResult<NonNull<u8>> {
    let ptr = self.alloc(size)?;
    unsafe { ptr.as_ptr().write_bytes(0, size) };
    Ok(ptr)
  }

  /// Routes a pointer back to its slab via the class index stored in the
  /// slot header.
  ///
  /// # Safety
  ///
  /// `ptr` must have been returned by `alloc`/`calloc` on this arena and
  /// not freed since.
  pub unsafe fn free(&mut self, ptr: NonNull<u8>) {
    let index = unsafe { SlotHeader::of(ptr) }.index as usize;
    debug_assert!(index < self.slabs.len());

    trace!(class = index, "arena free");

    unsafe { self.slabs[index].free(ptr) };
  }

  /// Counters summed over every slab.
  pub fn stats(&self) -> SlabStats {
    self
      .slabs
      .iter()
      .fold(SlabStats::default(), |acc, slab| acc.merge(*slab.stats()))
  }

  pub fn log_stats(&self) {
    for slab in &self.slabs {
      slab.log_stats();
    }
  }
}

impl Drop for Arena {
  fn drop(&mut self) {
    // Slabs release their outstanding chunks as they drop.
    self.slabs.clear();
    self.min_size = 0;
    self.min_shift = 0;
    self.max_shift = 0;
  }
}
