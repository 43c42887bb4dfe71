#![cfg_attr(not(test), no_std)]

#[cfg(test)]
pub mod tests;

/// Word width of the mask, and therefore the slot-count ceiling of a page.
pub const MAX_SLOTS: usize = usize::BITS as usize;

const FULL: usize = usize::MAX;

/// Occupancy mask of one page: the low `count` bits are slots (0 free,
/// 1 used), every bit at `count` and above is permanently 1. A fully
/// occupied page therefore reads as the all-ones word no matter how many
/// slots it actually has.
///
/// Plain word, no atomics: access is serialized by the owning slab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotMask(usize);

impl SlotMask {
  /// Mask of a page with all `count` slots free.
  #[inline]
  pub const fn fresh(count: usize) -> Self {
    debug_assert!(count >= 1 && count <= MAX_SLOTS);
    if count == MAX_SLOTS {
      Self(0)
    } else {
      Self(FULL << count)
    }
  }

  #[inline]
  pub const fn raw(self) -> usize {
    self.0
  }

  #[inline]
  pub const fn is_full(self) -> bool {
    self.0 == FULL
  }

  /// True when no slot among the low `count` bits is occupied.
  #[inline]
  pub const fn is_clear(self, count: usize) -> bool {
    self.0 & Self::relevant(count) == 0
  }

  /// Claims the lowest free slot and returns its index. Must not be called
  /// on a full mask.
  #[inline]
  pub fn claim_first_free(&mut self) -> usize {
    debug_assert!(!self.is_full());
    let slot = (!self.0).trailing_zeros() as usize;
    self.0 |= 1usize << slot;
    slot
  }

  /// Clears the bit of an occupied slot.
  #[inline]
  pub fn release(&mut self, slot: usize) {
    debug_assert!(slot < MAX_SLOTS);
    debug_assert!(self.0 & (1usize << slot) != 0);
    self.0 &= !(1usize << slot);
  }

  /// True when exactly one of the low `count` slot bits is set, i.e. the
  /// next release empties the page.
  #[inline]
  pub const fn exactly_one_used(self, count: usize) -> bool {
    let relevant = self.0 & Self::relevant(count);
    relevant != 0 && relevant & (relevant - 1) == 0
  }

  /// Number of occupied slots among the low `count` bits.
  #[inline]
  pub const fn used(self, count: usize) -> usize {
    (self.0 & Self::relevant(count)).count_ones() as usize
  }

  /// Iterator over the indices of occupied slots.
  pub fn occupied(self, count: usize) -> OccupiedIter {
    OccupiedIter {
      bits: self.0 & Self::relevant(count),
    }
  }

  const fn relevant(count: usize) -> usize {
    if count >= MAX_SLOTS {
      FULL
    } else {
      (1usize << count) - 1
    }
  }
}

pub struct OccupiedIter {
  bits: usize,
}

impl Iterator for OccupiedIter {
  type Item = usize;

  fn next(&mut self) -> Option<usize> {
    if self.bits == 0 {
      return None;
    }
    let slot = self.bits.trailing_zeros() as usize;
    self.bits &= !(1usize << slot);
    Some(slot)
  }
}
