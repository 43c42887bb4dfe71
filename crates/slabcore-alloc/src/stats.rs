use getset::CopyGetters;

/// Allocation counters of one slab. `total` and `reqs`/`fails` only grow;
/// `used` tracks live slots. Reset only on teardown.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct SlabStats {
  /// Cumulative slot capacity of every chunk mapped so far.
  total: usize,
  /// Live allocations.
  used: usize,
  /// Alloc and free calls, one increment each.
  reqs: usize,
  /// OS chunk acquisitions that failed.
  fails: usize,
}

impl SlabStats {
  pub(crate) fn count_req(&mut self) {
    self.reqs += 1;
  }

  pub(crate) fn count_alloc(&mut self) {
    self.used += 1;
  }

  pub(crate) fn count_free(&mut self) {
    self.used -= 1;
  }

  pub(crate) fn count_fail(&mut self) {
    self.fails += 1;
  }

  pub(crate) fn count_mapped(&mut self, slots: usize) {
    self.total += slots;
  }

  pub(crate) fn reset(&mut self) {
    *self = Self::default();
  }

  /// Field-wise sum, used for arena-wide reporting.
  pub fn merge(self, other: Self) -> Self {
    Self {
      total: self.total + other.total,
      used: self.used + other.used,
      reqs: self.reqs + other.reqs,
      fails: self.fails + other.fails,
    }
  }
}
