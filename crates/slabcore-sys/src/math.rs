const USIZE_BITS: usize = usize::BITS as usize;

/// Smallest power of two >= `x`, computed from the leading-zero count of
/// `x - 1`. Returns `None` for `x == 0` and when the result would not fit
/// in a `usize`.
pub const fn round_up_pow2(x: usize) -> Option<usize> {
  if x == 0 {
    return None;
  }

  // leading_zeros(0) == USIZE_BITS, so x == 1 yields 1 << 0 == 1.
  let lz = (x - 1).leading_zeros() as usize;
  if lz == 0 {
    return None;
  }

  Some(1usize << (USIZE_BITS - lz))
}

/// Floor of log2(x) via the leading-zero count. `None` for `x == 0`.
pub const fn log2_floor(x: usize) -> Option<usize> {
  if x == 0 {
    return None;
  }

  Some(USIZE_BITS - 1 - x.leading_zeros() as usize)
}

/// Byte-order probe: true when the low byte of a u16 is stored first.
pub const fn is_little_endian() -> bool {
  let probe: u16 = 1;
  probe.to_ne_bytes()[0] == 1
}

pub const fn is_aligned(value: usize, align: usize) -> Option<bool> {
  if !align.is_power_of_two() {
    return None;
  }
  Some((value & (align - 1)) == 0)
}

pub const fn align_up(value: usize, align: usize) -> Option<usize> {
  if !align.is_power_of_two() {
    return None;
  }

  let mask = align - 1;
  if let Some(sum) = value.checked_add(mask) {
    return Some(sum & !mask);
  }

  None
}

pub const fn align_down(value: usize, align: usize) -> Option<usize> {
  if !align.is_power_of_two() {
    return None;
  }

  Some(value & !(align - 1))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_round_up_pow2_zero() {
    assert_eq!(round_up_pow2(0), None);
  }

  #[test]
  fn test_round_up_pow2_one() {
    assert_eq!(round_up_pow2(1), Some(1));
  }

  #[test]
  fn test_round_up_pow2_exact() {
    for shift in 0..USIZE_BITS - 1 {
      let x = 1usize << shift;
      assert_eq!(round_up_pow2(x), Some(x));
    }
  }

  #[test]
  fn test_round_up_pow2_between() {
    assert_eq!(round_up_pow2(3), Some(4));
    assert_eq!(round_up_pow2(5), Some(8));
    assert_eq!(round_up_pow2(17), Some(32));
    assert_eq!(round_up_pow2(530), Some(1024));
    assert_eq!(round_up_pow2(4097), Some(8192));
  }

  #[test]
  fn test_round_up_pow2_bounds() {
    for x in 2usize..10_000 {
      let rounded = round_up_pow2(x).unwrap();
      assert!(rounded.is_power_of_two());
      assert!(rounded >= x);
      assert!(rounded / 2 < x);
    }
  }

  #[test]
  fn test_round_up_pow2_overflow() {
    assert_eq!(round_up_pow2(usize::MAX), None);
    assert_eq!(round_up_pow2((1usize << (USIZE_BITS - 1)) + 1), None);
    assert_eq!(
      round_up_pow2(1usize << (USIZE_BITS - 1)),
      Some(1usize << (USIZE_BITS - 1))
    );
  }

  #[test]
  fn test_log2_floor_zero() {
    assert_eq!(log2_floor(0), None);
  }

  #[test]
  fn test_log2_floor_powers() {
    for shift in 0..USIZE_BITS {
      assert_eq!(log2_floor(1usize << shift), Some(shift));
    }
  }

  #[test]
  fn test_log2_floor_between() {
    assert_eq!(log2_floor(1), Some(0));
    assert_eq!(log2_floor(3), Some(1));
    assert_eq!(log2_floor(20), Some(4));
    assert_eq!(log2_floor(1023), Some(9));
    assert_eq!(log2_floor(1025), Some(10));
  }

  #[test]
  fn test_endian_probe() {
    let expected = cfg!(target_endian = "little");
    assert_eq!(is_little_endian(), expected);
  }

  #[test]
  fn test_is_aligned() {
    assert_eq!(is_aligned(0, 8), Some(true));
    assert_eq!(is_aligned(8, 8), Some(true));
    assert_eq!(is_aligned(9, 8), Some(false));
    assert_eq!(is_aligned(100, 3), None);
  }

  #[test]
  fn test_align_up() {
    assert_eq!(align_up(0, 8), Some(0));
    assert_eq!(align_up(1, 8), Some(8));
    assert_eq!(align_up(8, 8), Some(8));
    assert_eq!(align_up(9, 8), Some(16));
    assert_eq!(align_up(usize::MAX, 8), None);
    assert_eq!(align_up(100, 5), None);
  }

  #[test]
  fn test_align_down() {
    assert_eq!(align_down(0, 8), Some(0));
    assert_eq!(align_down(7, 8), Some(0));
    assert_eq!(align_down(8, 8), Some(8));
    assert_eq!(align_down(123, 64), Some(64));
    assert_eq!(align_down(100, 3), None);
  }
}
