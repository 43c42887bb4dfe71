use super::*;

#[test]
fn test_fresh_partial_word() {
  let mask = SlotMask::fresh(5);
  assert!(!mask.is_full());
  assert!(mask.is_clear(5));
  assert_eq!(mask.used(5), 0);
  assert_eq!(mask.raw() & 0b11111, 0);
  assert_eq!(mask.raw() >> 5, usize::MAX >> 5);
}

#[test]
fn test_fresh_full_word() {
  let mask = SlotMask::fresh(MAX_SLOTS);
  assert_eq!(mask.raw(), 0);
  assert!(mask.is_clear(MAX_SLOTS));
}

#[test]
fn test_full_sentinel_any_count() {
  for count in [1, 5, 21, 32, MAX_SLOTS] {
    let mut mask = SlotMask::fresh(count);
    for expected in 0..count {
      assert!(!mask.is_full());
      assert_eq!(mask.claim_first_free(), expected);
    }
    assert!(mask.is_full());
  }
}

#[test]
fn test_claim_order_is_lowest_first() {
  let mut mask = SlotMask::fresh(8);
  assert_eq!(mask.claim_first_free(), 0);
  assert_eq!(mask.claim_first_free(), 1);
  assert_eq!(mask.claim_first_free(), 2);

  mask.release(1);
  assert_eq!(mask.claim_first_free(), 1);
  assert_eq!(mask.claim_first_free(), 3);
}

#[test]
fn test_release_and_reclaim() {
  let mut mask = SlotMask::fresh(4);
  for _ in 0..4 {
    mask.claim_first_free();
  }
  assert!(mask.is_full());

  mask.release(2);
  assert!(!mask.is_full());
  assert_eq!(mask.used(4), 3);
  assert_eq!(mask.claim_first_free(), 2);
  assert!(mask.is_full());
}

#[test]
fn test_exactly_one_used() {
  let mut mask = SlotMask::fresh(6);
  assert!(!mask.exactly_one_used(6));

  mask.claim_first_free();
  assert!(mask.exactly_one_used(6));

  mask.claim_first_free();
  assert!(!mask.exactly_one_used(6));

  mask.release(0);
  assert!(mask.exactly_one_used(6));

  mask.release(1);
  assert!(!mask.exactly_one_used(6));
}

#[test]
fn test_exactly_one_used_high_slot() {
  let mut mask = SlotMask::fresh(MAX_SLOTS);
  for _ in 0..MAX_SLOTS {
    mask.claim_first_free();
  }
  for slot in 0..MAX_SLOTS - 1 {
    mask.release(slot);
  }
  assert!(mask.exactly_one_used(MAX_SLOTS));
}

#[test]
fn test_used_counts() {
  let mut mask = SlotMask::fresh(10);
  assert_eq!(mask.used(10), 0);
  for expected in 1..=10 {
    mask.claim_first_free();
    assert_eq!(mask.used(10), expected);
  }
}

#[test]
fn test_occupied_iter() {
  let mut mask = SlotMask::fresh(8);
  mask.claim_first_free();
  mask.claim_first_free();
  mask.claim_first_free();
  mask.release(1);

  let occupied: Vec<usize> = mask.occupied(8).collect();
  assert_eq!(occupied, vec![0, 2]);
}

#[test]
fn test_occupied_iter_skips_sentinel_bits() {
  let mask = SlotMask::fresh(3);
  assert_eq!(mask.occupied(3).count(), 0);

  let mut mask = SlotMask::fresh(3);
  mask.claim_first_free();
  assert_eq!(mask.occupied(3).collect::<Vec<_>>(), vec![0]);
}
