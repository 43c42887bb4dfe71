use core::ptr::NonNull;

use slabcore_list::ListHead;
use slabcore_mask::{
  MAX_SLOTS,
  SlotMask,
};
use slabcore_sys::{
  GLOBAL_SYSTEM,
  math::round_up_pow2,
  system::{
    SysError,
    System,
  },
};
use thiserror::Error;
use tracing::{
  debug,
  error,
  warn,
};

use crate::{
  config::{
    OS_PAGE_SIZE,
    PAGE_MIN_ITEMS,
  },
  page::{
    Bucket,
    Page,
    PageRole,
    SLOT_HEADER_SIZE,
    SlotHeader,
  },
  stats::SlabStats,
};

#[derive(Debug, Error)]
pub enum SlabError {
  /// Item size of zero, or one whose page geometry overflows `usize`.
  #[error("unrepresentable item size: {0}")]
  InvalidItemSize(usize),
  /// The OS refused a chunk. Counted, logged, surfaced; never retried here.
  #[error("system memory exhausted: {0:?}")]
  SystemExhausted(SysError),
}

pub type SlabResult<T> = Result<T, SlabError>;

/// Allocator for one size class. Backing memory arrives as OS chunks of
/// `pages_per_alloc` bytes, partitioned into pages of `page_size` bytes;
/// the first page of a chunk is the boss and owns the chunk's lifecycle.
///
/// Single-threaded by design: callers serialize access externally.
pub struct Slab {
  item_size: usize,
  item_count: usize,
  page_size: usize,
  pages_per_alloc: usize,
  alignment_mask: usize,

  empty: ListHead<Page>,
  partial: ListHead<Page>,
  full: ListHead<Page>,

  stats: SlabStats,
  system: &'static dyn System,
}

impl Slab {
  pub fn new(item_size: usize) -> SlabResult<Self> {
    Self::with_system(item_size, GLOBAL_SYSTEM)
  }

  /// Builds the slab geometry for `item_size`-byte items against an
  /// injected OS interface.
  ///
  /// Every slot carries a one-byte header in front of the user region, so
  /// returned pointers have no alignment guarantee beyond the slot stride.
  pub fn with_system(item_size: usize, system: &'static dyn System) -> SlabResult<Self> {
    if item_size == 0 {
      return Err(SlabError::InvalidItemSize(item_size));
    }

    let slot_size = item_size
      .checked_add(SLOT_HEADER_SIZE)
      .ok_or(SlabError::InvalidItemSize(item_size))?;

    let mut item_count = MAX_SLOTS;
    let naive = item_count
      .checked_mul(slot_size)
      .and_then(|data| data.checked_add(Page::DATA_OFFSET))
      .ok_or(SlabError::InvalidItemSize(item_size))?;

    let mut page_size = round_up_pow2(naive).ok_or(SlabError::InvalidItemSize(item_size))?;

    // Rounding up to a power of two can waste close to half the page.
    // Adopt the half-sized page when it still holds a sensible number of
    // items; fragmentation shrinks and objects pack tighter.
    if page_size != naive {
      let half = page_size >> 1;
      if Page::DATA_OFFSET < half {
        let half_data = half - Page::DATA_OFFSET;
        if half_data > slot_size * PAGE_MIN_ITEMS {
          page_size = half;
          item_count = half_data / slot_size;
        }
      }
    }

    debug_assert!(item_count >= 1 && item_count <= MAX_SLOTS);

    let pages_per_alloc = page_size.max(OS_PAGE_SIZE);

    debug!(
      item_size = slot_size,
      item_count,
      page_size,
      pages_per_alloc,
      data_offset = Page::DATA_OFFSET,
      "slab initialized"
    );

    Ok(Self {
      item_size: slot_size,
      item_count,
      page_size,
      pages_per_alloc,
      alignment_mask: !(page_size - 1),
      empty: ListHead::new(),
      partial: ListHead::new(),
      full: ListHead::new(),
      stats: SlabStats::default(),
      system,
    })
  }

  /// Slot size including the header, fixed for the slab's lifetime.
  pub fn item_size(&self) -> usize {
    self.item_size
  }

  /// Bytes available to the caller in each returned slot.
  pub fn item_capacity(&self) -> usize {
    self.item_size - SLOT_HEADER_SIZE
  }

  pub fn item_count(&self) -> usize {
    self.item_count
  }

  pub fn page_size(&self) -> usize {
    self.page_size
  }

  pub fn pages_per_alloc(&self) -> usize {
    self.pages_per_alloc
  }

  pub fn stats(&self) -> &SlabStats {
    &self.stats
  }

  /// Allocates one slot. Preferred source is a partially filled page, then
  /// an empty one; only when both lists are dry is a new chunk requested
  /// from the OS.
  pub fn alloc(&mut self) -> SlabResult<NonNull<u8>> {
    self.stats.count_req();

    if let Some(page) = self.partial.head() {
      return Ok(self.claim_slot(page));
    }

    if let Some(page) = self.empty.pop_front() {
      self.activate(page);
      return Ok(self.claim_slot(page));
    }

    let boss = self.map_chunk()?;
    Ok(self.claim_slot(boss))
  }

  /// `alloc` with the user region zero-filled.
  pub fn calloc(&mut self) -> SlabResult<NonNull<u8>> {
    let ptr = self.alloc()?;
    unsafe { ptr.as_ptr().write_bytes(0, self.item_capacity()) };
    Ok(ptr)
  }

  /// Returns a slot. The page is recovered from the pointer itself by
  /// alignment masking; no external bookkeeping is consulted.
  ///
  /// # Safety
  ///
  /// `ptr` must have been returned by `alloc`/`calloc` on this slab and not
  /// freed since. Foreign or doubled pointers are not detected.
  pub unsafe fn free(&mut self, ptr: NonNull<u8>) {
    self.stats.count_req();

    let slot_ptr = unsafe { ptr.as_ptr().sub(SLOT_HEADER_SIZE) };
    let page_ptr = unsafe { Page::from_interior(slot_ptr, self.alignment_mask) };

    let distance = slot_ptr as usize - Page::data_ptr(page_ptr) as usize;
    let slot = distance / self.item_size;
    debug_assert!(slot < self.item_count);

    let mask = unsafe { page_ptr.as_ref() }.mask;

    if mask.is_full() {
      // No longer fully occupied; back to the partial list.
      let page = unsafe { &mut *page_ptr.as_ptr() };
      page.mask.release(slot);
      self.full.remove(page);
      page.bucket = Bucket::Partial;
      self.partial.push_front(page);
    } else if mask.exactly_one_used(self.item_count) {
      // This free empties the page. Either the whole chunk just went idle
      // and goes back to the OS, or the page parks in the empty list.
      let boss_ptr = Page::boss_of(page_ptr);
      let last_in_chunk = unsafe { boss_ptr.as_ref() }.refcount() == 1;

      if last_in_chunk {
        self.release_chunk(boss_ptr);
      } else {
        let page = unsafe { &mut *page_ptr.as_ptr() };
        self.partial.remove(page);
        page.mask = SlotMask::fresh(self.item_count);
        page.bucket = Bucket::Empty;
        self.empty.push_front(page);

        let boss = unsafe { &mut *boss_ptr.as_ptr() };
        if let PageRole::Boss { refcount } = &mut boss.role {
          *refcount -= 1;
        }
      }
    } else {
      let page = unsafe { &mut *page_ptr.as_ptr() };
      page.mask.release(slot);
    }

    self.stats.count_free();
  }

  /// Read-only walk over every live slot: partial pages bit by bit, full
  /// pages in slot order. The visitor receives user pointers.
  pub fn traverse<F>(&self, mut visitor: F)
  where
    F: FnMut(NonNull<u8>),
  {
    for page in self.partial.iter() {
      let page_ptr = NonNull::from(page);
      for slot in page.mask.occupied(self.item_count) {
        visitor(Page::slot_ptr(page_ptr, slot, self.item_size));
      }
    }

    for page in self.full.iter() {
      let page_ptr = NonNull::from(page);
      for slot in 0..self.item_count {
        visitor(Page::slot_ptr(page_ptr, slot, self.item_size));
      }
    }
  }

  /// Diagnostic dump on the log sink: counters plus one line per boss page.
  pub fn log_stats(&self) {
    debug!(
      total = self.stats.total(),
      used = self.stats.used(),
      reqs = self.stats.reqs(),
      fails = self.stats.fails(),
      "slab stats"
    );

    let buckets = [
      ("empty", &self.empty),
      ("partial", &self.partial),
      ("full", &self.full),
    ];

    for (label, list) in buckets {
      for page in list.iter() {
        if !page.is_boss() {
          continue;
        }
        let used = page.mask.used(self.item_count);
        debug!(
          page = ?(page as *const Page),
          bucket = label,
          refcount = page.refcount(),
          used,
          free = self.item_count - used,
          "slab chunk"
        );
      }
    }
  }

  fn claim_slot(&mut self, page_ptr: NonNull<Page>) -> NonNull<u8> {
    let page = unsafe { &mut *page_ptr.as_ptr() };
    let slot = page.mask.claim_first_free();
    debug_assert!(slot < self.item_count);

    if page.mask.is_full() {
      self.partial.remove(page);
      page.bucket = Bucket::Full;
      self.full.push_front(page);
    }

    self.stats.count_alloc();

    let ptr = Page::slot_ptr(page_ptr, slot, self.item_size);
    unsafe { SlotHeader::of(ptr) }.index = slot as u8;
    ptr
  }

  /// Moves an empty page into service: fresh mask, partial list, and one
  /// more occupied page on the chunk's books.
  fn activate(&mut self, page_ptr: NonNull<Page>) {
    let page = unsafe { &mut *page_ptr.as_ptr() };
    page.mask = SlotMask::fresh(self.item_count);
    page.bucket = Bucket::Partial;
    self.partial.push_front(page);

    let boss_ptr = Page::boss_of(page_ptr);
    let boss = unsafe { &mut *boss_ptr.as_ptr() };
    if let PageRole::Boss { refcount } = &mut boss.role {
      *refcount += 1;
    }
  }

  /// Requests one chunk from the OS and partitions it: the first page is
  /// the boss, claimed into the partial list; the remainder become slave
  /// pages on the empty list.
  fn map_chunk(&mut self) -> SlabResult<NonNull<Page>> {
    let acquired = if self.page_size <= OS_PAGE_SIZE {
      unsafe { self.system.map(self.pages_per_alloc) }
    } else {
      unsafe { self.system.alloc_aligned(self.page_size, self.pages_per_alloc) }
    };

    let base = match acquired {
      Ok(base) => base,
      Err(err) => {
        self.stats.count_fail();
        error!(
          size = self.pages_per_alloc,
          page_size = self.page_size,
          ?err,
          "chunk acquisition failed"
        );
        return Err(SlabError::SystemExhausted(err));
      }
    };

    let boss_ptr = base.cast::<Page>();
    unsafe {
      boss_ptr.as_ptr().write(Page {
        link: Default::default(),
        role: PageRole::Boss { refcount: 1 },
        mask: SlotMask::fresh(self.item_count),
        bucket: Bucket::Partial,
      });
    }
    self.partial.push_front(unsafe { &mut *boss_ptr.as_ptr() });

    let npages = self.pages_per_alloc / self.page_size;
    for index in 1..npages {
      let slave_ptr = unsafe { base.as_ptr().add(index * self.page_size) } as *mut Page;
      unsafe {
        slave_ptr.write(Page {
          link: Default::default(),
          role: PageRole::Slave { boss: boss_ptr },
          mask: SlotMask::fresh(self.item_count),
          bucket: Bucket::Empty,
        });
        self.empty.push_front(&mut *slave_ptr);
      }
    }

    self.stats.count_mapped(npages * self.item_count);
    Ok(boss_ptr)
  }

  /// Unlinks every page of a chunk and hands the chunk back to the OS with
  /// the primitive matching how it was acquired.
  fn release_chunk(&mut self, boss_ptr: NonNull<Page>) {
    let npages = self.pages_per_alloc / self.page_size;
    for index in 0..npages {
      let page_ptr = unsafe { boss_ptr.as_ptr().cast::<u8>().add(index * self.page_size) };
      self.unlink(unsafe { NonNull::new_unchecked(page_ptr as *mut Page) });
    }

    self.release_to_system(boss_ptr);
  }

  fn unlink(&mut self, page_ptr: NonNull<Page>) {
    let page = unsafe { &mut *page_ptr.as_ptr() };
    match page.bucket {
      Bucket::Empty => self.empty.remove(page),
      Bucket::Partial => self.partial.remove(page),
      Bucket::Full => self.full.remove(page),
    }
  }

  fn release_to_system(&mut self, boss_ptr: NonNull<Page>) {
    let base = boss_ptr.cast::<u8>();
    let released = if self.page_size <= OS_PAGE_SIZE {
      unsafe { self.system.unmap(base, self.pages_per_alloc) }
    } else {
      unsafe { self.system.dealloc_aligned(base, self.pages_per_alloc) }
    };

    if let Err(err) = released {
      warn!(size = self.pages_per_alloc, ?err, "chunk release failed");
    }
  }

  #[cfg(test)]
  pub(crate) fn bucket_lens(&self) -> (usize, usize, usize) {
    (self.empty.len(), self.partial.len(), self.full.len())
  }

  /// Asserts that every page's bucket matches its mask. Test support.
  #[cfg(test)]
  pub(crate) fn assert_consistent(&self) {
    for page in self.empty.iter() {
      assert!(page.mask.is_clear(self.item_count));
      assert_eq!(page.bucket, Bucket::Empty);
    }
    for page in self.partial.iter() {
      assert!(!page.mask.is_full());
      assert_eq!(page.bucket, Bucket::Partial);
    }
    for page in self.full.iter() {
      assert!(page.mask.is_full());
      assert_eq!(page.bucket, Bucket::Full);
    }
  }
}

impl Drop for Slab {
  fn drop(&mut self) {
    // Teardown releases every outstanding chunk regardless of leaks. Drain
    // the lists first so no freed page is ever reachable from a list.
    let mut bosses: Vec<NonNull<Page>> = Vec::new();

    for list in [&mut self.empty, &mut self.partial, &mut self.full] {
      while let Some(page) = list.pop_front() {
        if unsafe { page.as_ref() }.is_boss() {
          bosses.push(page);
        }
      }
    }

    for boss in bosses {
      self.release_to_system(boss);
    }

    self.page_size = 0;
    self.pages_per_alloc = 0;
    self.item_size = 0;
    self.item_count = 0;
    self.alignment_mask = 0;
    self.stats.reset();
  }
}
