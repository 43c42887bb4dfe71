use core::ptr::NonNull;

use slabcore_list::{
  HasLink,
  Link,
};
use slabcore_mask::SlotMask;
use slabcore_sys::math::align_up;

/// Per-slot metadata immediately preceding every user pointer. A bare slab
/// stores the slot index here; the arena overwrites it with the size-class
/// index so `Arena::free` can route without a size hint.
#[repr(C)]
pub struct SlotHeader {
  pub index: u8,
}

pub const SLOT_HEADER_SIZE: usize = core::mem::size_of::<SlotHeader>();

impl SlotHeader {
  /// Header of a user pointer handed out by a slab.
  ///
  /// # Safety
  ///
  /// `ptr` must be a live pointer returned by `Slab::alloc`.
  #[inline]
  pub unsafe fn of<'hdr>(ptr: NonNull<u8>) -> &'hdr mut SlotHeader {
    unsafe { &mut *(ptr.as_ptr().sub(SLOT_HEADER_SIZE) as *mut SlotHeader) }
  }
}

/// List-membership tag. Kept consistent with the mask at all times:
/// `Empty` has no occupied slots, `Full` is the all-ones sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
  Empty,
  Partial,
  Full,
}

/// Structural role of a page within its OS chunk, fixed at partitioning.
///
/// The boss owns the chunk: its `refcount` is the number of pages in the
/// chunk (itself included) holding at least one occupied slot, and it is
/// the only page through which the chunk is released. Slaves hold a
/// non-owning back-reference.
#[derive(Debug)]
pub enum PageRole {
  Boss { refcount: usize },
  Slave { boss: NonNull<Page> },
}

/// Page header, written in place at the base of each page-sized region of a
/// chunk. The slot array follows at `Page::DATA_OFFSET`.
#[repr(C)]
pub struct Page {
  pub(crate) link: Link<Page>,
  pub(crate) role: PageRole,
  pub(crate) mask: SlotMask,
  pub(crate) bucket: Bucket,
}

impl Page {
  /// Byte offset of the slot array, header size rounded up to word
  /// alignment.
  pub const DATA_OFFSET: usize =
    match align_up(core::mem::size_of::<Page>(), core::mem::align_of::<usize>()) {
      Some(offset) => offset,
      None => panic!("page header size overflow"),
    };

  /// Recovers the owning page of an interior pointer by masking the address
  /// down to the page base. The only place raw address masking happens.
  ///
  /// # Safety
  ///
  /// `ptr` must point into the data region of a live page whose slab
  /// computed `alignment_mask` from its page size.
  #[inline]
  pub(crate) unsafe fn from_interior(ptr: *mut u8, alignment_mask: usize) -> NonNull<Page> {
    let base = (ptr as usize) & alignment_mask;
    debug_assert!(base != 0);
    unsafe { NonNull::new_unchecked(base as *mut Page) }
  }

  /// Base of the slot array.
  #[inline]
  pub(crate) fn data_ptr(page: NonNull<Page>) -> *mut u8 {
    unsafe { page.as_ptr().cast::<u8>().add(Self::DATA_OFFSET) }
  }

  /// User pointer of slot `index`, one header past the slot base.
  #[inline]
  pub(crate) fn slot_ptr(page: NonNull<Page>, index: usize, item_size: usize) -> NonNull<u8> {
    let ptr = unsafe {
      Self::data_ptr(page)
        .add(index * item_size)
        .add(SLOT_HEADER_SIZE)
    };
    unsafe { NonNull::new_unchecked(ptr) }
  }

  /// The chunk's boss: the page itself when it is the boss, else its back
  /// reference.
  #[inline]
  pub(crate) fn boss_of(page: NonNull<Page>) -> NonNull<Page> {
    match unsafe { &page.as_ref().role } {
      PageRole::Boss { .. } => page,
      PageRole::Slave { boss } => *boss,
    }
  }

  pub(crate) fn is_boss(&self) -> bool {
    matches!(self.role, PageRole::Boss { .. })
  }

  pub(crate) fn refcount(&self) -> usize {
    match self.role {
      PageRole::Boss { refcount } => refcount,
      PageRole::Slave { .. } => 0,
    }
  }
}

impl HasLink for Page {
  fn link(&self) -> &Link<Self> {
    &self.link
  }

  fn link_mut(&mut self) -> &mut Link<Self> {
    &mut self.link
  }
}
