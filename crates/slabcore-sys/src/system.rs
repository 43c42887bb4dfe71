use core::ptr::NonNull;

#[cfg(any(target_os = "linux", target_os = "macos"))]
use crate::unix::UNIX_SYSTEM;

#[derive(Debug, PartialEq)]
pub enum SysError {
  Unsupported,
  OutOfMemory,
  InvalidArgument,
}

pub type SysResult<T> = Result<T, SysError>;

/// OS-level chunk acquisition and release.
///
/// The two acquisition paths carry distinct release primitives; a chunk must
/// be released with the primitive that matches how it was obtained.
///
/// # Safety
///
/// Implementors must ensure that:
/// - `map` returns memory aligned to the OS page size, readable and writable
/// - `alloc_aligned` returns memory aligned to `align`
/// - `unmap` only receives regions previously returned by `map`
/// - `dealloc_aligned` only receives regions previously returned by
///   `alloc_aligned`
/// - Memory is not accessed after release
pub unsafe trait System
where
  Self: Send + Sync,
{
  /// Anonymous private mapping of `size` bytes.
  ///
  /// # Safety
  ///
  /// Caller must release the region with `unmap` and the same size.
  unsafe fn map(&self, size: usize) -> SysResult<NonNull<u8>> {
    _ = size;
    Err(SysError::Unsupported)
  }

  /// Releases a region obtained from `map`.
  ///
  /// # Safety
  ///
  /// `ptr`/`size` must denote exactly one prior `map` result, not yet
  /// released.
  unsafe fn unmap(&self, ptr: NonNull<u8>, size: usize) -> SysResult<()> {
    _ = (ptr, size);
    Err(SysError::Unsupported)
  }

  /// Allocation of `size` bytes aligned to `align` (a power of two).
  ///
  /// # Safety
  ///
  /// Caller must release the region with `dealloc_aligned`.
  unsafe fn alloc_aligned(&self, align: usize, size: usize) -> SysResult<NonNull<u8>> {
    _ = (align, size);
    Err(SysError::Unsupported)
  }

  /// Releases a region obtained from `alloc_aligned`.
  ///
  /// # Safety
  ///
  /// `ptr` must denote exactly one prior `alloc_aligned` result, not yet
  /// released.
  unsafe fn dealloc_aligned(&self, ptr: NonNull<u8>, size: usize) -> SysResult<()> {
    _ = (ptr, size);
    Err(SysError::Unsupported)
  }
}

pub struct UnsupportedSystem {}
unsafe impl System for UnsupportedSystem {}

#[cfg(any(target_os = "linux", target_os = "macos"))]
pub static GLOBAL_SYSTEM: &dyn System = &UNIX_SYSTEM;

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
pub static GLOBAL_SYSTEM: &dyn System = &UnsupportedSystem {};
