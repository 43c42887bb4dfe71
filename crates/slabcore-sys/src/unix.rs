#[cfg(any(target_os = "linux", target_os = "macos"))]
use core::ptr::NonNull;

#[cfg(any(target_os = "linux", target_os = "macos"))]
use crate::system::{
  SysError,
  SysResult,
  System,
};

pub struct UnixSystem {}

#[cfg(any(target_os = "linux", target_os = "macos"))]
pub static UNIX_SYSTEM: UnixSystem = UnixSystem {};

#[cfg(any(target_os = "linux", target_os = "macos"))]
impl UnixSystem {
  const fn prot() -> i32 {
    libc::PROT_READ | libc::PROT_WRITE
  }

  const fn flags() -> i32 {
    libc::MAP_PRIVATE | libc::MAP_ANONYMOUS
  }
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
unsafe impl System for UnixSystem {
  unsafe fn map(&self, size: usize) -> SysResult<NonNull<u8>> {
    if size == 0 {
      return Err(SysError::InvalidArgument);
    }

    let ptr = unsafe {
      libc::mmap(
        core::ptr::null_mut(),
        size,
        Self::prot(),
        Self::flags(),
        -1,
        0,
      )
    };

    if ptr == libc::MAP_FAILED {
      return Err(SysError::OutOfMemory);
    }

    NonNull::new(ptr as *mut u8).ok_or(SysError::OutOfMemory)
  }

  unsafe fn unmap(&self, ptr: NonNull<u8>, size: usize) -> SysResult<()> {
    let result = unsafe { libc::munmap(ptr.as_ptr() as *mut libc::c_void, size) };
    if result == 0 {
      return Ok(());
    }

    Err(SysError::InvalidArgument)
  }

  unsafe fn alloc_aligned(&self, align: usize, size: usize) -> SysResult<NonNull<u8>> {
    if !align.is_power_of_two() || align < core::mem::size_of::<*mut u8>() {
      return Err(SysError::InvalidArgument);
    }

    let mut out: *mut libc::c_void = core::ptr::null_mut();
    let err = unsafe { libc::posix_memalign(&mut out, align, size) };
    if err != 0 {
      return Err(SysError::OutOfMemory);
    }

    NonNull::new(out as *mut u8).ok_or(SysError::OutOfMemory)
  }

  unsafe fn dealloc_aligned(&self, ptr: NonNull<u8>, size: usize) -> SysResult<()> {
    _ = size;
    unsafe { libc::free(ptr.as_ptr() as *mut libc::c_void) };
    Ok(())
  }
}
