use crate::util::conversions;
use crate::util::Address;
use std::io::{Error, Result};

/// Zero `len` bytes starting at `start`.
pub fn zero(start: Address, len: usize) {
    unsafe { std::ptr::write_bytes(start.to_mut_ptr::<u8>(), 0, len) }
}

/// Copy `len` bytes from `src` to `dst`. The two ranges may overlap, which is the case when
/// compaction slides an object over its own old location.
pub fn memory_copy(src: Address, dst: Address, len: usize) {
    unsafe { std::ptr::copy(src.to_ptr::<u8>(), dst.to_mut_ptr::<u8>(), len) }
}

/// Demand-zero mmap anywhere in the address space:
/// This function guarantees to zero all mapped memory. `size` is rounded up to whole pages.
pub fn dzmmap_anywhere(size: usize) -> Result<Address> {
    let size = conversions::pages_to_bytes(conversions::bytes_to_pages_up(size));
    let prot = libc::PROT_READ | libc::PROT_WRITE;
    let flags = libc::MAP_ANON | libc::MAP_PRIVATE;
    let ret = unsafe { libc::mmap(std::ptr::null_mut(), size, prot, flags, -1, 0) };
    if ret == libc::MAP_FAILED {
        Err(Error::last_os_error())
    } else {
        let start = Address::from_mut_ptr(ret);
        debug_assert!(conversions::is_page_aligned(start));
        #[cfg(not(target_os = "linux"))]
        zero(start, size);
        Ok(start)
    }
}

/// Unmap a range previously returned by [`dzmmap_anywhere`]. `size` is rounded up to whole pages.
pub fn munmap(start: Address, size: usize) -> Result<()> {
    let size = conversions::pages_to_bytes(conversions::bytes_to_pages_up(size));
    wrap_libc_call(&|| unsafe { libc::munmap(start.to_mut_ptr(), size) }, 0)
}

fn wrap_libc_call<T: PartialEq>(f: &dyn Fn() -> T, expect: T) -> Result<()> {
    let ret = f();
    if ret == expect {
        Ok(())
    } else {
        Err(Error::last_os_error())
    }
}
