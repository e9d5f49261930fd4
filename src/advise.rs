//! Memory advise operations for optimizing OS behavior over the mapped window.

use crate::errors::{MapError, Result};
use crate::mapping::MappingCore;
use crate::read_only::ReadOnlyView;
use crate::utils::{align_down, granularity, slice_range};
use crate::writable::WritableView;

/// Memory access pattern advice for the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MmapAdvice {
    /// Normal access pattern (default).
    Normal,
    /// Random access pattern.
    Random,
    /// Sequential access pattern.
    Sequential,
    /// Will need this range soon.
    WillNeed,
    /// Won't need this range soon.
    DontNeed,
}

impl MappingCore {
    pub(crate) fn advise(&self, offset: u64, len: u64, advice: MmapAdvice) -> Result<()> {
        let (base, delta) = self.raw_view().ok_or(MapError::NotMapped)?;
        let (start, end) = slice_range(offset, len, self.mapped_size())?;
        if len == 0 {
            return Ok(());
        }

        // The view base is granularity-aligned; madvise wants a page-aligned address.
        let abs_start = delta + start;
        let aligned_start = align_down(abs_start as u64, granularity() as u64) as usize;
        let length = delta + end - aligned_start;

        #[cfg(unix)]
        {
            use libc::{madvise, MADV_DONTNEED, MADV_NORMAL, MADV_RANDOM, MADV_SEQUENTIAL, MADV_WILLNEED};

            let advice_flag = match advice {
                MmapAdvice::Normal => MADV_NORMAL,
                MmapAdvice::Random => MADV_RANDOM,
                MmapAdvice::Sequential => MADV_SEQUENTIAL,
                MmapAdvice::WillNeed => MADV_WILLNEED,
                MmapAdvice::DontNeed => MADV_DONTNEED,
            };

            // SAFETY: [aligned_start, aligned_start + length) lies inside the active view.
            let result = unsafe {
                let addr = base.add(aligned_start);
                madvise(addr as *mut libc::c_void, length, advice_flag)
            };

            if result != 0 {
                let err = std::io::Error::last_os_error();
                return Err(MapError::AdviceFailed(format!("madvise failed: {err}")));
            }
        }

        #[cfg(windows)]
        {
            // Windows only supports prefetching (WillNeed equivalent)
            if matches!(advice, MmapAdvice::WillNeed) {
                #[allow(non_snake_case)]
                #[repr(C)]
                struct WIN32_MEMORY_RANGE_ENTRY {
                    VirtualAddress: *mut core::ffi::c_void,
                    NumberOfBytes: usize,
                }

                extern "system" {
                    fn PrefetchVirtualMemory(
                        hProcess: *mut core::ffi::c_void,
                        NumberOfEntries: usize,
                        VirtualAddresses: *const WIN32_MEMORY_RANGE_ENTRY,
                        Flags: u32,
                    ) -> i32;

                    fn GetCurrentProcess() -> *mut core::ffi::c_void;
                }

                // SAFETY: [aligned_start, aligned_start + length) lies inside the active view.
                let entry = WIN32_MEMORY_RANGE_ENTRY {
                    VirtualAddress: unsafe { base.add(aligned_start) } as *mut core::ffi::c_void,
                    NumberOfBytes: length,
                };

                // SAFETY: the entry describes memory mapped by this process.
                let result = unsafe { PrefetchVirtualMemory(GetCurrentProcess(), 1, &entry, 0) };

                if result == 0 {
                    let err = std::io::Error::last_os_error();
                    return Err(MapError::AdviceFailed(format!(
                        "PrefetchVirtualMemory failed: {err}"
                    )));
                }
            }
            // Other advice types are no-ops on Windows
        }

        #[cfg(not(any(unix, windows)))]
        {
            let _ = (base, aligned_start, length, advice);
        }

        Ok(())
    }
}

impl ReadOnlyView {
    /// Advise the OS about the expected access pattern for
    /// `[offset, offset + len)` of the mapped window.
    ///
    /// The advice is a hint and may be ignored. On Windows only `WillNeed`
    /// has an effect (it prefetches the range); the other values succeed
    /// without doing anything.
    ///
    /// # Errors
    ///
    /// Returns `MapError::NotMapped` without a mapping,
    /// `MapError::OutOfBounds` if the range leaves the window, or
    /// `MapError::AdviceFailed` if the system call fails.
    pub fn advise(&self, offset: u64, len: u64, advice: MmapAdvice) -> Result<()> {
        self.core().advise(offset, len, advice)
    }
}

impl WritableView {
    /// Advise the OS about the expected access pattern for
    /// `[offset, offset + len)` of the mapped window.
    ///
    /// `DontNeed` on a writable shared mapping keeps modified data; it only
    /// drops the pages from this process. On Windows only `WillNeed` has an
    /// effect (it prefetches the range).
    ///
    /// # Errors
    ///
    /// Returns `MapError::NotMapped` without a mapping,
    /// `MapError::OutOfBounds` if the range leaves the window, or
    /// `MapError::AdviceFailed` if the system call fails.
    pub fn advise(&self, offset: u64, len: u64, advice: MmapAdvice) -> Result<()> {
        self.core().advise(offset, len, advice)
    }
}
