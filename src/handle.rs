//! Opaque, platform-independent identifier for the open file.

use std::fs::File;

#[cfg(unix)]
use std::os::unix::io::{AsRawFd, RawFd};
#[cfg(windows)]
use std::os::windows::io::{AsRawHandle, RawHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RawRepr {
    Invalid,
    #[cfg(unix)]
    Fd(RawFd),
    #[cfg(windows)]
    Handle(isize),
}

/// Handle of the file behind a view.
///
/// Equality-comparable and copyable. It is [`FileHandle::INVALID`] when the
/// view failed to open its file. The raw descriptor is available for
/// operations this crate does not cover, such as advisory locking; it stays
/// owned by the view and must not be closed by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileHandle(RawRepr);

impl FileHandle {
    /// Sentinel for "no file open".
    pub const INVALID: FileHandle = FileHandle(RawRepr::Invalid);

    #[cfg(unix)]
    pub(crate) fn of(file: &File) -> Self {
        FileHandle(RawRepr::Fd(file.as_raw_fd()))
    }

    #[cfg(windows)]
    pub(crate) fn of(file: &File) -> Self {
        FileHandle(RawRepr::Handle(file.as_raw_handle() as isize))
    }

    /// Whether this refers to an open file.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.0 != RawRepr::Invalid
    }

    /// Raw descriptor, or `None` for the invalid sentinel.
    #[cfg(unix)]
    #[must_use]
    pub fn raw_fd(&self) -> Option<RawFd> {
        match self.0 {
            RawRepr::Fd(fd) => Some(fd),
            RawRepr::Invalid => None,
        }
    }

    /// Raw handle, or `None` for the invalid sentinel.
    #[cfg(windows)]
    #[must_use]
    pub fn raw_handle(&self) -> Option<RawHandle> {
        match self.0 {
            RawRepr::Handle(h) => Some(h as RawHandle),
            RawRepr::Invalid => None,
        }
    }
}

impl Default for FileHandle {
    fn default() -> Self {
        FileHandle::INVALID
    }
}
