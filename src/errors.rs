//! Crate-specific error types for mmap-view.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias for mmap-view operations.
pub type Result<T> = std::result::Result<T, MapError>;

/// Error type covering open, map, bounds and flush failures.
///
/// The infallible entry points (`open`, `map`, `flush`) fold these into
/// observable state; the `try_*` variants return them directly.
#[derive(Debug, Error)]
pub enum MapError {
    /// Wrapper for `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The open policy refused to open or create the file.
    #[error("open rejected for {path:?}: {reason}")]
    OpenRejected {
        /// Path that was requested.
        path: PathBuf,
        /// Which policy rejected it.
        reason: &'static str,
    },

    /// The object has no open file.
    #[error("file is not open")]
    NotOpen,

    /// The object has an open file but no active view.
    #[error("no active mapping")]
    NotMapped,

    /// Requested mapping offset lies at or beyond the end of the file.
    #[error("offset {offset} is beyond end of file (size {file_size})")]
    OffsetBeyondEnd {
        /// Requested offset.
        offset: u64,
        /// File size at the time of the request.
        file_size: u64,
    },

    /// The aligned window does not fit in the address space.
    #[error("mapping of {0} bytes exceeds the address space")]
    TooLarge(u64),

    /// Error when a requested offset/length pair is out of bounds.
    #[error("range out of bounds: offset={offset}, len={len}, total={total}")]
    OutOfBounds {
        /// Requested offset.
        offset: u64,
        /// Requested length.
        len: u64,
        /// Total size of the mapped window.
        total: u64,
    },

    /// Error when a flush operation fails.
    #[error("flush failed: {0}")]
    FlushFailed(String),

    /// Error when a memory advise call fails.
    #[error("advise failed: {0}")]
    AdviceFailed(String),
}
