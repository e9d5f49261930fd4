//! High-level helpers for common open patterns.
//!
//! Thin wrappers over the view constructors that return `Result` instead of
//! a closed view, for callers that prefer `?` over state checks.

use std::fs;
use std::path::Path;

use crate::errors::Result;
use crate::read_only::ReadOnlyView;
use crate::writable::{IfAbsent, IfExists, WritableView};

/// Open an existing file read-only and map all of it.
///
/// # Errors
///
/// Returns errors from `ReadOnlyView::try_open`.
pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<ReadOnlyView> {
    ReadOnlyView::try_open(path, true)
}

/// Create a new file of `size` bytes and map it read/write.
/// Fails if the file already exists.
///
/// # Errors
///
/// Returns `MapError::OpenRejected` if the file exists, or I/O errors from
/// creating or sizing it.
pub fn create_sized<P: AsRef<Path>>(path: P, size: u64) -> Result<WritableView> {
    let mut view = WritableView::try_open(path, IfExists::Fail, IfAbsent::Create, size)?;
    if size > 0 {
        view.try_map(0, 0)?;
    }
    Ok(view)
}

/// Map an existing file read/write, or create it with `size` bytes first.
///
/// # Errors
///
/// Returns I/O errors from opening, creating or sizing the file.
pub fn open_or_create<P: AsRef<Path>>(path: P, size: u64) -> Result<WritableView> {
    WritableView::try_open(path, IfExists::MapAll, IfAbsent::Create, size)
}

/// Delete the file backing a view. Drop every view of it first; on Unix the
/// data lives on until the last mapping goes away.
///
/// # Errors
///
/// Returns `MapError::Io` if the delete operation fails.
pub fn remove<P: AsRef<Path>>(path: P) -> Result<()> {
    fs::remove_file(path)?;
    Ok(())
}

#[cfg(feature = "async")]
pub mod r#async {
    //! Async helpers (Tokio) for preparing backing files without blocking the current thread.
    use std::path::Path;

    use tokio::fs as tfs;

    use crate::errors::Result;
    use crate::writable::{IfAbsent, IfExists, WritableView};

    /// Create (or truncate) a file of `size` bytes asynchronously, then map it read/write.
    ///
    /// # Errors
    ///
    /// Returns errors from async file operations or mapping.
    pub async fn create_sized_async<P: AsRef<Path>>(path: P, size: u64) -> Result<WritableView> {
        let path_ref = path.as_ref();
        let file = tfs::OpenOptions::new()
            .create(true)
            .write(true)
            .read(true)
            .truncate(true)
            .open(path_ref)
            .await?;
        file.set_len(size).await?;
        drop(file);
        WritableView::try_open(path_ref, IfExists::MapAll, IfAbsent::Fail, 0)
    }

    /// Delete a file asynchronously.
    ///
    /// # Errors
    ///
    /// Returns `MapError::Io` if the async delete operation fails.
    pub async fn remove_async<P: AsRef<Path>>(path: P) -> Result<()> {
        tfs::remove_file(path).await?;
        Ok(())
    }
}
