//! Mapping core shared by the read-only and writable views.
//!
//! Owns the open file and at most one active view, and turns a caller's
//! `(offset, length)` request into a granularity-aligned OS mapping.

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use memmap2::{Mmap, MmapMut, MmapOptions};

use crate::errors::{MapError, Result};
use crate::handle::FileHandle;
use crate::utils::{align_down, granularity, slice_range};

/// Access mode for a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MmapMode {
    /// Read-only mapping.
    ReadOnly,
    /// Read-write, shared mapping. Writes reach the file.
    ReadWrite,
}

/// Observable lifecycle state of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapState {
    /// No file handle. Permanent once construction failed.
    Closed,
    /// File is open, nothing mapped.
    Opened,
    /// File is open and a view is active.
    Mapped,
}

/// A byte window `[offset, offset + len)` of the file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Window {
    pub(crate) offset: u64,
    pub(crate) len: u64,
}

impl Window {
    const EMPTY: Window = Window { offset: 0, len: 0 };
}

pub(crate) enum View {
    Ro(Mmap),
    Rw(MmapMut),
}

impl View {
    fn bytes(&self) -> &[u8] {
        match self {
            View::Ro(m) => &m[..],
            View::Rw(m) => &m[..],
        }
    }
}

/// Clamp a request to the file and widen it to the mapping granularity.
///
/// Returns `(requested, actual)`. `length == 0` means "to end of file".
pub(crate) fn plan_window(
    offset: u64,
    length: u64,
    file_size: u64,
    granularity: u64,
) -> Result<(Window, Window)> {
    if offset >= file_size {
        return Err(MapError::OffsetBeyondEnd { offset, file_size });
    }
    let available = file_size - offset;
    let len = if length == 0 { available } else { length.min(available) };

    let actual_offset = align_down(offset, granularity);
    let actual_len = (len + (offset - actual_offset)).min(file_size - actual_offset);

    Ok((
        Window { offset, len },
        Window {
            offset: actual_offset,
            len: actual_len,
        },
    ))
}

pub(crate) struct MappingCore {
    path: PathBuf,
    mode: MmapMode,
    // Declared before `file` so the view is released first.
    view: Option<View>,
    file: Option<File>,
    file_size: u64,
    requested: Window,
    actual: Window,
}

impl std::fmt::Debug for MappingCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappingCore")
            .field("path", &self.path)
            .field("mode", &self.mode)
            .field("state", &self.state())
            .field("file_size", &self.file_size)
            .field("offset", &self.requested.offset)
            .field("mapped_size", &self.requested.len)
            .finish()
    }
}

impl MappingCore {
    /// Core for a file that could not be opened.
    pub(crate) fn closed(path: &Path, mode: MmapMode) -> Self {
        Self {
            path: path.to_path_buf(),
            mode,
            view: None,
            file: None,
            file_size: 0,
            requested: Window::EMPTY,
            actual: Window::EMPTY,
        }
    }

    /// Core around a freshly opened file, in the `Opened` state.
    pub(crate) fn opened(path: &Path, mode: MmapMode, file: File) -> Result<Self> {
        let file_size = file.metadata()?.len();
        let mut core = Self::closed(path, mode);
        core.file = Some(file);
        core.file_size = file_size;
        log::debug!("opened {:?} ({:?}, {} bytes)", core.path, mode, file_size);
        Ok(core)
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn state(&self) -> MapState {
        match (&self.file, &self.view) {
            (None, _) => MapState::Closed,
            (Some(_), None) => MapState::Opened,
            (Some(_), Some(_)) => MapState::Mapped,
        }
    }

    pub(crate) fn is_mapped(&self) -> bool {
        self.view.is_some()
    }

    pub(crate) fn offset(&self) -> u64 {
        self.requested.offset
    }

    pub(crate) fn mapped_size(&self) -> u64 {
        self.requested.len
    }

    pub(crate) fn file_size(&self) -> u64 {
        self.file_size
    }

    pub(crate) fn file_handle(&self) -> FileHandle {
        self.file.as_ref().map_or(FileHandle::INVALID, FileHandle::of)
    }

    /// Distance from the start of the aligned view to the requested offset.
    #[allow(clippy::cast_possible_truncation)]
    fn delta(&self) -> usize {
        // bounded by the granularity
        (self.requested.offset - self.actual.offset) as usize
    }

    /// Map `[offset, offset + length)`; `length == 0` maps to end of file.
    ///
    /// Any active view is released first, even if the new mapping fails.
    pub(crate) fn try_map(&mut self, offset: u64, length: u64) -> Result<()> {
        self.unmap();

        let file = self.file.as_ref().ok_or(MapError::NotOpen)?;
        self.file_size = file.metadata()?.len();

        let (requested, actual) =
            plan_window(offset, length, self.file_size, granularity() as u64)?;
        let view_len = usize::try_from(actual.len).map_err(|_| MapError::TooLarge(actual.len))?;
        if actual.offset != requested.offset {
            log::debug!(
                "widened map request {}+{} to aligned {}+{}",
                requested.offset,
                requested.len,
                actual.offset,
                actual.len
            );
        }

        let mut opts = MmapOptions::new();
        opts.offset(actual.offset).len(view_len);
        // SAFETY: the window lies inside the file as measured just above, and
        // memmap2 handles platform-specific mapping details. Concurrent
        // truncation by another process is outside what a mapping can guard.
        let view = unsafe {
            match self.mode {
                MmapMode::ReadOnly => View::Ro(opts.map(file)?),
                MmapMode::ReadWrite => View::Rw(opts.map_mut(file)?),
            }
        };

        self.view = Some(view);
        self.requested = requested;
        self.actual = actual;
        log::debug!(
            "mapped {:?} at {} ({} bytes)",
            self.path,
            requested.offset,
            requested.len
        );
        Ok(())
    }

    /// Like [`try_map`](Self::try_map) but folds the error into state.
    pub(crate) fn map_or_log(&mut self, offset: u64, length: u64) -> bool {
        match self.try_map(offset, length) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("map {:?} at {offset}+{length} failed: {e}", self.path);
                false
            }
        }
    }

    /// Release the active view. Idempotent.
    pub(crate) fn unmap(&mut self) {
        if self.view.take().is_some() {
            log::debug!("unmapped {:?}", self.path);
        }
        self.requested = Window::EMPTY;
        self.actual = Window::EMPTY;
    }

    /// Bytes of the requested window.
    pub(crate) fn data(&self) -> Option<&[u8]> {
        let view = self.view.as_ref()?;
        let start = self.delta();
        let end = start + self.mapped_len();
        Some(&view.bytes()[start..end])
    }

    /// Mutable bytes of the requested window; `None` for read-only views.
    pub(crate) fn data_mut(&mut self) -> Option<&mut [u8]> {
        let start = self.delta();
        let end = start + self.mapped_len();
        match self.view.as_mut()? {
            View::Rw(m) => Some(&mut m[start..end]),
            View::Ro(_) => None,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn mapped_len(&self) -> usize {
        // fits: the view was created with a usize length
        self.requested.len as usize
    }

    /// Copy bytes out of the mapped window starting at `offset` within it.
    pub(crate) fn read_into(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let data = self.data().ok_or_else(|| self.not_mapped())?;
        let (start, end) = slice_range(offset, buf.len() as u64, data.len() as u64)?;
        buf.copy_from_slice(&data[start..end]);
        Ok(())
    }

    /// Copy bytes into the mapped window starting at `offset` within it.
    pub(crate) fn update_region(&mut self, offset: u64, src: &[u8]) -> Result<()> {
        debug_assert_eq!(self.mode, MmapMode::ReadWrite);
        let err = self.not_mapped();
        let data = self.data_mut().ok_or(err)?;
        let (start, end) = slice_range(offset, src.len() as u64, data.len() as u64)?;
        if src.is_empty() {
            return Ok(());
        }
        data[start..end].copy_from_slice(src);
        Ok(())
    }

    fn not_mapped(&self) -> MapError {
        if self.file.is_none() {
            MapError::NotOpen
        } else {
            MapError::NotMapped
        }
    }

    /// Write back modified pages of the active view and wait for completion.
    /// Succeeds trivially when nothing writable is mapped.
    pub(crate) fn flush(&self) -> Result<()> {
        match &self.view {
            Some(View::Rw(m)) => m
                .flush()
                .map_err(|e| MapError::FlushFailed(e.to_string())),
            Some(View::Ro(_)) | None => Ok(()),
        }
    }

    /// Schedule write-back of modified pages without waiting.
    pub(crate) fn flush_async(&self) -> Result<()> {
        match &self.view {
            Some(View::Rw(m)) => m
                .flush_async()
                .map_err(|e| MapError::FlushFailed(e.to_string())),
            Some(View::Ro(_)) | None => Ok(()),
        }
    }

    /// Base address of the aligned view and the offset of the requested
    /// window inside it.
    #[cfg_attr(not(feature = "advise"), allow(dead_code))]
    pub(crate) fn raw_view(&self) -> Option<(*const u8, usize)> {
        let view = self.view.as_ref()?;
        Some((view.bytes().as_ptr(), self.delta()))
    }
}

impl Drop for MappingCore {
    fn drop(&mut self) {
        self.unmap();
        if self.file.take().is_some() {
            log::trace!("closed {:?}", self.path);
        }
    }
}
