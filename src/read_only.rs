//! Read-only view over an existing file.

use std::{fs::OpenOptions, path::Path};

use crate::errors::{MapError, Result};
use crate::handle::FileHandle;
use crate::mapping::{MapState, MappingCore, MmapMode};

/// Read-only memory-mapped view of an existing file.
///
/// Construction never fails outright: if the file cannot be opened the view
/// stays [`MapState::Closed`] for its whole life, which shows up as
/// `is_open() == false` and zero sizes. Use [`ReadOnlyView::try_open`] to get
/// the reason instead.
///
/// # Examples
///
/// ```no_run
/// use mmap_view::ReadOnlyView;
///
/// let mut view = ReadOnlyView::open("data.bin");
/// if let Some(bytes) = view.data() {
///     println!("first byte: {}", bytes[0]);
/// }
///
/// // Look at the tail only; the offset need not be aligned.
/// if let Some(tail) = view.map(10, 0) {
///     println!("{} bytes from offset 10", tail.len());
/// }
/// ```
#[derive(Debug)]
pub struct ReadOnlyView {
    core: MappingCore,
}

impl ReadOnlyView {
    /// Open `path` read-only and map the whole file.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::with_mapping(path, true)
    }

    /// Open `path` read-only, mapping the whole file only if `map_immediately`.
    pub fn with_mapping<P: AsRef<Path>>(path: P, map_immediately: bool) -> Self {
        let path = path.as_ref();
        match Self::try_open(path, map_immediately) {
            Ok(view) => view,
            Err(e) => {
                log::warn!("open {:?} read-only failed: {e}", path);
                Self {
                    core: MappingCore::closed(path, MmapMode::ReadOnly),
                }
            }
        }
    }

    /// Open `path` read-only, reporting why opening failed.
    ///
    /// A failed initial mapping (for example of an empty file) does not fail
    /// the open; the view is returned unmapped.
    ///
    /// # Errors
    ///
    /// Returns `MapError::Io` if the file is missing or unreadable.
    pub fn try_open<P: AsRef<Path>>(path: P, map_immediately: bool) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new().read(true).open(path)?;
        let mut core = MappingCore::opened(path, MmapMode::ReadOnly, file)?;
        if map_immediately && core.file_size() > 0 {
            core.map_or_log(0, 0);
        }
        Ok(Self { core })
    }

    /// Bytes of the mapped window, or `None` when nothing is mapped.
    #[must_use]
    pub fn data(&self) -> Option<&[u8]> {
        self.core.data()
    }

    /// Map `[offset, offset + length)` of the file, replacing any current
    /// mapping. `length == 0` maps to end of file; lengths past the end are
    /// clamped.
    ///
    /// Returns `None` on failure, in which case the previous mapping is gone
    /// as well.
    pub fn map(&mut self, offset: u64, length: u64) -> Option<&[u8]> {
        if self.core.map_or_log(offset, length) {
            self.core.data()
        } else {
            None
        }
    }

    /// Like [`map`](Self::map) but reports the failure.
    ///
    /// # Errors
    ///
    /// Returns `MapError::NotOpen` if the file is not open,
    /// `MapError::OffsetBeyondEnd` if `offset >= file_size()`, or
    /// `MapError::Io` if the OS refuses the mapping.
    pub fn try_map(&mut self, offset: u64, length: u64) -> Result<&[u8]> {
        self.core.try_map(offset, length)?;
        self.core.data().ok_or(MapError::NotMapped)
    }

    /// Release the current mapping; the file stays open. Idempotent.
    pub fn unmap(&mut self) {
        self.core.unmap();
    }

    /// Copy `buf.len()` bytes starting at `offset` within the mapped window.
    ///
    /// # Errors
    ///
    /// Returns `MapError::NotMapped` without a mapping, or
    /// `MapError::OutOfBounds` if the range leaves the mapped window.
    pub fn read_into(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.core.read_into(offset, buf)
    }

    /// Whether a mapping is active.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.core.is_mapped()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> MapState {
        self.core.state()
    }

    /// Offset of the mapped window in the file, as requested.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.core.offset()
    }

    /// Length of the mapped window, as requested after clamping.
    #[must_use]
    pub fn mapped_size(&self) -> u64 {
        self.core.mapped_size()
    }

    /// Size of the file when it was last measured.
    #[must_use]
    pub fn file_size(&self) -> u64 {
        self.core.file_size()
    }

    /// Handle of the underlying file.
    #[must_use]
    pub fn file_handle(&self) -> FileHandle {
        self.core.file_handle()
    }

    /// Path this view was opened with.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.core.path()
    }

    #[cfg_attr(not(feature = "advise"), allow(dead_code))]
    pub(crate) fn core(&self) -> &MappingCore {
        &self.core
    }
}
