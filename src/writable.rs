//! Read/write view with create/open/truncate policies and explicit flush.

use std::{
    fs::{self, File, OpenOptions},
    io,
    path::Path,
};

use crate::errors::{MapError, Result};
use crate::handle::FileHandle;
use crate::mapping::{MapState, MappingCore, MmapMode};

/// What to do when the file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IfExists {
    /// Do not open it.
    Fail,
    /// Open it and truncate it to zero bytes.
    Truncate,
    /// Open it unchanged without mapping.
    JustOpen,
    /// Open it unchanged and map the whole file.
    MapAll,
}

/// What to do when the file does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IfAbsent {
    /// Do not create it.
    Fail,
    /// Create it, empty or at the requested initial size.
    Create,
}

/// Read/write memory-mapped view of a file.
///
/// Writes through [`data_mut`](Self::data_mut) land in the shared mapping and
/// reach the file eventually; [`flush`](Self::flush) forces them to stable
/// storage now. Dropping the view unmaps and closes the file.
///
/// # Examples
///
/// ```no_run
/// use mmap_view::{IfAbsent, IfExists, WritableView};
///
/// let mut view = WritableView::with_size("data.bin", IfExists::MapAll, IfAbsent::Create, 4096);
/// if let Some(bytes) = view.data_mut() {
///     bytes[..5].copy_from_slice(b"hello");
/// }
/// assert!(view.flush());
/// ```
#[derive(Debug)]
pub struct WritableView {
    core: MappingCore,
}

impl WritableView {
    /// Open `path` according to the two policies. A created file is empty.
    pub fn open<P: AsRef<Path>>(path: P, if_exists: IfExists, if_absent: IfAbsent) -> Self {
        Self::with_size(path, if_exists, if_absent, 0)
    }

    /// Open `path` according to the two policies. A created file is sized to
    /// `initial_size` bytes; existing files are never resized by this.
    pub fn with_size<P: AsRef<Path>>(
        path: P,
        if_exists: IfExists,
        if_absent: IfAbsent,
        initial_size: u64,
    ) -> Self {
        let path = path.as_ref();
        match Self::try_open(path, if_exists, if_absent, initial_size) {
            Ok(view) => view,
            Err(e) => {
                log::warn!("open {:?} read/write failed: {e}", path);
                Self {
                    core: MappingCore::closed(path, MmapMode::ReadWrite),
                }
            }
        }
    }

    /// Open `path` according to the two policies, reporting why opening
    /// failed.
    ///
    /// Existence is checked first; the matching policy decides whether the
    /// file is opened, truncated or created, and whether the whole file is
    /// mapped afterwards (only [`IfExists::MapAll`] maps). A failed initial
    /// mapping, e.g. of an empty file, leaves the view open but unmapped.
    ///
    /// # Errors
    ///
    /// Returns `MapError::OpenRejected` when a `Fail` policy applies, or
    /// `MapError::Io` if the OS cannot open, create or size the file.
    pub fn try_open<P: AsRef<Path>>(
        path: P,
        if_exists: IfExists,
        if_absent: IfAbsent,
        initial_size: u64,
    ) -> Result<Self> {
        let path = path.as_ref();
        let file = if exists(path)? {
            open_existing(path, if_exists)?
        } else {
            create_absent(path, if_absent, initial_size)?
        };
        let mut core = MappingCore::opened(path, MmapMode::ReadWrite, file)?;
        // An empty file has nothing to map.
        if if_exists == IfExists::MapAll && core.file_size() > 0 {
            core.map_or_log(0, 0);
        }
        Ok(Self { core })
    }

    /// Bytes of the mapped window, or `None` when nothing is mapped.
    #[must_use]
    pub fn data(&self) -> Option<&[u8]> {
        self.core.data()
    }

    /// Mutable bytes of the mapped window, or `None` when nothing is mapped.
    pub fn data_mut(&mut self) -> Option<&mut [u8]> {
        self.core.data_mut()
    }

    /// Map `[offset, offset + length)` of the file for writing, replacing any
    /// current mapping. `length == 0` maps to end of file; lengths past the
    /// end are clamped.
    ///
    /// Returns `None` on failure, in which case the previous mapping is gone
    /// as well.
    pub fn map(&mut self, offset: u64, length: u64) -> Option<&mut [u8]> {
        if self.core.map_or_log(offset, length) {
            self.core.data_mut()
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
    pub fn try_map(&mut self, offset: u64, length: u64) -> Result<&mut [u8]> {
        self.core.try_map(offset, length)?;
        self.core.data_mut().ok_or(MapError::NotMapped)
    }

    /// Release the current mapping; the file stays open. Idempotent.
    ///
    /// Unflushed changes are still written back by the OS eventually.
    pub fn unmap(&mut self) {
        self.core.unmap();
    }

    /// Force modified pages of the current mapping to stable storage.
    ///
    /// Returns `true` on success, including when nothing is mapped. Only
    /// writes made before the call are covered.
    pub fn flush(&self) -> bool {
        match self.try_flush() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("flush {:?} failed: {e}", self.core.path());
                false
            }
        }
    }

    /// Like [`flush`](Self::flush) but reports the failure.
    ///
    /// # Errors
    ///
    /// Returns `MapError::FlushFailed` if the OS reports a write-back error.
    pub fn try_flush(&self) -> Result<()> {
        self.core.flush()
    }

    /// Start writing back modified pages without waiting for completion.
    ///
    /// # Errors
    ///
    /// Returns `MapError::FlushFailed` if the OS rejects the request.
    pub fn flush_async(&self) -> Result<()> {
        self.core.flush_async()
    }

    /// Copy `data` into the mapped window starting at `offset` within it.
    /// Empty `data` writes nothing but is still checked against the state.
    ///
    /// # Errors
    ///
    /// Returns `MapError::NotOpen` or `MapError::NotMapped` without a mapping, or
    /// `MapError::OutOfBounds` if the range leaves the mapped window.
    pub fn update_region(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        self.core.update_region(offset, data)
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

fn exists(path: &Path) -> Result<bool> {
    match fs::metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn open_existing(path: &Path, policy: IfExists) -> Result<File> {
    let mut opts = OpenOptions::new();
    opts.read(true).write(true);
    match policy {
        IfExists::Fail => {
            return Err(MapError::OpenRejected {
                path: path.to_path_buf(),
                reason: "file already exists",
            })
        }
        IfExists::Truncate => {
            opts.truncate(true);
        }
        IfExists::JustOpen | IfExists::MapAll => {}
    }
    Ok(opts.open(path)?)
}

fn create_absent(path: &Path, policy: IfAbsent, initial_size: u64) -> Result<File> {
    match policy {
        IfAbsent::Fail => Err(MapError::OpenRejected {
            path: path.to_path_buf(),
            reason: "file does not exist",
        }),
        IfAbsent::Create => {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create_new(true)
                .open(path)?;
            if initial_size > 0 {
                if let Err(e) = file.set_len(initial_size) {
                    // Leave no half-created file behind.
                    drop(file);
                    let _ = fs::remove_file(path);
                    return Err(e.into());
                }
            }
            Ok(file)
        }
    }
}
