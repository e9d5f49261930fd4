//! # mmap-view: memory-mapped views of files
//!
//! This crate exposes a file's contents as an in-process byte slice by
//! mapping it into memory, so data is read and written through ordinary
//! memory access instead of `read`/`write` calls.
//!
//! ## Features
//!
//! - **Windows of a file**: map any `(offset, length)` range; offsets are
//!   widened to the OS [`granularity`] internally and the caller only ever
//!   sees the requested bytes
//! - **Explicit lifecycle**: `map` / `unmap` as often as needed; the file
//!   stays open until the view is dropped
//! - **Open policies**: [`IfExists`] × [`IfAbsent`] decide whether a writable
//!   view fails, truncates, opens, maps or creates
//! - **Durability on demand**: [`WritableView::flush`] forces modified pages
//!   to disk
//! - **Cross-platform**: Windows, Linux, macOS via memmap2
//!
//! ## Quick Start
//!
//! ```no_run
//! use mmap_view::{IfAbsent, IfExists, ReadOnlyView, WritableView};
//!
//! let mut rw = WritableView::with_size("data.bin", IfExists::MapAll, IfAbsent::Create, 13);
//! if let Some(bytes) = rw.data_mut() {
//!     bytes.copy_from_slice(b"Hello, world!");
//! }
//! assert!(rw.flush());
//! drop(rw);
//!
//! let mut ro = ReadOnlyView::open("data.bin");
//! assert_eq!(ro.map(7, 0), Some(&b"world!"[..]));
//! assert_eq!(ro.offset(), 7);
//! assert_eq!(ro.mapped_size(), 6);
//! ```
//!
//! Failures never panic. The infallible calls report through state: a view
//! whose file could not be opened is closed for good, a failed `map` leaves
//! nothing mapped, and `flush` returns `false`. Every such call has a `try_*`
//! twin returning [`MapError`].
//!
//! ## Modules
//!
//! - [`errors`]: Error types for all operations
//! - [`utils`]: Granularity query, alignment and bounds helpers
//! - [`handle`]: Opaque file handle
//! - [`mapping`]: Lifecycle states
//! - [`read_only`]: [`ReadOnlyView`]
//! - [`writable`]: [`WritableView`] and its open policies
//! - [`manager`]: `Result`-returning convenience constructors
//!
//! ## Feature Flags
//!
//! - `advise` (default): access-pattern hints over the mapped window
//! - `async`: Tokio-based helpers for preparing backing files

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![deny(missing_docs)]
#![doc(html_root_url = "https://docs.rs/mmap-view")]

pub mod errors;
pub mod handle;
pub mod manager;
pub mod mapping;
pub mod read_only;
pub mod utils;
pub mod writable;

#[cfg(feature = "advise")]
pub mod advise;

#[cfg(feature = "advise")]
pub use advise::MmapAdvice;
pub use errors::MapError;
pub use handle::FileHandle;
pub use manager::{create_sized, open_or_create, open_read_only, remove};
pub use mapping::MapState;
pub use read_only::ReadOnlyView;
pub use utils::granularity;
pub use writable::{IfAbsent, IfExists, WritableView};
