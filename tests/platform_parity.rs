//! Platform parity tests for flush visibility and handle behavior across OSes.
//!
//! Contract: after `flush()` (or after the writable view is dropped), a newly
//! opened read-only view must observe the written bytes on all supported platforms.

use mmap_view::{granularity, FileHandle, IfAbsent, IfExists, ReadOnlyView, WritableView};
use std::fs;
use std::path::PathBuf;

fn tmp_path(name: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!(
        "mmap_view_platform_parity_{}_{}",
        name,
        std::process::id()
    ));
    p
}

#[test]
fn parity_flush_visibility_full_file() {
    let path = tmp_path("parity_flush_visibility_full_file");
    let _ = fs::remove_file(&path);

    let mut rw = WritableView::with_size(&path, IfExists::MapAll, IfAbsent::Create, 4096);
    assert!(rw.is_open());

    rw.update_region(0, b"ABCDEFGHIJ").expect("write-1");
    rw.update_region(100, b"klmnop").expect("write-2");
    assert!(rw.flush());

    // Writer still alive: flush alone must be enough.
    let ro = ReadOnlyView::open(&path);
    let data = ro.data().expect("mapped");
    assert_eq!(&data[0..10], b"ABCDEFGHIJ");
    assert_eq!(&data[100..106], b"klmnop");

    drop(ro);
    drop(rw);
    let _ = fs::remove_file(&path);
}

#[test]
fn parity_flush_visibility_unaligned_window() {
    let path = tmp_path("parity_flush_visibility_unaligned_window");
    let _ = fs::remove_file(&path);
    let g = granularity() as u64;

    let mut rw = WritableView::with_size(&path, IfExists::JustOpen, IfAbsent::Create, 2 * g);
    let offset = g + 17;
    rw.map(offset, 6).expect("map").copy_from_slice(b"WINDOW");
    assert_eq!(rw.offset(), offset);
    assert!(rw.flush());
    rw.flush_async().expect("flush_async");

    let bytes = fs::read(&path).expect("read");
    let at = offset as usize;
    assert_eq!(&bytes[at..at + 6], b"WINDOW");
    assert_eq!(bytes[at - 1], 0);
    assert_eq!(bytes[at + 6], 0);

    drop(rw);
    let _ = fs::remove_file(&path);
}

#[test]
fn parity_drop_persists_without_flush() {
    let path = tmp_path("parity_drop_persists_without_flush");
    let _ = fs::remove_file(&path);

    {
        let mut rw = WritableView::with_size(&path, IfExists::MapAll, IfAbsent::Create, 64);
        rw.data_mut().expect("mapped")[..4].copy_from_slice(b"DROP");
    }

    let ro = ReadOnlyView::open(&path);
    assert_eq!(&ro.data().expect("mapped")[..4], b"DROP");

    drop(ro);
    let _ = fs::remove_file(&path);
}

#[test]
fn parity_file_handle_identity() {
    let path = tmp_path("parity_file_handle_identity");
    fs::write(&path, b"handle").expect("write");

    let mut ro = ReadOnlyView::open(&path);
    let before = ro.file_handle();
    assert!(before.is_valid());
    ro.unmap();
    ro.map(1, 0);
    // Remapping never reopens the file.
    assert_eq!(ro.file_handle(), before);
    assert_ne!(before, FileHandle::INVALID);

    #[cfg(unix)]
    assert!(before.raw_fd().is_some());
    #[cfg(windows)]
    assert!(before.raw_handle().is_some());

    drop(ro);
    let _ = fs::remove_file(&path);
}
