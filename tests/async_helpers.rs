#![cfg(feature = "async")]
//! Async helpers: files prepared on the Tokio runtime map like any other.

use mmap_view::manager::r#async::{create_sized_async, remove_async};
use mmap_view::ReadOnlyView;
use std::fs;
use std::path::PathBuf;

fn tmp_path(name: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!(
        "mmap_view_async_test_{}_{}",
        name,
        std::process::id()
    ));
    p
}

#[tokio::test(flavor = "multi_thread")]
async fn async_created_file_is_mapped() {
    let path = tmp_path("async_created_file_is_mapped");
    let _ = fs::remove_file(&path);

    let mut rw = create_sized_async(&path, 1024).await.expect("create_sized_async");
    assert!(rw.is_open());
    assert_eq!(rw.mapped_size(), 1024);
    rw.update_region(128, b"ASYNC").expect("update_region");
    assert!(rw.flush());
    drop(rw);

    let ro = ReadOnlyView::open(&path);
    assert_eq!(&ro.data().expect("mapped")[128..133], b"ASYNC");
    drop(ro);

    remove_async(&path).await.expect("remove_async");
    assert!(!path.exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn async_create_truncates_existing() {
    let path = tmp_path("async_create_truncates_existing");
    fs::write(&path, b"old contents").expect("write");

    let rw = create_sized_async(&path, 4).await.expect("create_sized_async");
    assert_eq!(rw.file_size(), 4);
    assert_eq!(rw.data(), Some(&[0u8; 4][..]));
    drop(rw);

    remove_async(&path).await.expect("remove_async");
}
