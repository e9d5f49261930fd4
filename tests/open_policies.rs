//! Decision table for opening writable views.

use mmap_view::{create_sized, open_or_create, IfAbsent, IfExists, MapError, MapState, WritableView};
use std::fs;
use std::path::PathBuf;

fn existing(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, b"Hello, world!").expect("write fixture");
    path
}

fn absent(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

#[test]
fn existing_file_policies() {
    let dir = tempfile::tempdir().expect("tempdir");

    let path = existing(&dir, "fail.bin");
    let view = WritableView::open(&path, IfExists::Fail, IfAbsent::Create);
    assert_eq!(view.state(), MapState::Closed);
    assert!(matches!(
        WritableView::try_open(&path, IfExists::Fail, IfAbsent::Create, 0),
        Err(MapError::OpenRejected { .. })
    ));

    let path = existing(&dir, "truncate.bin");
    let view = WritableView::open(&path, IfExists::Truncate, IfAbsent::Fail);
    assert_eq!(view.state(), MapState::Opened);
    assert_eq!(view.file_size(), 0);
    drop(view);
    assert_eq!(fs::metadata(&path).expect("metadata").len(), 0);

    let path = existing(&dir, "just_open.bin");
    let view = WritableView::open(&path, IfExists::JustOpen, IfAbsent::Fail);
    assert_eq!(view.state(), MapState::Opened);
    assert!(!view.is_open());
    assert_eq!(view.file_size(), 13);

    let path = existing(&dir, "map_all.bin");
    let view = WritableView::open(&path, IfExists::MapAll, IfAbsent::Fail);
    assert_eq!(view.state(), MapState::Mapped);
    assert_eq!(view.data(), Some(&b"Hello, world!"[..]));
}

#[test]
fn absent_file_policies() {
    let dir = tempfile::tempdir().expect("tempdir");

    let path = absent(&dir, "fail.bin");
    let view = WritableView::open(&path, IfExists::MapAll, IfAbsent::Fail);
    assert_eq!(view.state(), MapState::Closed);
    assert!(!path.exists());
    assert!(matches!(
        WritableView::try_open(&path, IfExists::MapAll, IfAbsent::Fail, 0),
        Err(MapError::OpenRejected { .. })
    ));

    let path = absent(&dir, "create_empty.bin");
    let view = WritableView::open(&path, IfExists::MapAll, IfAbsent::Create);
    assert_eq!(view.state(), MapState::Opened);
    assert_eq!(view.file_size(), 0);
    assert!(path.exists());
}

#[test]
fn created_file_follows_exists_policy_mapping() {
    let dir = tempfile::tempdir().expect("tempdir");

    let path = absent(&dir, "sized_map_all.bin");
    let view = WritableView::with_size(&path, IfExists::MapAll, IfAbsent::Create, 4096);
    assert_eq!(view.state(), MapState::Mapped);
    assert_eq!(view.file_size(), 4096);
    assert_eq!(view.mapped_size(), 4096);
    assert!(view.data().expect("mapped").iter().all(|&b| b == 0));

    for (name, policy) in [
        ("sized_fail.bin", IfExists::Fail),
        ("sized_truncate.bin", IfExists::Truncate),
        ("sized_just_open.bin", IfExists::JustOpen),
    ] {
        let path = absent(&dir, name);
        let view = WritableView::with_size(&path, policy, IfAbsent::Create, 100);
        assert_eq!(view.state(), MapState::Opened, "{name}");
        assert_eq!(view.file_size(), 100, "{name}");
    }
}

#[test]
fn failed_sizing_removes_created_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = absent(&dir, "unsizable.bin");

    let result = WritableView::try_open(&path, IfExists::Fail, IfAbsent::Create, u64::MAX);
    assert!(matches!(result, Err(MapError::Io(_))));
    assert!(!path.exists());

    let view = WritableView::with_size(&path, IfExists::Fail, IfAbsent::Create, u64::MAX);
    assert_eq!(view.state(), MapState::Closed);
    assert!(!path.exists());
    drop(view);

    // Nothing left behind, so a sane retry creates the file.
    let view = WritableView::with_size(&path, IfExists::Fail, IfAbsent::Create, 16);
    assert_eq!(view.state(), MapState::Opened);
    assert_eq!(view.file_size(), 16);
}

#[test]
fn initial_size_ignored_for_existing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = existing(&dir, "keep_size.bin");

    let view = WritableView::with_size(&path, IfExists::MapAll, IfAbsent::Create, 1 << 20);
    assert_eq!(view.file_size(), 13);
    assert_eq!(view.mapped_size(), 13);
}

#[test]
fn manager_helpers() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = absent(&dir, "managed.bin");

    let mut view = create_sized(&path, 256).expect("create_sized");
    assert!(view.is_open());
    view.update_region(0, b"managed").expect("update");
    view.try_flush().expect("flush");
    drop(view);

    assert!(matches!(
        create_sized(&path, 256),
        Err(MapError::OpenRejected { .. })
    ));

    let view = open_or_create(&path, 1).expect("open_or_create");
    assert_eq!(view.file_size(), 256);
    assert_eq!(&view.data().expect("mapped")[..7], b"managed");
    drop(view);

    let ro = mmap_view::open_read_only(&path).expect("open_read_only");
    assert_eq!(ro.mapped_size(), 256);
    drop(ro);

    mmap_view::remove(&path).expect("remove");
    assert!(mmap_view::open_read_only(&path).is_err());
}
