use depot_storage::*;
use proptest::prelude::*;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tempfile::TempDir;

fn options(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

fn local(temp: &TempDir) -> Arc<dyn Adapter> {
    let path = temp.path().to_string_lossy().into_owned();
    AdapterKind::Local.build(&options(json!({ "path": path }))).unwrap()
}

fn both(temp: &TempDir) -> [Arc<dyn Adapter>; 2] {
    [local(temp), AdapterKind::Memory.build(&Map::new()).unwrap()]
}

#[test]
fn test_path_traversal_blocked() {
    let temp = TempDir::new().unwrap();
    for adapter in both(&temp) {
        assert!(matches!(adapter.read("../etc/passwd"), Err(StorageError::PathTraversal { .. })));
        assert!(matches!(
            adapter.write("foo/../../bar", b"x"),
            Err(StorageError::PathTraversal { .. })
        ));
        assert!(matches!(adapter.exists(""), Err(StorageError::InvalidPath { .. })));
    }
}

#[test]
fn test_write_read_roundtrip() {
    let temp = TempDir::new().unwrap();
    for adapter in both(&temp) {
        let payload = b"hello world";
        let path = adapter.write("foo/bar.bin", payload).unwrap();
        assert_eq!(path, adapter.root().join("foo/bar.bin"));
        assert!(adapter.exists("foo/bar.bin").unwrap());
        assert_eq!(adapter.read("foo/bar.bin").unwrap(), payload);
        assert_eq!(adapter.read("/foo/bar.bin").unwrap(), payload);
    }
}

#[test]
fn test_delete_and_exists() {
    let temp = TempDir::new().unwrap();
    for adapter in both(&temp) {
        adapter.write("tmp/file.txt", b"x").unwrap();
        assert!(adapter.exists("tmp/file.txt").unwrap());

        assert!(adapter.delete("tmp/file.txt").unwrap());
        assert!(!adapter.exists("tmp/file.txt").unwrap());
        assert!(!adapter.delete("tmp/file.txt").unwrap());
    }
}

#[test]
fn test_exists_sees_external_changes() {
    let temp = TempDir::new().unwrap();
    let adapter = local(&temp);

    assert!(!adapter.exists("outside.txt").unwrap());
    std::fs::write(adapter.root().join("outside.txt"), b"x").unwrap();
    assert!(adapter.exists("outside.txt").unwrap());
    std::fs::remove_file(adapter.root().join("outside.txt")).unwrap();
    assert!(!adapter.exists("outside.txt").unwrap());
}

#[test]
fn test_make_dir_twice() {
    let temp = TempDir::new().unwrap();
    for adapter in both(&temp) {
        assert!(adapter.make_dir("x/y", DirOptions::default()).unwrap());
        assert!(adapter.make_dir("x/y", DirOptions::default()).unwrap());
        assert!(adapter.exists("x/y").unwrap());
    }
}

#[test]
fn test_read_missing_returns_file_not_found() {
    let temp = TempDir::new().unwrap();
    for adapter in both(&temp) {
        let err = adapter.read("missing.bin").expect_err("expected error");
        match err {
            StorageError::FileNotFound { .. } => {},
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

#[test]
fn test_missing_target_below_a_file() {
    let temp = TempDir::new().unwrap();
    for adapter in both(&temp) {
        adapter.write("a", b"content").unwrap();

        assert!(!adapter.exists("a/x").unwrap(), "{:?}", adapter.kind());
        assert!(!adapter.delete("a/x").unwrap(), "{:?}", adapter.kind());
        assert!(matches!(adapter.read("a/x"), Err(StorageError::FileNotFound { .. })));
        assert!(matches!(adapter.image_size("a/x"), Err(StorageError::FileNotFound { .. })));
    }
}

#[test]
fn test_failed_write_keeps_prior_state() {
    let temp = TempDir::new().unwrap();
    for adapter in both(&temp) {
        adapter.write("a", b"content").unwrap();

        assert!(matches!(adapter.write("a/b/c/f", b"x"), Err(StorageError::Io { .. })));
        assert!(matches!(
            adapter.make_dir("a/b/c", DirOptions::default()),
            Err(StorageError::Io { .. })
        ));
        assert!(!adapter.exists("a/b").unwrap(), "{:?}", adapter.kind());
        assert!(!adapter.exists("a/b/c").unwrap(), "{:?}", adapter.kind());
        assert_eq!(adapter.read("a").unwrap(), b"content");
    }
}

#[test]
fn test_media_on_text_is_unsupported() {
    let temp = TempDir::new().unwrap();
    for adapter in both(&temp) {
        adapter.write("notes.txt", b"Some test content").unwrap();
        assert!(matches!(
            adapter.image_size("notes.txt"),
            Err(StorageError::UnsupportedMedia { .. })
        ));
        assert!(matches!(
            adapter.exif_data("notes.txt"),
            Err(StorageError::UnsupportedMedia { .. })
        ));
    }
}

#[test]
fn test_unknown_kind_and_bad_options() {
    assert!(matches!("ftp".parse::<AdapterKind>(), Err(StorageError::UnknownAdapter { .. })));
    let err = AdapterKind::Local.build(&options(json!({ "path": 42 }))).unwrap_err();
    assert!(matches!(err, StorageError::Options { .. }));
}

proptest! {
    #[test]
    fn rooted_and_relative_names_are_the_same_entry(
        segments in proptest::collection::vec("[a-z0-9_]{1,8}", 1..4)
    ) {
        let adapter = MemoryAdapter::new("/base");
        let relative = segments.join("/");
        let rooted = format!("/{relative}");

        let written = adapter.write(&relative, b"x").unwrap();
        prop_assert_eq!(&written, &std::path::Path::new("/base").join(&relative));
        prop_assert_eq!(adapter.write(&rooted, b"y").unwrap(), written);
        prop_assert_eq!(adapter.read(&relative).unwrap(), b"y".to_vec());
    }
}
