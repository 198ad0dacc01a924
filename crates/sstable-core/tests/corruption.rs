#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for tables that cannot be loaded
//!
//! Each case damages a valid file (or fabricates a bad one) and checks that
//! the table settles in the failed state and refuses lookups.

use sstable_core::{Dictionary, FORMAT_VERSION, Footer, Table, TableError, TableStatus, write};
use sstable_test_utils::{init_tracing, scratch_dir};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn valid_table() -> (TempDir, PathBuf) {
    init_tracing();
    let dir = scratch_dir().unwrap();
    let path = dir.path().join("valid.sst");
    let mut dict: Dictionary = (0..50u32)
        .map(|i| (format!("key{i:03}"), format!("value{i}")))
        .collect();
    write(&path, &mut dict).unwrap();
    (dir, path)
}

fn assert_failed(path: &Path) -> TableStatus {
    let table = Table::open(path);
    let status = table.wait_ready();
    assert!(status.is_failed(), "expected failure, got {status:?}");

    match table.get(b"key001") {
        Err(TableError::Unavailable(reason)) => {
            assert_eq!(reason, status.error().unwrap().to_string());
        }
        other => panic!("expected Unavailable, got {other:?}"),
    }
    status
}

#[test]
fn missing_file() {
    let dir = scratch_dir().unwrap();
    let status = assert_failed(&dir.path().join("nope.sst"));
    assert!(status.error().unwrap().is_io());
}

#[test]
fn empty_and_short_files() {
    let dir = scratch_dir().unwrap();
    for len in [0usize, 1, 15] {
        let path = dir.path().join(format!("short-{len}.sst"));
        std::fs::write(&path, vec![0u8; len]).unwrap();
        let status = assert_failed(&path);
        assert!(matches!(
            status.error(),
            Some(TableError::TruncatedInput { needed: 16, .. })
        ));
    }
}

#[test]
fn unknown_format_version() {
    let (_dir, path) = valid_table();
    let mut bytes = std::fs::read(&path).unwrap();
    let len = bytes.len();
    bytes[len - 8..].copy_from_slice(&7u64.to_le_bytes());
    std::fs::write(&path, &bytes).unwrap();

    let status = assert_failed(&path);
    assert!(matches!(
        status.error(),
        Some(TableError::UnsupportedVersion(7))
    ));
}

#[test]
fn index_offset_inside_footer() {
    let (_dir, path) = valid_table();
    let mut bytes = std::fs::read(&path).unwrap();
    let len = bytes.len();
    let footer = Footer::new(len as u64 - 8).to_bytes().unwrap();
    bytes[len - 16..].copy_from_slice(&footer);
    std::fs::write(&path, &bytes).unwrap();

    let status = assert_failed(&path);
    assert!(status.error().unwrap().is_corruption());
}

#[test]
fn truncated_file_loses_footer() {
    let (_dir, path) = valid_table();
    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..bytes.len() - 5]).unwrap();

    // Whatever now sits in the footer slot must not load as a table
    let status = assert_failed(&path);
    let err = status.error().unwrap();
    assert!(
        err.is_corruption() || matches!(err, TableError::UnsupportedVersion(_)),
        "{err}"
    );
}

#[test]
fn malformed_index_varint() {
    let dir = scratch_dir().unwrap();
    let path = dir.path().join("varint.sst");

    // No data, an index of continuation bytes, then a valid footer
    let mut bytes = vec![0xFFu8; 11];
    bytes.extend_from_slice(&Footer::new(0).to_bytes().unwrap());
    std::fs::write(&path, &bytes).unwrap();

    let status = assert_failed(&path);
    assert!(matches!(
        status.error(),
        Some(TableError::MalformedVarint { .. })
    ));
}

#[test]
fn index_entry_past_data_section() {
    let dir = scratch_dir().unwrap();
    let path = dir.path().join("offset.sst");

    // One data pair, index points beyond it
    let mut bytes = b"\x01a\x011".to_vec();
    bytes.extend_from_slice(b"\x01a\x09");
    bytes.extend_from_slice(&4u64.to_le_bytes());
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    std::fs::write(&path, &bytes).unwrap();

    let status = assert_failed(&path);
    assert!(matches!(status.error(), Some(TableError::CorruptIndex(_))));
}

#[test]
fn hand_built_file_is_readable() {
    let dir = scratch_dir().unwrap();
    let path = dir.path().join("manual.sst");

    let mut bytes = b"\x01a\x011\x01b\x012".to_vec();
    bytes.extend_from_slice(b"\x01b\x00");
    bytes.extend_from_slice(&8u64.to_le_bytes());
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    std::fs::write(&path, &bytes).unwrap();

    let table = Table::open(&path);
    assert!(table.wait_ready().is_live());
    assert_eq!(table.get(b"a").unwrap(), Some(b"1".to_vec()));
    assert_eq!(table.get(b"b").unwrap(), Some(b"2".to_vec()));
    assert_eq!(table.get(b"c").unwrap(), None);
}
