//! Tests for the archive transfer engine
//!
//! Covers the round-trip properties the sync flows depend on:
//! - file sets and contents survive build-then-extract
//! - empty directories survive via the trailing "." marker entries
//! - exclusion patterns and the binding record are dropped
//! - repeated builds of an unchanged tree are byte-identical

use lamsync::archive::{extract_archive, ArchiveEngine};
use lamsync::binding::BINDING_FILENAME;
use lamsync::config::DEFAULT_EXCLUDES;
use lamsync::error::SyncError;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn default_engine() -> ArchiveEngine {
    let patterns: Vec<String> = DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect();
    ArchiveEngine::new(&patterns).unwrap()
}

fn write_file(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

// ============================================================================
// Round-Trip Tests
// ============================================================================

#[test]
fn round_trip_preserves_files_and_content() {
    let source = TempDir::new().unwrap();
    write_file(source.path(), "handler.py", "def handler(event, context):\n    return event\n");
    write_file(source.path(), "lib/util.py", "VALUE = 42\n");
    write_file(source.path(), "lib/deep/nested.txt", "nested");

    let engine = default_engine();
    let bytes = engine.build_archive(source.path()).unwrap();

    let target = TempDir::new().unwrap();
    extract_archive(&bytes, target.path()).unwrap();

    assert_eq!(
        fs::read_to_string(target.path().join("handler.py")).unwrap(),
        "def handler(event, context):\n    return event\n"
    );
    assert_eq!(
        fs::read_to_string(target.path().join("lib/util.py")).unwrap(),
        "VALUE = 42\n"
    );
    assert_eq!(
        fs::read_to_string(target.path().join("lib/deep/nested.txt")).unwrap(),
        "nested"
    );
}

#[test]
fn empty_directory_survives_round_trip() {
    let source = TempDir::new().unwrap();
    write_file(source.path(), "main.py", "pass\n");
    fs::create_dir_all(source.path().join("empty/also_empty")).unwrap();

    let engine = default_engine();
    let bytes = engine.build_archive(source.path()).unwrap();

    let target = TempDir::new().unwrap();
    extract_archive(&bytes, target.path()).unwrap();

    assert!(target.path().join("empty").is_dir());
    assert!(target.path().join("empty/also_empty").is_dir());
}

#[test]
fn repeated_builds_are_byte_identical() {
    let source = TempDir::new().unwrap();
    write_file(source.path(), "b.py", "b\n");
    write_file(source.path(), "a.py", "a\n");
    fs::create_dir_all(source.path().join("empty")).unwrap();

    let engine = default_engine();
    let first = engine.build_archive(source.path()).unwrap();
    let second = engine.build_archive(source.path()).unwrap();
    assert_eq!(first, second);
}

// ============================================================================
// Exclusion Tests
// ============================================================================

#[test]
fn bytecode_artifacts_are_excluded() {
    let source = TempDir::new().unwrap();
    write_file(source.path(), "handler.py", "pass\n");
    write_file(source.path(), "handler.pyc", "compiled");
    write_file(source.path(), "__pycache__/handler.cpython-312.pyc", "cache");

    let engine = default_engine();
    let bytes = engine.build_archive(source.path()).unwrap();

    let target = TempDir::new().unwrap();
    extract_archive(&bytes, target.path()).unwrap();

    assert!(target.path().join("handler.py").is_file());
    assert!(!target.path().join("handler.pyc").exists());
    assert!(!target.path().join("__pycache__").exists());
}

#[test]
fn binding_record_never_travels_with_the_code() {
    let source = TempDir::new().unwrap();
    write_file(source.path(), "main.py", "pass\n");
    write_file(source.path(), BINDING_FILENAME, r#"{"FunctionName": "f"}"#);

    let engine = default_engine();
    let bytes = engine.build_archive(source.path()).unwrap();

    let target = TempDir::new().unwrap();
    extract_archive(&bytes, target.path()).unwrap();

    assert!(target.path().join("main.py").is_file());
    assert!(!target.path().join(BINDING_FILENAME).exists());
}

#[test]
fn custom_exclusion_patterns_apply() {
    let source = TempDir::new().unwrap();
    write_file(source.path(), "keep.txt", "keep");
    write_file(source.path(), "drop.log", "drop");

    let engine = ArchiveEngine::new(&["*.log".to_string()]).unwrap();
    let bytes = engine.build_archive(source.path()).unwrap();

    let target = TempDir::new().unwrap();
    extract_archive(&bytes, target.path()).unwrap();

    assert!(target.path().join("keep.txt").is_file());
    assert!(!target.path().join("drop.log").exists());
}

// ============================================================================
// Failure and Freshness Tests
// ============================================================================

#[test]
fn build_archive_on_missing_directory_fails() {
    let engine = default_engine();
    let err = engine
        .build_archive(Path::new("/definitely/not/a/real/dir"))
        .unwrap_err();
    assert!(matches!(err, SyncError::Io(_)));
}

#[test]
fn non_zip_payload_is_a_corrupt_archive() {
    let engine = default_engine();
    let err = engine.extract_to_temp(b"<html>not a zip</html>").unwrap_err();
    assert!(matches!(err, SyncError::CorruptArchive(_)));
}

#[test]
fn each_extraction_gets_a_fresh_directory() {
    let source = TempDir::new().unwrap();
    write_file(source.path(), "main.py", "pass\n");

    let engine = default_engine();
    let bytes = engine.build_archive(source.path()).unwrap();

    let first = engine.extract_to_temp(&bytes).unwrap();
    let second = engine.extract_to_temp(&bytes).unwrap();

    assert_ne!(first, second);
    assert!(first.join("main.py").is_file());
    assert!(second.join("main.py").is_file());

    fs::remove_dir_all(first).unwrap();
    fs::remove_dir_all(second).unwrap();
}
