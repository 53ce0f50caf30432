//! Tests for the binding store
//!
//! Write-then-read must round-trip every descriptor field plus the injected
//! local path; missing or corrupt records are the normal "not bound" case.

use lamsync::binding::{find_binding, read_binding, write_binding, BINDING_FILENAME};
use lamsync::models::FunctionDescriptor;
use std::fs;
use tempfile::TempDir;

fn descriptor(name: &str, arn: &str) -> FunctionDescriptor {
    FunctionDescriptor {
        function_name: name.to_string(),
        function_arn: arn.to_string(),
        description: "Test function".to_string(),
        last_modified: "2026-02-01T09:30:00.000+0000".to_string(),
        runtime: "python3.12".to_string(),
        code_size: 120,
    }
}

#[test]
fn write_then_read_round_trips_all_fields() {
    let dir = TempDir::new().unwrap();
    let function = descriptor("fn-a", "arn:aws:lambda:us-east-1:123456789012:function:fn-a");

    let written = write_binding(dir.path(), &function).unwrap();
    let read = read_binding(dir.path()).unwrap().expect("binding present");

    assert_eq!(read, written);
    assert_eq!(read.function, function);
    assert_eq!(read.local_path, dir.path().canonicalize().unwrap());
}

#[test]
fn record_file_uses_wire_field_names() {
    let dir = TempDir::new().unwrap();
    let function = descriptor("fn-a", "arn:a");
    write_binding(dir.path(), &function).unwrap();

    let raw = fs::read_to_string(dir.path().join(BINDING_FILENAME)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["FunctionName"], "fn-a");
    assert_eq!(value["FunctionArn"], "arn:a");
    assert_eq!(value["Runtime"], "python3.12");
    assert_eq!(value["CodeSize"], 120);
    assert!(value["LocalPath"].is_string());
}

#[test]
fn missing_record_reads_as_unbound() {
    let dir = TempDir::new().unwrap();
    assert!(read_binding(dir.path()).unwrap().is_none());
}

#[test]
fn corrupt_record_reads_as_unbound() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(BINDING_FILENAME), "{ not json").unwrap();
    assert!(read_binding(dir.path()).unwrap().is_none());
}

#[test]
fn overwrite_repoints_nothing_silently_but_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let first = descriptor("fn-a", "arn:a");
    write_binding(dir.path(), &first).unwrap();
    write_binding(dir.path(), &first).unwrap();

    let read = read_binding(dir.path()).unwrap().unwrap();
    assert_eq!(read.function.function_arn, "arn:a");
}

#[test]
fn find_binding_walks_up_from_a_saved_file() {
    let dir = TempDir::new().unwrap();
    let function = descriptor("fn-a", "arn:a");
    write_binding(dir.path(), &function).unwrap();

    let nested = dir.path().join("src/deep");
    fs::create_dir_all(&nested).unwrap();
    let saved = nested.join("module.py");
    fs::write(&saved, "pass\n").unwrap();

    let found = find_binding(&saved).unwrap().expect("binding found");
    assert_eq!(found.function.function_arn, "arn:a");
}

#[test]
fn find_binding_outside_any_package_is_none() {
    let dir = TempDir::new().unwrap();
    let saved = dir.path().join("orphan.py");
    fs::write(&saved, "pass\n").unwrap();

    // The temp dir's ancestors are system directories with no record.
    assert!(find_binding(&saved).unwrap().is_none());
}
