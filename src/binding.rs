// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! Binding store
//!
//! A working directory is bound to exactly one remote function by a small
//! JSON record at its root. The record holds the full function descriptor at
//! download time plus the absolute local path, and is the single source of
//! truth for which remote function a directory belongs to.

use std::path::Path;

use crate::error::Result;
use crate::models::{Binding, FunctionDescriptor};

/// Reserved filename of the binding record at the working-directory root.
pub const BINDING_FILENAME: &str = ".lamsync.json";

/// Write (or overwrite) the binding record for `dir`.
///
/// Overwrite semantics keep this idempotent even though a working package is
/// only created once.
pub fn write_binding(dir: &Path, function: &FunctionDescriptor) -> Result<Binding> {
    let local_path = dir.canonicalize()?;
    let binding = Binding {
        function: function.clone(),
        local_path,
    };

    let content = serde_json::to_string_pretty(&binding)?;
    std::fs::write(dir.join(BINDING_FILENAME), content)?;
    Ok(binding)
}

/// Read the binding record of `dir`.
///
/// A missing or unparsable record means "not bound" and returns `None`; the
/// save flow treats that as its normal no-op path, never as an error.
pub fn read_binding(dir: &Path) -> Result<Option<Binding>> {
    let path = dir.join(BINDING_FILENAME);
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path)?;
    match serde_json::from_str::<Binding>(&content) {
        Ok(binding) => Ok(Some(binding)),
        Err(e) => {
            log::warn!("Corrupt binding record at {}: {}", path.display(), e);
            Ok(None)
        }
    }
}

/// Locate the binding governing `start` by walking up its ancestors.
///
/// Binding is per-directory, not per-file: any file saved inside a bound
/// working directory resolves to the same remote target.
pub fn find_binding(start: &Path) -> Result<Option<Binding>> {
    let origin = if start.is_dir() {
        start
    } else {
        match start.parent() {
            Some(parent) => parent,
            None => return Ok(None),
        }
    };

    for dir in origin.ancestors() {
        if let Some(binding) = read_binding(dir)? {
            return Ok(Some(binding));
        }
    }
    Ok(None)
}
