// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! Core data types shared across the sync engine

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A deployable unit as reported by the remote catalog.
///
/// Field names serialize in the service's PascalCase wire format, which is
/// also the format of the on-disk binding record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionDescriptor {
    pub function_name: String,
    pub function_arn: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub last_modified: String,
    #[serde(default)]
    pub runtime: String,
    #[serde(default)]
    pub code_size: u64,
}

impl FunctionDescriptor {
    /// Detail lines shown under the function name in the interactive picker.
    pub fn picker_details(&self) -> [String; 3] {
        [
            format!("Last modified: {}", self.last_modified),
            format!("Runtime: {}", self.runtime),
            format!("Size: {}", self.code_size),
        ]
    }
}

/// Metadata record binding a local working directory to exactly one remote
/// function. Serialized as the directory's binding record file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    #[serde(flatten)]
    pub function: FunctionDescriptor,
    /// Absolute path of the bound working directory.
    #[serde(rename = "LocalPath")]
    pub local_path: PathBuf,
}

/// What the service reports back after a code upload. The size is the
/// service's own accounting, not the locally computed archive size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UploadOutcome {
    pub function_name: String,
    pub code_size: u64,
}

/// Result of a synchronous function invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeOutcome {
    /// The function's response payload, verbatim.
    pub payload: String,
    /// Base64-decoded tail (last 4 KiB) of the execution log, if requested.
    pub log_tail: Option<String>,
    /// Set when the function itself raised an error (as opposed to the
    /// service rejecting the call).
    pub function_error: Option<String>,
}

/// Outcome of an interactive function selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Selected(FunctionDescriptor),
    Cancelled,
}

/// A "file saved inside a working directory" event, fed to the orchestrator's
/// save loop.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveEvent {
    pub path: PathBuf,
}
