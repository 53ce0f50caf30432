// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! Sync orchestrator
//!
//! `SyncEngine` ties the catalog client, archive engine and binding store
//! together for the two user-triggered flows. Each flow is a single attempt:
//! a failure reports and returns to idle, never retries. Save events are
//! consumed strictly in arrival order on one thread, so uploads for the same
//! directory are never re-entered concurrently.

use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;

use crate::archive::ArchiveEngine;
use crate::binding;
use crate::catalog::FunctionApi;
use crate::error::Result;
use crate::models::{Binding, FunctionDescriptor, SaveEvent, UploadOutcome};

/// Result of the download-for-edit flow.
#[derive(Debug, Clone)]
pub struct Downloaded {
    pub directory: PathBuf,
    pub binding: Binding,
}

/// Result of the upload-on-save flow. `NotBound` is the normal negative
/// case, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadStatus {
    NotBound,
    Uploaded(UploadOutcome),
}

pub struct SyncEngine<A: FunctionApi> {
    api: A,
    archive: ArchiveEngine,
}

impl<A: FunctionApi> SyncEngine<A> {
    pub fn new(api: A, archive: ArchiveEngine) -> Self {
        Self { api, archive }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Download `function`'s current code package into a fresh working
    /// directory and bind the directory to it.
    ///
    /// The binding record is written only after extraction succeeds, so a
    /// corrupt download never leaves a bound-but-empty directory behind.
    pub fn download_for_edit(&self, function: &FunctionDescriptor) -> Result<Downloaded> {
        let url = self.api.get_code_location(&function.function_arn)?;
        log::debug!("Code location for {}: {}", function.function_name, url);

        let directory = self.archive.fetch_and_extract(&url)?;
        let binding = binding::write_binding(&directory, function)?;

        Ok(Downloaded { directory, binding })
    }

    /// Upload the working directory that contains `saved_path`, if bound.
    ///
    /// Safe to call for every saved file anywhere: an unbound path is a fast
    /// no-op that makes no remote calls.
    pub fn upload_on_save(&self, saved_path: &Path) -> Result<UploadStatus> {
        match binding::find_binding(saved_path)? {
            Some(binding) => self.upload_binding(&binding).map(UploadStatus::Uploaded),
            None => Ok(UploadStatus::NotBound),
        }
    }

    /// Repackage the bound directory and replace the remote code wholesale.
    pub fn upload_binding(&self, binding: &Binding) -> Result<UploadOutcome> {
        let bytes = self.archive.build_archive(&binding.local_path)?;
        log::debug!(
            "Built archive for {}: {} bytes",
            binding.local_path.display(),
            bytes.len()
        );
        self.api
            .update_function_code(&binding.function.function_arn, &bytes)
    }

    /// Drain save events in arrival order, reporting each terminal state
    /// exactly once. A failed upload reports and keeps the loop alive.
    pub fn run_save_loop<F>(&self, events: Receiver<SaveEvent>, mut report: F)
    where
        F: FnMut(&SaveEvent, &Result<UploadStatus>),
    {
        for event in events {
            let result = self.upload_on_save(&event.path);
            report(&event, &result);
        }
    }
}
