// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! lamsync - Library
//!
//! The local-package synchronization engine behind the `lamsync` CLI:
//! download a deployed cloud function's code package into a local working
//! directory, bind the directory to the function, and push edits back.
//!
//! ## Components
//!
//! - [`session`] - identity profiles and the process-wide session cache
//! - [`catalog`] - remote function catalog client (list, fetch, update, invoke)
//! - [`archive`] - zip download/extract and deterministic repackaging
//! - [`binding`] - the directory-local binding record
//! - [`engine`] - the two sync flows (download-for-edit, upload-on-save)

pub mod archive;
pub mod binding;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod engine;
pub mod error;
pub mod models;
pub mod session;
pub mod sign;

// Re-export commonly used items
pub use archive::{extract_archive, ArchiveEngine};
pub use binding::{find_binding, read_binding, write_binding, BINDING_FILENAME};
pub use catalog::{FunctionApi, LambdaCatalogClient};
pub use cli::{Cli, Commands, ProfileCommands};
pub use config::LamsyncConfig;
pub use credentials::{Credentials, ProfileStore};
pub use engine::{Downloaded, SyncEngine, UploadStatus};
pub use error::{Result, SyncError};
pub use models::{
    Binding, FunctionDescriptor, InvokeOutcome, SaveEvent, Selection, UploadOutcome,
};
pub use session::{Session, SessionManager, DEFAULT_PROFILE};
