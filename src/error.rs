// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! Error types for lamsync

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error(
        "No credentials found for profile '{profile}'. \
         Add an entry to your shared credentials file (~/.aws/credentials) \
         or set AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY."
    )]
    NoCredentials { profile: String },

    #[error("Unknown profile: {0}")]
    UnknownProfile(String),

    #[error(
        "No region configured. Set `region` in the lamsync config, \
         the profile's config-file entry, or the AWS_REGION environment variable."
    )]
    NoRegion,

    #[error("Network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Corrupt archive: {0}")]
    CorruptArchive(String),

    #[error("Function not found: {0}")]
    RemoteNotFound(String),

    #[error("Remote service error ({status}): {message}")]
    RemoteClient { status: u16, message: String },

    #[error("Upload failed for {arn}: {message}")]
    Upload { arn: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    /// Map an error category to a process exit code.
    ///
    /// 2 = credentials/profile/region, 3 = network fetch, 4 = archive,
    /// 5 = remote API, 1 = anything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoCredentials { .. } | Self::UnknownProfile(_) | Self::NoRegion => 2,
            Self::Network { .. } => 3,
            Self::CorruptArchive(_) => 4,
            Self::RemoteNotFound(_) | Self::RemoteClient { .. } | Self::Upload { .. } => 5,
            Self::Io(_) | Self::Json(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
