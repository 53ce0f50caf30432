// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! Session resolution and process-wide session caching
//!
//! `SessionManager` is the single owner of the authenticated session. It is
//! created once by the orchestrating command and passed down explicitly; the
//! cache is keyed by profile name and invalidated whenever the profile
//! changes or credentials turn out to be missing, so callers never observe a
//! stale session paired with a new profile.

use std::path::PathBuf;

use crate::credentials::{Credentials, ProfileStore};
use crate::error::{Result, SyncError};

pub const DEFAULT_PROFILE: &str = "default";

/// An authenticated handle bound to one identity profile and one region.
#[derive(Debug, Clone)]
pub struct Session {
    pub profile: String,
    pub region: String,
    pub credentials: Credentials,
}

/// Owns the lazily-created session cache.
#[derive(Debug)]
pub struct SessionManager {
    /// Profile requested via config or CLI; `None` = default.
    configured_profile: Option<String>,
    /// Region override from config; beats the profile's own region.
    configured_region: Option<String>,
    /// Explicit store file paths (tests); `None` = standard locations + env.
    store_paths: Option<(PathBuf, PathBuf)>,
    cached: Option<Session>,
}

impl SessionManager {
    pub fn new(configured_profile: Option<String>, configured_region: Option<String>) -> Self {
        Self {
            configured_profile,
            configured_region,
            store_paths: None,
            cached: None,
        }
    }

    /// Construct against explicit credentials/config files, ignoring the
    /// process environment. Used by tests.
    pub fn with_store_paths(
        configured_profile: Option<String>,
        configured_region: Option<String>,
        credentials_path: PathBuf,
        config_path: PathBuf,
    ) -> Self {
        Self {
            configured_profile,
            configured_region,
            store_paths: Some((credentials_path, config_path)),
            cached: None,
        }
    }

    fn load_store(&self) -> Result<ProfileStore> {
        match &self.store_paths {
            Some((creds, config)) => ProfileStore::load_from_paths(creds, config),
            None => ProfileStore::load(),
        }
    }

    /// Ordered list of available profile names. With one entry or fewer,
    /// profile switching is not applicable.
    pub fn list_profiles(&self) -> Result<Vec<String>> {
        Ok(self.load_store()?.profile_names())
    }

    /// The profile a session would be created for right now.
    ///
    /// A configured profile that is not among the available profiles falls
    /// back to the default profile rather than failing.
    pub fn effective_profile(&self) -> Result<String> {
        let store = self.load_store()?;
        let requested = self
            .configured_profile
            .clone()
            .or_else(|| {
                if self.store_paths.is_some() {
                    None
                } else {
                    std::env::var("AWS_PROFILE").ok().filter(|p| !p.is_empty())
                }
            })
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string());

        if requested != DEFAULT_PROFILE && !store.has_profile(&requested) {
            log::warn!(
                "Profile '{}' not found; falling back to '{}'",
                requested,
                DEFAULT_PROFILE
            );
            return Ok(DEFAULT_PROFILE.to_string());
        }
        Ok(requested)
    }

    /// Whether credentials can currently be resolved for the effective
    /// profile. A `false` answer discards any cached session.
    pub fn credentials_present(&mut self) -> bool {
        let present = self
            .effective_profile()
            .ok()
            .and_then(|profile| {
                self.load_store()
                    .ok()
                    .map(|store| store.credentials_for(&profile).is_some())
            })
            .unwrap_or(false);
        if !present {
            self.invalidate();
        }
        present
    }

    /// Switch the configured profile. Invalidates the cached session first so
    /// no reader can pair the old session with the new profile.
    pub fn set_profile(&mut self, profile: Option<String>) {
        self.invalidate();
        self.configured_profile = profile;
    }

    /// Drop the cached session.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Get the cached session, or create one for the effective profile.
    ///
    /// Credentials are re-verified on every call; a missing-credentials
    /// condition invalidates the cache before the error is returned.
    pub fn get_or_create(&mut self) -> Result<&Session> {
        let profile = self.effective_profile()?;
        let store = self.load_store()?;

        let Some(credentials) = store.credentials_for(&profile) else {
            self.invalidate();
            return Err(SyncError::NoCredentials { profile });
        };

        let cache_hit = matches!(&self.cached, Some(s) if s.profile == profile);
        if cache_hit {
            return Ok(self.cached.as_ref().expect("cache hit checked above"));
        }

        let region = self
            .configured_region
            .clone()
            .or_else(|| {
                if self.store_paths.is_some() {
                    None
                } else {
                    env_region()
                }
            })
            .or_else(|| store.region_for(&profile))
            .ok_or(SyncError::NoRegion)?;

        // Build the replacement fully before storing it.
        let session = Session {
            profile,
            region,
            credentials,
        };
        self.cached = Some(session);
        Ok(self.cached.as_ref().expect("just stored"))
    }
}

fn env_region() -> Option<String> {
    std::env::var("AWS_REGION")
        .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
        .ok()
        .filter(|r| !r.is_empty())
}
