// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! Identity profile store backed by the AWS shared credentials/config files
//!
//! Parses the standard `~/.aws/credentials` and `~/.aws/config` INI files
//! into named profiles. Environment variables (`AWS_ACCESS_KEY_ID` /
//! `AWS_SECRET_ACCESS_KEY`) take precedence over the file contents, matching
//! the SDK resolution order.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// A resolved set of API credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct ProfileData {
    credentials: Option<Credentials>,
    region: Option<String>,
}

/// All identity profiles known on this machine.
#[derive(Debug, Clone, Default)]
pub struct ProfileStore {
    profiles: BTreeMap<String, ProfileData>,
    /// When set, environment credentials are ignored (used by tests to keep
    /// resolution hermetic).
    ignore_env: bool,
}

impl ProfileStore {
    /// Load from the default file locations. `AWS_SHARED_CREDENTIALS_FILE`
    /// and `AWS_CONFIG_FILE` override the paths, matching the SDKs.
    pub fn load() -> Result<Self> {
        let credentials_path = std::env::var_os("AWS_SHARED_CREDENTIALS_FILE")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".aws").join("credentials")));
        let config_path = std::env::var_os("AWS_CONFIG_FILE")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".aws").join("config")));

        Self::load_from(credentials_path.as_deref(), config_path.as_deref(), false)
    }

    /// Load from explicit paths, ignoring the process environment.
    pub fn load_from_paths(credentials_path: &Path, config_path: &Path) -> Result<Self> {
        Self::load_from(Some(credentials_path), Some(config_path), true)
    }

    fn load_from(
        credentials_path: Option<&Path>,
        config_path: Option<&Path>,
        ignore_env: bool,
    ) -> Result<Self> {
        let mut profiles: BTreeMap<String, ProfileData> = BTreeMap::new();

        if let Some(path) = credentials_path {
            if path.exists() {
                let text = std::fs::read_to_string(path)?;
                for (name, keys) in parse_ini(&text) {
                    let entry = profiles.entry(name).or_default();
                    if let (Some(id), Some(secret)) =
                        (keys.get("aws_access_key_id"), keys.get("aws_secret_access_key"))
                    {
                        entry.credentials = Some(Credentials {
                            access_key_id: id.clone(),
                            secret_access_key: secret.clone(),
                            session_token: keys.get("aws_session_token").cloned(),
                        });
                    }
                    if let Some(region) = keys.get("region") {
                        entry.region = Some(region.clone());
                    }
                }
            }
        }

        if let Some(path) = config_path {
            if path.exists() {
                let text = std::fs::read_to_string(path)?;
                for (name, keys) in parse_ini(&text) {
                    // Config-file sections are named `[profile foo]` except
                    // for `[default]`.
                    let name = name
                        .strip_prefix("profile ")
                        .unwrap_or(name.as_str())
                        .to_string();
                    let entry = profiles.entry(name).or_default();
                    if entry.region.is_none() {
                        entry.region = keys.get("region").cloned();
                    }
                }
            }
        }

        Ok(Self {
            profiles,
            ignore_env,
        })
    }

    /// Ordered sequence of profile names that carry credentials.
    pub fn profile_names(&self) -> Vec<String> {
        self.profiles
            .iter()
            .filter(|(_, data)| data.credentials.is_some())
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn has_profile(&self, name: &str) -> bool {
        self.profiles
            .get(name)
            .is_some_and(|p| p.credentials.is_some())
    }

    /// Resolve credentials for a profile. Environment variables win for any
    /// profile, matching SDK behavior.
    pub fn credentials_for(&self, profile: &str) -> Option<Credentials> {
        if !self.ignore_env {
            if let Some(creds) = env_credentials() {
                return Some(creds);
            }
        }
        self.profiles.get(profile)?.credentials.clone()
    }

    /// Region configured for a profile, if any.
    pub fn region_for(&self, profile: &str) -> Option<String> {
        self.profiles.get(profile)?.region.clone()
    }
}

fn env_credentials() -> Option<Credentials> {
    let access_key_id = std::env::var("AWS_ACCESS_KEY_ID").ok()?;
    let secret_access_key = std::env::var("AWS_SECRET_ACCESS_KEY").ok()?;
    if access_key_id.is_empty() || secret_access_key.is_empty() {
        return None;
    }
    Some(Credentials {
        access_key_id,
        secret_access_key,
        session_token: std::env::var("AWS_SESSION_TOKEN").ok().filter(|t| !t.is_empty()),
    })
}

/// Minimal INI parse: `[section]` headers, `key = value` lines, `#`/`;`
/// comments. Unknown lines are skipped.
fn parse_ini(text: &str) -> BTreeMap<String, BTreeMap<String, String>> {
    let mut sections: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let name = name.trim().to_string();
            sections.entry(name.clone()).or_default();
            current = Some(name);
            continue;
        }
        if let (Some(section), Some((key, value))) = (&current, line.split_once('=')) {
            sections
                .get_mut(section)
                .expect("section inserted on header")
                .insert(key.trim().to_lowercase(), value.trim().to_string());
        }
    }

    sections
}
