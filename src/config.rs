// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! Persisted user configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Archive exclusion patterns applied when no configuration overrides them.
pub const DEFAULT_EXCLUDES: &[&str] = &["*.pyc", "__pycache__"];

/// Global lamsync configuration, persisted as JSON under the user's
/// config directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LamsyncConfig {
    /// Named credential profile to authenticate with. Absent = default.
    pub profile: Option<String>,

    /// Target region. Falls back to the environment, then the profile's
    /// config-file entry.
    pub region: Option<String>,

    /// Control-API endpoint override (e.g. a local emulator).
    pub endpoint: Option<String>,

    /// Patterns excluded from built archives, matched against relative
    /// paths and bare file/directory names.
    #[serde(default = "default_excludes")]
    pub exclude: Vec<String>,
}

fn default_excludes() -> Vec<String> {
    DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect()
}

impl Default for LamsyncConfig {
    fn default() -> Self {
        Self {
            profile: None,
            region: None,
            endpoint: None,
            exclude: default_excludes(),
        }
    }
}

impl LamsyncConfig {
    /// Load configuration from the default location.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Self = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Get the configuration file path.
    pub fn config_path() -> anyhow::Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join("lamsync").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_bytecode_excludes() {
        let config = LamsyncConfig::default();
        assert!(config.exclude.iter().any(|p| p == "*.pyc"));
        assert!(config.exclude.iter().any(|p| p == "__pycache__"));
    }

    #[test]
    fn missing_exclude_field_falls_back_to_defaults() {
        let config: LamsyncConfig = serde_json::from_str(r#"{"profile": "dev"}"#).unwrap();
        assert_eq!(config.profile.as_deref(), Some("dev"));
        assert_eq!(config.exclude.len(), DEFAULT_EXCLUDES.len());
    }
}
