// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! Command handlers for the lamsync CLI

mod functions;
mod profile;
mod sync;

pub use functions::{invoke, list_functions};
pub use profile::{profile_list, profile_set, profile_show};
pub use sync::{edit, push, watch};

use crate::catalog::LambdaCatalogClient;
use crate::config::LamsyncConfig;
use crate::error::Result;
use crate::session::SessionManager;

/// Shared state for one CLI invocation: configuration plus the session
/// cache. The session manager is owned here and passed down explicitly.
pub struct AppContext {
    pub config: LamsyncConfig,
    pub sessions: SessionManager,
    endpoint_override: Option<String>,
}

impl AppContext {
    pub fn new(
        config: LamsyncConfig,
        profile_override: Option<String>,
        endpoint_override: Option<String>,
    ) -> Self {
        let profile = profile_override.or_else(|| config.profile.clone());
        let sessions = SessionManager::new(profile, config.region.clone());
        let endpoint_override = endpoint_override.or_else(|| config.endpoint.clone());
        Self {
            config,
            sessions,
            endpoint_override,
        }
    }

    /// Resolve a session and build an authenticated catalog client.
    pub fn client(&mut self) -> Result<LambdaCatalogClient> {
        let session = self.sessions.get_or_create()?;
        LambdaCatalogClient::new(session, self.endpoint_override.as_deref())
    }
}
