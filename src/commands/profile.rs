// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! Profile selection commands

use colored::Colorize;

use super::AppContext;
use crate::error::Result;

/// List available credential profiles.
pub fn profile_list(ctx: &mut AppContext) -> Result<()> {
    let profiles = ctx.sessions.list_profiles()?;

    if profiles.is_empty() {
        println!("No credential profiles found.");
        return Ok(());
    }

    let current = ctx.sessions.effective_profile()?;
    for profile in &profiles {
        if *profile == current {
            println!("* {}", profile.bold());
        } else {
            println!("  {}", profile);
        }
    }

    if profiles.len() <= 1 {
        println!("\nOnly one profile available; profile switching is not applicable.");
    }
    Ok(())
}

/// Show the profile a session would use right now.
pub fn profile_show(ctx: &mut AppContext) -> Result<()> {
    println!("{}", ctx.sessions.effective_profile()?);
    Ok(())
}

/// Persist a profile selection and invalidate any cached session.
pub fn profile_set(ctx: &mut AppContext, name: &str) -> Result<()> {
    let profiles = ctx.sessions.list_profiles()?;

    if profiles.len() <= 1 {
        println!("Only one profile available; nothing to switch.");
        return Ok(());
    }
    if !profiles.iter().any(|p| p == name) {
        return Err(crate::error::SyncError::UnknownProfile(name.to_string()));
    }

    ctx.sessions.set_profile(Some(name.to_string()));
    ctx.config.profile = Some(name.to_string());
    ctx.config
        .save()
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    println!("Profile set to '{}'.", name);
    Ok(())
}
