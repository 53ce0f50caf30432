// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! CLI argument definitions using clap derive macros

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// lamsync - Edit deployed cloud functions locally
#[derive(Parser)]
#[command(name = "lamsync")]
#[command(author = "Nervosys")]
#[command(version)]
#[command(about = "Download, edit, and push cloud function code packages", long_about = None)]
pub struct Cli {
    /// Credential profile to use (overrides the configured profile)
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Control-API endpoint override, e.g. a local emulator
    #[arg(long, global = true, env = "LAMSYNC_ENDPOINT")]
    pub endpoint: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    // ============================================================================
    // Catalog Commands
    // ============================================================================
    /// List deployed functions
    #[command(visible_alias = "ls")]
    List {
        /// Suppress progress messages
        #[arg(long)]
        quiet: bool,
    },

    /// Invoke a function synchronously and print its response and log tail
    Invoke {
        /// Function name
        name: String,

        /// JSON request payload
        #[arg(long, default_value = "{}")]
        payload: String,
    },

    // ============================================================================
    // Sync Commands
    // ============================================================================
    /// Download a function's code package into a fresh working directory
    Edit {
        /// Function name; omit to pick interactively
        name: Option<String>,

        /// Suppress progress messages while listing
        #[arg(long)]
        quiet: bool,
    },

    /// Repackage a bound working directory and upload it
    Push {
        /// A path inside the working directory (default: current directory)
        path: Option<PathBuf>,
    },

    /// Watch a bound working directory and push on every save
    Watch {
        /// The working directory to watch
        dir: PathBuf,

        /// Poll interval in milliseconds
        #[arg(long, default_value_t = 500)]
        interval_ms: u64,
    },

    // ============================================================================
    // Profile Commands
    // ============================================================================
    /// Manage the credential profile used for sync
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// List available credential profiles
    List,

    /// Show the profile a session would currently use
    Show,

    /// Persist a profile selection in the lamsync config
    Set {
        /// Profile name
        name: String,
    },
}
