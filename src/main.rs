// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! lamsync - Main entry point
//!
//! A CLI tool to edit deployed cloud function code locally and sync it back.

use clap::Parser;
use colored::Colorize;

use lamsync::cli::{Cli, Commands, ProfileCommands};
use lamsync::commands::{self, AppContext};
use lamsync::config::LamsyncConfig;
use lamsync::error::Result;

fn main() {
    let cli = Cli::parse();

    let config = match LamsyncConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} failed to load configuration: {}", "error:".red().bold(), e);
            std::process::exit(1);
        }
    };

    let mut ctx = AppContext::new(config, cli.profile.clone(), cli.endpoint.clone());

    if let Err(e) = run(&cli, &mut ctx) {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: &Cli, ctx: &mut AppContext) -> Result<()> {
    match &cli.command {
        // ====================================================================
        // Catalog Commands
        // ====================================================================
        Commands::List { quiet } => commands::list_functions(ctx, *quiet),
        Commands::Invoke { name, payload } => commands::invoke(ctx, name, payload),

        // ====================================================================
        // Sync Commands
        // ====================================================================
        Commands::Edit { name, quiet } => commands::edit(ctx, name.as_deref(), *quiet),
        Commands::Push { path } => commands::push(ctx, path.as_deref()),
        Commands::Watch { dir, interval_ms } => commands::watch(ctx, dir, *interval_ms),

        // ====================================================================
        // Profile Commands
        // ====================================================================
        Commands::Profile { command } => match command {
            ProfileCommands::List => commands::profile_list(ctx),
            ProfileCommands::Show => commands::profile_show(ctx),
            ProfileCommands::Set { name } => commands::profile_set(ctx, name),
        },
    }
}
