// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! Sync commands: download-for-edit, push, and the watch loop

use colored::Colorize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, SystemTime};

use super::functions::{format_file_size, pick_function};
use super::AppContext;
use crate::archive::ArchiveEngine;
use crate::binding::{self, BINDING_FILENAME};
use crate::catalog::{FunctionApi, LambdaCatalogClient};
use crate::engine::{SyncEngine, UploadStatus};
use crate::error::Result;
use crate::models::{SaveEvent, Selection, UploadOutcome};

fn build_engine(ctx: &mut AppContext) -> Result<SyncEngine<LambdaCatalogClient>> {
    let archive = ArchiveEngine::new(&ctx.config.exclude)?;
    let client = ctx.client()?;
    Ok(SyncEngine::new(client, archive))
}

/// Download a function's code into a fresh working directory and bind it.
pub fn edit(ctx: &mut AppContext, name: Option<&str>, quiet: bool) -> Result<()> {
    let engine = build_engine(ctx)?;
    let functions = engine.api().list_functions(quiet)?;

    if functions.is_empty() {
        println!("No functions found.");
        return Ok(());
    }

    let function = match name {
        Some(name) => match functions.iter().find(|f| f.function_name == name) {
            Some(f) => f.clone(),
            None => return Err(crate::error::SyncError::RemoteNotFound(name.to_string())),
        },
        None => match pick_function(&functions)? {
            Selection::Selected(f) => f,
            Selection::Cancelled => {
                println!("Cancelled.");
                return Ok(());
            }
        },
    };

    let downloaded = engine.download_for_edit(&function)?;
    println!(
        "{} {} extracted to {}",
        "Downloaded:".green().bold(),
        function.function_name,
        downloaded.directory.display()
    );
    println!(
        "Edit files there, then run `lamsync push {}` (or `lamsync watch {}`).",
        downloaded.directory.display(),
        downloaded.directory.display()
    );
    Ok(())
}

/// Repackage the bound directory containing `path` and upload it.
pub fn push(ctx: &mut AppContext, path: Option<&Path>) -> Result<()> {
    let start = match path {
        Some(p) => p.to_path_buf(),
        None => std::env::current_dir()?,
    };

    // Unbound is the normal no-op path and needs no credentials at all.
    let Some(bound) = binding::find_binding(&start)? else {
        println!(
            "No binding record ({}) found for {}; nothing to push.",
            BINDING_FILENAME,
            start.display()
        );
        return Ok(());
    };

    let engine = build_engine(ctx)?;
    let outcome = engine.upload_binding(&bound)?;
    report_upload(&outcome);
    Ok(())
}

fn report_upload(outcome: &UploadOutcome) {
    println!(
        "{} {} ({})",
        "Updated:".green().bold(),
        outcome.function_name,
        format_file_size(outcome.code_size)
    );
}

/// Watch a working directory and run the upload flow on every save.
///
/// A simple mtime poller feeds the orchestrator's save-event channel; events
/// are processed strictly in arrival order, so the same directory is never
/// uploaded concurrently.
pub fn watch(ctx: &mut AppContext, dir: &Path, interval_ms: u64) -> Result<()> {
    let dir = dir.canonicalize()?;
    if binding::read_binding(&dir)?.is_none() {
        println!(
            "No binding record ({}) in {}; saves there will be ignored.",
            BINDING_FILENAME,
            dir.display()
        );
    }

    let engine = build_engine(ctx)?;
    let (tx, rx) = mpsc::channel();

    let poll_dir = dir.clone();
    std::thread::spawn(move || poll_saves(&poll_dir, Duration::from_millis(interval_ms), tx));

    println!("Watching {} (Ctrl-C to stop)...", dir.display());
    engine.run_save_loop(rx, |event, result| match result {
        Ok(UploadStatus::Uploaded(outcome)) => report_upload(outcome),
        Ok(UploadStatus::NotBound) => {
            log::debug!("Save in unbound path ignored: {}", event.path.display());
        }
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
        }
    });
    Ok(())
}

/// Poll `dir` for modified files and emit one save event per change.
fn poll_saves(dir: &Path, interval: Duration, tx: mpsc::Sender<SaveEvent>) {
    let mut seen: HashMap<PathBuf, SystemTime> = snapshot(dir);

    loop {
        std::thread::sleep(interval);
        let current = snapshot(dir);

        for (path, modified) in &current {
            let changed = match seen.get(path) {
                Some(previous) => previous != modified,
                None => true,
            };
            if changed && tx.send(SaveEvent { path: path.clone() }).is_err() {
                return;
            }
        }
        seen = current;
    }
}

fn snapshot(dir: &Path) -> HashMap<PathBuf, SystemTime> {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.file_name() != BINDING_FILENAME)
        .filter_map(|e| {
            let modified = e.metadata().ok()?.modified().ok()?;
            Some((e.into_path(), modified))
        })
        .collect()
}
