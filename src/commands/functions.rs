// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! Catalog commands: listing, interactive selection, invocation

use colored::Colorize;
use std::io::{BufRead, Write};
use tabled::{settings::Style as TableStyle, Table, Tabled};

use super::AppContext;
use crate::catalog::FunctionApi;
use crate::error::Result;
use crate::models::{FunctionDescriptor, Selection};

#[derive(Tabled)]
struct FunctionRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Last Modified")]
    last_modified: String,
    #[tabled(rename = "Runtime")]
    runtime: String,
    #[tabled(rename = "Size")]
    size: String,
}

/// Format file size in human-readable format
pub fn format_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

/// List all deployed functions.
pub fn list_functions(ctx: &mut AppContext, quiet: bool) -> Result<()> {
    let client = ctx.client()?;
    let functions = client.list_functions(quiet)?;

    if functions.is_empty() {
        println!("No functions found.");
        return Ok(());
    }

    let rows: Vec<FunctionRow> = functions
        .iter()
        .map(|f| FunctionRow {
            name: f.function_name.clone(),
            description: f.description.clone(),
            last_modified: f.last_modified.clone(),
            runtime: f.runtime.clone(),
            size: format_file_size(f.code_size),
        })
        .collect();

    let table = Table::new(rows)
        .with(TableStyle::ascii_rounded())
        .to_string();

    println!("{}", table);
    println!("\nTotal functions: {}", functions.len());
    Ok(())
}

/// Invoke a function synchronously and print payload, log tail, and any
/// function-level error flag.
pub fn invoke(ctx: &mut AppContext, name: &str, payload: &str) -> Result<()> {
    let client = ctx.client()?;
    let outcome = client.invoke(name, payload)?;

    if let Some(error) = &outcome.function_error {
        println!(
            "{} function returned an error ({})",
            "warning:".yellow().bold(),
            error
        );
    }
    println!("{}", outcome.payload);

    if let Some(log_tail) = &outcome.log_tail {
        println!("\n{}", "--- log tail ---".dimmed());
        println!("{}", log_tail.dimmed());
    }
    Ok(())
}

/// Prompt on stdin to pick one function. A blank line or `q` cancels, which
/// short-circuits the calling flow without an error.
pub fn pick_function(functions: &[FunctionDescriptor]) -> Result<Selection> {
    let stdin = std::io::stdin();
    pick_function_from(functions, &mut stdin.lock())
}

fn pick_function_from(
    functions: &[FunctionDescriptor],
    input: &mut impl BufRead,
) -> Result<Selection> {
    for (i, function) in functions.iter().enumerate() {
        println!(
            "  [{}] {}",
            i + 1,
            function.function_name.bold()
        );
        if !function.description.is_empty() {
            println!("      {}", function.description);
        }
        println!("      {}", function.picker_details().join(" | ").dimmed());
    }

    loop {
        print!("Select a function (1-{}, blank to cancel): ", functions.len());
        std::io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(Selection::Cancelled);
        }
        let line = line.trim();
        if line.is_empty() || line.eq_ignore_ascii_case("q") {
            return Ok(Selection::Cancelled);
        }

        match line.parse::<usize>() {
            Ok(n) if (1..=functions.len()).contains(&n) => {
                return Ok(Selection::Selected(functions[n - 1].clone()));
            }
            _ => println!("Enter a number between 1 and {}.", functions.len()),
        }
    }
}
