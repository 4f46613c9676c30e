//! Runs CLI commands against a one-document workspace.

use std::path::Path;

use anyhow::{Context, Result};
use modreq_checker::{ContextKind, PlatformConfig};
use modreq_lsp::Workspace;
use serde_json::{Value, json};
use tracing::debug;

use crate::cli::args::{CheckArgs, CliArgs, Command, FileArgs};

/// The JSON a command prints, and how many errors it found.
#[derive(Debug)]
pub struct Report {
    pub json: Value,
    pub error_count: usize,
}

pub fn run(args: CliArgs) -> Result<Report> {
    match args.command {
        Command::Links(args) => run_links(&args),
        Command::Check(args) => run_check(&args),
    }
}

pub fn run_links(args: &FileArgs) -> Result<Report> {
    let (mut workspace, file_name) = open(args)?;
    let links = workspace.document_link(&file_name);
    Ok(Report {
        json: json!({
            "file": file_name,
            "links": links,
        }),
        error_count: 0,
    })
}

pub fn run_check(args: &CheckArgs) -> Result<Report> {
    let (mut workspace, file_name) = open(&args.file)?;
    let kind = if args.autocomplete {
        ContextKind::Autocomplete
    } else {
        ContextKind::Full
    };
    let diagnostics = workspace.diagnostics_in(&file_name, kind);
    Ok(Report {
        error_count: diagnostics.len(),
        json: json!({
            "file": file_name,
            "context": kind,
            "solver": workspace.platform().config().solver,
            "diagnostics": diagnostics,
            "publisher": workspace.platform().stats().snapshot(),
        }),
    })
}

/// Loads config and sourcemap, then opens the requested script.
fn open(args: &FileArgs) -> Result<(Workspace, String)> {
    let root = match &args.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("failed to resolve current directory")?,
    };

    let mut config = match &args.config {
        Some(path) => PlatformConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PlatformConfig::default(),
    };
    if let Some(solver) = args.solver {
        config.solver = solver.into();
    }

    let mut workspace = Workspace::new(root.clone(), config);
    let sourcemap = root.join(&args.sourcemap);
    workspace
        .load_sourcemap_file(&sourcemap)
        .with_context(|| format!("failed to load sourcemap {}", sourcemap.display()))?;

    let file_name = relative_name(&root, &args.file);
    let path = root.join(&file_name);
    let source = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    debug!(file = %file_name, root = %root.display(), "opening script");

    workspace.open_document(file_name.clone(), source);
    Ok((workspace, file_name))
}

/// The script path relative to the root, with `/` separators, matching the
/// sourcemap's `filePaths`.
fn relative_name(root: &Path, file: &Path) -> String {
    file.strip_prefix(root)
        .unwrap_or(file)
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
#[path = "../../tests/driver_tests.rs"]
mod tests;
