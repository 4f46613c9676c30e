use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use modreq_checker::SolverKind;

/// CLI arguments for the modreq binary.
#[derive(Parser, Debug)]
#[command(
    name = "modreq",
    version,
    about = "Resolve module requires in Luau sourcemap projects"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the document links of a script as JSON.
    Links(FileArgs),
    /// Print the diagnostics of a script as JSON.
    Check(CheckArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct FileArgs {
    /// Script to analyze, relative to the root.
    pub file: PathBuf,

    /// Sourcemap JSON, relative to the root.
    #[arg(long, default_value = "sourcemap.json")]
    pub sourcemap: PathBuf,

    /// Workspace root. Defaults to the current directory.
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Platform configuration JSON.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Overrides the configured checking backend.
    #[arg(long, value_enum)]
    pub solver: Option<SolverArg>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub file: FileArgs,

    /// Check in the autocomplete context instead of the full one.
    #[arg(long)]
    pub autocomplete: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SolverArg {
    Eager,
    Incremental,
}

impl From<SolverArg> for SolverKind {
    fn from(solver: SolverArg) -> Self {
        match solver {
            SolverArg::Eager => SolverKind::Eager,
            SolverArg::Incremental => SolverKind::Incremental,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/args_tests.rs"]
mod tests;
