//! The `modreq` command line.

pub mod args;
pub mod driver;

pub use args::{CheckArgs, CliArgs, Command, FileArgs, SolverArg};
pub use driver::{Report, run};
