use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use modreq::cli::{CliArgs, run};

fn main() -> Result<ExitCode> {
    // MODREQ_LOG / RUST_LOG, MODREQ_LOG_FORMAT=text|tree|json (see src/tracing_config.rs).
    modreq::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let report = run(args)?;
    let output = serde_json::to_string_pretty(&report.json).context("failed to serialize report")?;
    println!("{output}");

    Ok(if report.error_count == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
