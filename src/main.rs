// src/main.rs

use anyhow::Result;
use clap::Parser;
use deck_converter::cli::Cli;
use deck_converter::{BatchPlan, LogRegistry};
use std::process::ExitCode;
use tracing::{info, warn};

fn main() -> Result<ExitCode> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let plan = BatchPlan::new(&cli.inputs, &cli.batch_options())?;
    info!("Converting {} deck file(s)", plan.jobs().len());

    let registry = LogRegistry::new();
    let report = plan.run(&registry);

    for outcome in report.failed() {
        if let Err(e) = &outcome.result {
            warn!("Skipped {}: {}", outcome.job.input.display(), e);
        }
    }
    info!(
        "Converted {} of {} deck file(s)",
        report.succeeded(),
        report.outcomes.len()
    );

    if report.all_succeeded() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
