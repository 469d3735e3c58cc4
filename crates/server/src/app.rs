//! Command dispatch for the `skillmatch` binary.

use crate::cli::{Cli, Commands};
use crate::processor::{ProcessReport, RequestProcessor};
use crate::signals::shutdown_signal;
use crate::watch::watch;
use anyhow::{Context, Result};
use clap::Parser;
use tokio::runtime::Runtime;

/// Main entry point: initialises logging and config, then runs the chosen command.
pub fn run() -> Result<()> {
    // Logs go to stderr; stdout carries reports.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    crate::config::apply_config_to_env();

    let cli = Cli::parse();
    let rt = Runtime::new().context("failed to start tokio runtime")?;
    rt.block_on(run_command(cli))
}

/// Run one parsed command to completion.
pub async fn run_command(cli: Cli) -> Result<()> {
    let store = cli.store.open(cli.poll_interval()).await?;
    let processor = RequestProcessor::new(store.clone());

    match cli.command.unwrap_or(Commands::Watch) {
        Commands::Watch => {
            let summary = watch(store, cli.reprocess, shutdown_signal()).await?;
            tracing::info!(
                target: "skillmatch::watch",
                batches = summary.batches,
                runs = summary.runs,
                failures = summary.failures,
                "Watch stopped"
            );
        }
        Commands::Process { json } => {
            let report = processor.process_pending().await?;
            print_report(&report, json)?;
        }
        Commands::Preview { json } => {
            let report = processor.preview().await?;
            print_report(&report, json)?;
        }
    }
    Ok(())
}

fn print_report(report: &ProcessReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    for outcome in &report.outcomes {
        if outcome.returned_users.is_empty() {
            println!("{}\t{}", outcome.request_id, outcome.status);
        } else {
            println!(
                "{}\t{}\t{}",
                outcome.request_id,
                outcome.status,
                outcome.returned_users.join(",")
            );
        }
    }
    println!("{}", report.summary());
    Ok(())
}
