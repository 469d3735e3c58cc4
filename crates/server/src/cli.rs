use crate::backend::StoreArgs;
use crate::config::{ENV_POLL_INTERVAL_MS, ENV_REPROCESS};
use crate::trigger::ReprocessScope;
use clap::{Parser, Subcommand};
use std::time::Duration;

/// Command-line interface for the `skillmatch` application.
#[derive(Debug, Parser)]
#[command(
    name = "skillmatch",
    version,
    about = "Matches pending skill requests against users' declared skills"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub store: StoreArgs,

    /// How often polling backends look for request changes, in milliseconds.
    #[arg(long, global = true, env = ENV_POLL_INTERVAL_MS, value_name = "MILLIS", default_value_t = 2000)]
    pub poll_interval_ms: u64,

    /// Which pending requests a change batch reprocesses.
    #[arg(long, global = true, env = ENV_REPROCESS, value_enum, default_value_t = ReprocessScope::All)]
    pub reprocess: ReprocessScope,
}

impl Cli {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

/// Available `skillmatch` commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Processes pending requests, then reprocesses on every change until stopped (default).
    Watch,
    /// Processes every pending request once and exits.
    Process {
        /// Print the full report as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Computes rankings for pending requests without writing them.
    Preview {
        /// Print the full report as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}
