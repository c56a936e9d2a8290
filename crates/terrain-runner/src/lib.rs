//! # terrain-runner
//!
//! The `terrain` command-line tool.
//!
//! ```text
//! terrain compute --bbox 46.0,7.5,46.1,7.7 --layer slope --zoom 12
//! terrain cache size --layer aspect
//! terrain cache clear
//! ```
//!
//! Logging goes to stderr and honors `RUST_LOG` (default `info`).

pub mod cli;
pub mod commands;
mod error;

pub use cli::Cli;
pub use error::{Result, RunnerError};

use cli::Command;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Execute a parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Compute(args) => commands::compute(args).await.map(|_| ()),
        Command::Cache { action } => commands::cache(action),
    }
}
