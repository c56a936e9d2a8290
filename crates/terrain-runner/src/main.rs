//! `terrain` - compute and cache colorized terrain analysis tiles.

use clap::Parser;
use std::process;
use terrain_runner::{init_logging, run, Cli};

#[tokio::main]
async fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
