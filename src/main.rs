//! End-to-end test orchestrator CLI
//!
//! Drives an external Protractor/Cucumber runner through three tasks:
//! run, rerun (failed scenarios only, with report stitching), and dry-run.

use clap::Parser;
use e2e::commands::Commands;
use e2e::{cli, common};

#[derive(Parser)]
#[command(name = "e2e", about = "End-to-end browser test orchestrator")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    common::logging::init_cli();

    let cli = Cli::parse();

    if let Err(e) = cli::dispatch(cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
