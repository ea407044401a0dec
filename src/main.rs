//! randomuser harness - resilient test runner for the randomuser.me API
//!
//! Runs scenario suites, one-off queries and offline validation from the
//! command line.

use clap::Parser;
use harness::commands::Commands;
use harness::common::logging;
use harness::cli;

#[derive(Parser)]
#[command(name = "harness", about = "Resilient test harness for the randomuser.me API")]
#[command(version, long_about = None)]
struct Cli {
    /// Debug logging and per-test start lines
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        logging::init_verbose();
    } else {
        logging::init_cli();
    }

    match cli::dispatch(cli.command, cli.verbose).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error [{}]: {e}", e.category().code());
            std::process::exit(2);
        }
    }
}
