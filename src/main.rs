//! watchcheck - end-to-end verification harness for the kvctl watch command

use clap::Parser;
use watchcheck::commands::Commands;
use watchcheck::{cli, common::logging};

#[derive(Parser)]
#[command(name = "watchcheck", about = "End-to-end verification harness for the kvctl watch command")]
#[command(version, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = cli::dispatch(cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
