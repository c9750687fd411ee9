//! CLI command definitions
//!
//! Defines the clap commands for the watchcheck CLI.

use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the watch verification matrix against the client binary
    Run {
        #[command(flatten)]
        client: ClientArgs,

        /// Drive the watch through an interactive session instead of argv
        #[arg(long)]
        interactive: bool,

        /// Load the scenario table from a YAML file instead of the built-in one
        #[arg(long)]
        scenarios: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the scenario table
    List {
        /// Load the scenario table from a YAML file instead of the built-in one
        #[arg(long)]
        scenarios: Option<PathBuf>,

        /// Print the table as JSON
        #[arg(long)]
        json: bool,
    },

    /// Expect the server to cancel a watch (permission denial)
    Denied {
        #[command(flatten)]
        client: ClientArgs,

        /// Drive the watch through an interactive session instead of argv
        #[arg(long)]
        interactive: bool,

        /// Arguments for the watch subcommand
        #[arg(last = true)]
        args: Vec<String>,
    },
}

/// Flags shared by commands that launch the client.
#[derive(Args)]
pub struct ClientArgs {
    /// Path to the harness config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Client binary (name resolved on PATH, or a path)
    #[arg(long)]
    pub client: Option<String>,

    /// Store endpoints (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub endpoints: Vec<String>,

    /// Dial timeout in seconds; 0 exercises the deadline path
    #[arg(long)]
    pub dial_timeout: Option<u64>,

    /// Bound for each wait on session output, in seconds
    #[arg(long)]
    pub expect_timeout: Option<u64>,
}
