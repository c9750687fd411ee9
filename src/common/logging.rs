//! Logging and tracing configuration
//!
//! Logs go to stderr so they never interfere with the report or the JSON
//! output on stdout. Level is controlled by `RUST_LOG`, with a quieter
//! default unless `--verbose` is given.

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Initialize tracing for the CLI.
pub fn init(verbose: bool) {
    let default = if verbose {
        "watchcheck=debug,info"
    } else {
        "watchcheck=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}
