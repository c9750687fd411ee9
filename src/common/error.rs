//! Error types for the watch harness
//!
//! Failures are reported per scenario; the messages carry enough context
//! (pattern, put index, scenario index) to diagnose a failing run from the
//! report alone.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the watch harness
#[derive(Error, Debug)]
pub enum Error {
    // === Session Errors ===
    #[error("failed to spawn '{program}': {error}")]
    SpawnFailed { program: String, error: String },

    #[error("failed to send input to session: {0}")]
    SendFailed(String),

    #[error("timed out after {seconds}s waiting for {pattern:?}")]
    ExpectTimeout { pattern: String, seconds: u64 },

    #[error("session output closed before {pattern:?} appeared; last output: {tail:?}")]
    StreamClosed { pattern: String, tail: String },

    #[error("failed to stop session: {0}")]
    StopFailed(String),

    // === Mutation Errors ===
    #[error("put {key:?} failed: {reason}")]
    PutFailed { key: String, reason: String },

    #[error("put #{index} failed: {source}")]
    MutationFailed {
        index: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("mutator task ended without signaling completion")]
    MutatorLost,

    // === Run Errors ===
    #[error("scenario #{index}: {source}")]
    Scenario {
        index: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("{failed} of {total} scenarios failed")]
    MatrixFailed { failed: usize, total: usize },

    // === Configuration Errors ===
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("client binary '{0}' not found")]
    ClientNotFound(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Internal Errors ===
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error is classifiable as a deadline-exceeded condition.
    ///
    /// An expect deadline expiry always qualifies. An early stream close
    /// qualifies only when the child reported its own deadline failure in
    /// the captured output before exiting.
    pub fn is_deadline_exceeded(&self) -> bool {
        match self {
            Error::ExpectTimeout { .. } => true,
            Error::StreamClosed { tail, .. } => {
                let tail = tail.to_lowercase();
                tail.contains("deadline exceeded") || tail.contains("timed out")
            }
            Error::Scenario { source, .. } => source.is_deadline_exceeded(),
            _ => false,
        }
    }

    /// Tag an error with the scenario it occurred in.
    pub(crate) fn in_scenario(self, index: usize) -> Self {
        Error::Scenario {
            index,
            source: Box::new(self),
        }
    }
}
