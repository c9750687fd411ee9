//! Process session capability
//!
//! The drivers interact with the watched child process through the
//! `ProcessSession` trait rather than a concrete type, so the matching
//! logic can be exercised against a scripted double without launching
//! real binaries.

use async_trait::async_trait;

use crate::common::Result;

pub mod process;
#[cfg(test)]
pub mod scripted;

pub use process::PipeSpawner;

/// A spawned child process the harness can drive and observe.
#[async_trait]
pub trait ProcessSession: Send {
    /// Write input to the child verbatim; no terminator is added.
    async fn send(&mut self, line: &str) -> Result<()>;

    /// Block until `pattern` appears in the combined output, bounded by the
    /// session's expect deadline. Matches are ordered: each success advances
    /// an internal cursor past the matched text, so later patterns must
    /// appear after earlier ones. Returns the buffered line containing the
    /// end of the match.
    async fn expect(&mut self, pattern: &str) -> Result<String>;

    /// Graceful termination.
    async fn stop(self: Box<Self>) -> Result<()>;

    /// Forced termination.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Capability to spawn sessions from an argument vector; `argv[0]` is the
/// program.
#[async_trait]
pub trait Spawner: Send + Sync {
    async fn spawn(&self, argv: &[String]) -> Result<Box<dyn ProcessSession>>;
}
