//! watchcheck - end-to-end verification harness for the kvctl watch command
//!
//! The harness launches the client binary as a child process, drives it
//! through scripted or interactive watch invocations, mutates the store
//! concurrently through separate client invocations, and asserts the watch
//! output against an ordered sequence of expectations.

pub mod cli;
pub mod commands;
pub mod common;
pub mod harness;
pub mod session;

// Re-export commonly used types
pub use common::{Error, Result};
pub use harness::scenario::{ExpectedEvent, PutEvent, ScenarioConfig};
