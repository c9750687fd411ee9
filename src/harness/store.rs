//! Store writes through separate client invocations

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;

use crate::common::config::RunContext;
use crate::common::{Error, Result};

/// Capability to apply a single write to the store.
#[async_trait]
pub trait StoreWriter: Send + Sync {
    async fn put(&self, key: &str, value: &str) -> Result<()>;
}

/// Applies writes by invoking the client binary's `put` subcommand, one
/// invocation per write.
pub struct CliStoreWriter {
    prefix: Vec<String>,
    put_timeout: Duration,
}

impl CliStoreWriter {
    pub fn new(ctx: &RunContext) -> Self {
        Self {
            prefix: ctx.prefix_args(),
            put_timeout: ctx.put_timeout,
        }
    }
}

#[async_trait]
impl StoreWriter for CliStoreWriter {
    async fn put(&self, key: &str, value: &str) -> Result<()> {
        let (program, args) = self
            .prefix
            .split_first()
            .ok_or_else(|| Error::Config("empty command prefix".to_string()))?;

        tracing::debug!(key, value, "applying put");
        let output = Command::new(program)
            .args(args)
            .arg("put")
            .arg(key)
            .arg(value)
            .stdin(Stdio::null())
            .output();

        let output = match timeout(self.put_timeout, output).await {
            Err(_) => {
                return Err(Error::PutFailed {
                    key: key.to_string(),
                    reason: format!("timed out after {}s", self.put_timeout.as_secs()),
                })
            }
            Ok(Err(e)) => {
                return Err(Error::PutFailed {
                    key: key.to_string(),
                    reason: e.to_string(),
                })
            }
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::PutFailed {
                key: key.to_string(),
                reason: format!("{}: {}", output.status, stderr.trim()),
            });
        }
        Ok(())
    }
}
