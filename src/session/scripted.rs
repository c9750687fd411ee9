//! Scripted sessions for exercising the drivers without real processes.
//!
//! A scripted session serves a fixed output transcript through the same
//! cursor-ordered matching the real session uses, and records everything
//! the driver did to it.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{ProcessSession, Spawner};
use crate::common::{Error, Result};
use crate::harness::env::{WATCH_KEY_ENV, WATCH_RANGE_END_ENV};

/// What a driver did to the sessions spawned from one scripted spawner.
#[derive(Debug, Default)]
pub struct SessionLog {
    pub sent: Vec<String>,
    pub matched: Vec<String>,
    pub stopped: bool,
    pub closed: bool,
}

/// One recorded spawn: the argv used and the implicit-argument environment
/// observed at spawn time.
#[derive(Debug, Clone)]
pub struct SpawnRecord {
    pub argv: Vec<String>,
    pub env_key: Option<String>,
    pub env_range_end: Option<String>,
}

pub struct ScriptedSession {
    output: String,
    cursor: usize,
    fail_send: bool,
    log: Arc<Mutex<SessionLog>>,
}

#[async_trait]
impl ProcessSession for ScriptedSession {
    async fn send(&mut self, line: &str) -> Result<()> {
        if self.fail_send {
            return Err(Error::SendFailed("scripted send failure".to_string()));
        }
        self.log.lock().unwrap().sent.push(line.to_string());
        Ok(())
    }

    async fn expect(&mut self, pattern: &str) -> Result<String> {
        match self.output[self.cursor..].find(pattern) {
            Some(pos) => {
                let end = self.cursor + pos + pattern.len();
                self.cursor = end;
                self.log.lock().unwrap().matched.push(pattern.to_string());
                Ok(self.output[..end]
                    .lines()
                    .last()
                    .unwrap_or_default()
                    .to_string())
            }
            None => Err(Error::ExpectTimeout {
                pattern: pattern.to_string(),
                seconds: 0,
            }),
        }
    }

    async fn stop(self: Box<Self>) -> Result<()> {
        self.log.lock().unwrap().stopped = true;
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.log.lock().unwrap().closed = true;
        Ok(())
    }
}

/// Spawner producing scripted sessions that all share one log.
#[derive(Default)]
pub struct ScriptedSpawner {
    pub output: String,
    pub fail_spawn: bool,
    pub fail_send: bool,
    pub log: Arc<Mutex<SessionLog>>,
    pub spawns: Arc<Mutex<Vec<SpawnRecord>>>,
}

impl ScriptedSpawner {
    pub fn with_output(output: &str) -> Self {
        Self {
            output: output.to_string(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl Spawner for ScriptedSpawner {
    async fn spawn(&self, argv: &[String]) -> Result<Box<dyn ProcessSession>> {
        self.spawns.lock().unwrap().push(SpawnRecord {
            argv: argv.to_vec(),
            env_key: std::env::var(WATCH_KEY_ENV).ok(),
            env_range_end: std::env::var(WATCH_RANGE_END_ENV).ok(),
        });
        if self.fail_spawn {
            return Err(Error::SpawnFailed {
                program: argv.first().cloned().unwrap_or_default(),
                error: "scripted spawn failure".to_string(),
            });
        }
        Ok(Box::new(ScriptedSession {
            output: self.output.clone(),
            cursor: 0,
            fail_send: self.fail_send,
            log: self.log.clone(),
        }))
    }
}
