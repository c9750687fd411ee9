//! Real process sessions over pipes
//!
//! The child is spawned with piped stdio; background tasks mirror stdout
//! and stderr into one accumulating buffer. `expect` scans the buffer from
//! a cursor under a per-wait deadline, waking on every new chunk.

use std::process::Stdio;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::{Mutex, Notify};
use tokio::time::{timeout, Instant};

use super::{ProcessSession, Spawner};
use crate::common::{Error, Result};

/// How long a graceful stop waits for the child before escalating to kill.
const STOP_GRACE: Duration = Duration::from_secs(5);

/// Output retained in stream-closed errors.
const TAIL_BYTES: usize = 256;

/// Combined output of both child streams.
#[derive(Debug)]
struct OutputBuf {
    data: Mutex<String>,
    /// Streams still being mirrored; the buffer is closed at zero.
    open_streams: AtomicUsize,
    notify: Notify,
}

impl OutputBuf {
    fn new(streams: usize) -> Self {
        Self {
            data: Mutex::new(String::new()),
            open_streams: AtomicUsize::new(streams),
            notify: Notify::new(),
        }
    }

    async fn push(&self, chunk: &str) {
        self.data.lock().await.push_str(chunk);
        self.notify.notify_waiters();
    }

    fn stream_done(&self) {
        if self.open_streams.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.notify.notify_waiters();
        }
    }

    fn closed(&self) -> bool {
        self.open_streams.load(Ordering::SeqCst) == 0
    }
}

/// Mirror one child stream into the shared buffer until EOF.
fn mirror<R>(mut reader: R, buf: Arc<OutputBuf>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut chunk = [0u8; 4096];
        loop {
            match reader.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => buf.push(&String::from_utf8_lossy(&chunk[..n])).await,
            }
        }
        buf.stream_done();
    });
}

/// A real child process session over pipes.
#[derive(Debug)]
pub struct PipeSession {
    child: Child,
    stdin: Option<ChildStdin>,
    buf: Arc<OutputBuf>,
    cursor: usize,
    expect_timeout: Duration,
}

impl PipeSession {
    /// Spawn the child described by `argv` with piped stdio.
    pub async fn spawn(argv: &[String], expect_timeout: Duration) -> Result<Self> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| Error::Config("empty argument vector".to_string()))?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::SpawnFailed {
                program: program.clone(),
                error: e.to_string(),
            })?;

        tracing::debug!(program = %program, pid = ?child.id(), "spawned session");

        let stdin = child.stdin.take();
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Internal("child stdout not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::Internal("child stderr not captured".to_string()))?;

        let buf = Arc::new(OutputBuf::new(2));
        mirror(stdout, buf.clone());
        mirror(stderr, buf.clone());

        Ok(Self {
            child,
            stdin,
            buf,
            cursor: 0,
            expect_timeout,
        })
    }

    /// Last output, trimmed to a char boundary, for error reporting.
    fn tail_of(data: &str) -> String {
        let mut start = data.len().saturating_sub(TAIL_BYTES);
        while !data.is_char_boundary(start) {
            start += 1;
        }
        data[start..].to_string()
    }
}

#[async_trait]
impl ProcessSession for PipeSession {
    async fn send(&mut self, line: &str) -> Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| Error::SendFailed("stdin already closed".to_string()))?;
        stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| Error::SendFailed(e.to_string()))?;
        stdin
            .flush()
            .await
            .map_err(|e| Error::SendFailed(e.to_string()))
    }

    async fn expect(&mut self, pattern: &str) -> Result<String> {
        let deadline = Instant::now() + self.expect_timeout;

        loop {
            // Register for wakeups before scanning, so a chunk arriving
            // between the scan and the wait still wakes us.
            let notified = self.buf.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let data = self.buf.data.lock().await;
                if let Some(pos) = data[self.cursor..].find(pattern) {
                    let end = self.cursor + pos + pattern.len();
                    let line_start = data[..end].rfind('\n').map(|i| i + 1).unwrap_or(0);
                    let matched = data[line_start..end].to_string();
                    self.cursor = end;
                    tracing::debug!(pattern, "matched session output");
                    return Ok(matched);
                }
                if self.buf.closed() {
                    return Err(Error::StreamClosed {
                        pattern: pattern.to_string(),
                        tail: Self::tail_of(&data),
                    });
                }
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() || timeout(remaining, notified).await.is_err() {
                return Err(Error::ExpectTimeout {
                    pattern: pattern.to_string(),
                    seconds: self.expect_timeout.as_secs(),
                });
            }
        }
    }

    async fn stop(mut self: Box<Self>) -> Result<()> {
        // Dropping stdin gives line-oriented children their EOF.
        self.stdin.take();

        #[cfg(unix)]
        if let Some(pid) = self.child.id() {
            unsafe {
                libc::kill(pid as i32, libc::SIGTERM);
            }
        }
        #[cfg(not(unix))]
        self.child
            .start_kill()
            .map_err(|e| Error::StopFailed(e.to_string()))?;

        match timeout(STOP_GRACE, self.child.wait()).await {
            Ok(Ok(status)) => {
                tracing::debug!(%status, "session stopped");
                Ok(())
            }
            Ok(Err(e)) => Err(Error::StopFailed(e.to_string())),
            Err(_) => {
                tracing::warn!("session ignored termination request, killing");
                self.child
                    .kill()
                    .await
                    .map_err(|e| Error::StopFailed(e.to_string()))
            }
        }
    }

    async fn close(mut self: Box<Self>) -> Result<()> {
        self.stdin.take();
        self.child
            .kill()
            .await
            .map_err(|e| Error::StopFailed(e.to_string()))
    }
}

/// Spawner producing real pipe-backed sessions.
pub struct PipeSpawner {
    expect_timeout: Duration,
}

impl PipeSpawner {
    pub fn new(expect_timeout: Duration) -> Self {
        Self { expect_timeout }
    }
}

#[async_trait]
impl Spawner for PipeSpawner {
    async fn spawn(&self, argv: &[String]) -> Result<Box<dyn ProcessSession>> {
        Ok(Box::new(PipeSession::spawn(argv, self.expect_timeout).await?))
    }
}
