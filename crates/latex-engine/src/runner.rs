//! Child process execution with a timeout

use std::io;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::error::BuildFailure;
use crate::invocation::Invocation;

/// Captured result of a process that ran to completion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// stdout followed by stderr
    pub fn combined(&self) -> String {
        let mut combined = String::with_capacity(self.stdout.len() + self.stderr.len() + 1);
        combined.push_str(&self.stdout);
        if !self.stdout.is_empty() && !self.stdout.ends_with('\n') {
            combined.push('\n');
        }
        combined.push_str(&self.stderr);
        combined
    }
}

/// Runs an [`Invocation`] and captures its output.
///
/// A non-zero exit is *not* an error at this level; it is reported through
/// [`ProcessOutput::exit_code`].
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(
        &self,
        invocation: &Invocation,
        timeout: Duration,
    ) -> Result<ProcessOutput, BuildFailure>;
}

/// How long captured pipes are drained after a timed-out child is killed.
/// A grandchild may still hold the pipes open, so this is bounded.
const DRAIN_GRACE: Duration = Duration::from_millis(100);

/// Spawns real processes with `tokio::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessRunner;

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(
        &self,
        invocation: &Invocation,
        timeout: Duration,
    ) -> Result<ProcessOutput, BuildFailure> {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &invocation.working_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|source| BuildFailure::Spawn {
            program: invocation.program.clone(),
            source,
        })?;

        // Streams are read as they arrive so a timeout keeps what was written.
        let mut stdout = Capture::start(child.stdout.take());
        let mut stderr = Capture::start(child.stderr.take());

        let outcome = tokio::time::timeout(timeout, async {
            let status = child.wait().await?;
            stdout.finish().await?;
            stderr.finish().await?;
            Ok::<_, io::Error>(status)
        })
        .await;

        match outcome {
            Ok(Ok(status)) => Ok(ProcessOutput {
                exit_code: status.code(),
                stdout: stdout.text().await,
                stderr: stderr.text().await,
            }),
            Ok(Err(source)) => Err(BuildFailure::Io {
                program: invocation.program.clone(),
                source,
            }),
            Err(_elapsed) => {
                if let Err(err) = child.kill().await {
                    warn!("Failed to kill {}: {}", invocation.program, err);
                }
                let _ = tokio::time::timeout(DRAIN_GRACE, async {
                    let _ = stdout.finish().await;
                    let _ = stderr.finish().await;
                })
                .await;

                Err(BuildFailure::Timeout {
                    program: invocation.program.clone(),
                    timeout,
                    partial: ProcessOutput {
                        exit_code: None,
                        stdout: stdout.text().await,
                        stderr: stderr.text().await,
                    },
                })
            }
        }
    }
}

/// Background reader appending one child pipe into a shared buffer
struct Capture {
    buffer: Arc<Mutex<Vec<u8>>>,
    task: Option<JoinHandle<io::Result<()>>>,
}

impl Capture {
    fn start<R>(reader: Option<R>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let task = reader.map(|reader| tokio::spawn(read_into(reader, buffer.clone())));
        Self { buffer, task }
    }

    /// Wait for the pipe to reach EOF
    async fn finish(&mut self) -> io::Result<()> {
        if let Some(task) = self.task.as_mut() {
            let result = task.await;
            self.task = None;
            result.map_err(|err| io::Error::new(io::ErrorKind::Other, err))??;
        }
        Ok(())
    }

    async fn text(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().await).into_owned()
    }
}

impl Drop for Capture {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn read_into<R>(mut reader: R, buffer: Arc<Mutex<Vec<u8>>>) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut chunk = [0u8; 8192];
    loop {
        let read = reader.read(&mut chunk).await?;
        if read == 0 {
            return Ok(());
        }
        buffer.lock().await.extend_from_slice(&chunk[..read]);
    }
}
