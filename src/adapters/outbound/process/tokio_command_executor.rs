use crate::ports::outbound::CommandExecutor;
use crate::shared::error::ExecutionError;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// TokioCommandExecutor runs programs as child processes
///
/// The child is killed when the caller stops waiting for it: on
/// cancellation, on timeout, or when the surrounding task is dropped.
#[derive(Debug, Clone, Default)]
pub struct TokioCommandExecutor {
    timeout: Option<Duration>,
}

impl TokioCommandExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kills programs that run longer than `timeout`
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[async_trait]
impl CommandExecutor for TokioCommandExecutor {
    async fn execute(
        &self,
        program: &str,
        args: &[String],
        token: &CancellationToken,
    ) -> Result<Vec<u8>, ExecutionError> {
        debug!(program, args = ?args, "Running command");

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ExecutionError::Spawn {
                program: program.to_string(),
                details: e.to_string(),
            })?;

        let wait = child.wait_with_output();
        let output = match self.timeout {
            Some(limit) => tokio::select! {
                biased;
                _ = token.cancelled() => None,
                res = tokio::time::timeout(limit, wait) => match res {
                    Ok(output) => Some(output),
                    Err(_) => {
                        return Err(ExecutionError::TimedOut {
                            program: program.to_string(),
                            seconds: limit.as_secs(),
                        })
                    }
                },
            },
            None => tokio::select! {
                biased;
                _ = token.cancelled() => None,
                output = wait => Some(output),
            },
        };

        let output = output
            .ok_or_else(|| ExecutionError::Cancelled {
                program: program.to_string(),
            })?
            .map_err(|e| ExecutionError::Spawn {
                program: program.to_string(),
                details: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(ExecutionError::NonZeroExit {
                program: program.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}
