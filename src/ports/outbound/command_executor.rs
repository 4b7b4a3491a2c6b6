use crate::shared::error::ExecutionError;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// CommandExecutor port for running external programs
///
/// Adapters that shell out (trivy, kubectl) depend on this port instead of
/// spawning processes directly, so they can be tested with canned output.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Runs `program` with `args` and returns its standard output
    ///
    /// # Errors
    /// Returns an error if the program cannot be started, exits with a
    /// non-zero status, or `token` is cancelled before it finishes.
    async fn execute(
        &self,
        program: &str,
        args: &[String],
        token: &CancellationToken,
    ) -> std::result::Result<Vec<u8>, ExecutionError>;
}
