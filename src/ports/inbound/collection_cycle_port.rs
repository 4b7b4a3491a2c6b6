use crate::application::dto::CycleReport;
use crate::shared::error::CycleError;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// CollectionCyclePort - Inbound port for running one collection cycle
///
/// The scheduler drives this port on every tick. A cycle enumerates the
/// inventory, scans each unique image and publishes a new snapshot.
#[async_trait]
pub trait CollectionCyclePort: Send + Sync {
    /// Runs one complete cycle
    ///
    /// # Arguments
    /// * `token` - Forwarded to every scanner call of the cycle
    ///
    /// # Errors
    /// Returns an error if the cycle had to be aborted before scanning
    /// (inventory or database update failure). Per-image failures are not
    /// errors; they are listed in the returned report.
    async fn run_cycle(&self, token: &CancellationToken) -> Result<CycleReport, CycleError>;
}
