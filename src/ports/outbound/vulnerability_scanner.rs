use crate::shared::error::ScanError;
use crate::shared::Result;
use crate::vulnerability_collection::domain::{ImageRef, ScanResult};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// VulnerabilityScanner port for scanning a single image
///
/// Implementations must be `Send + Sync`: one scanner instance serves every
/// concurrent scan of a cycle.
#[async_trait]
pub trait VulnerabilityScanner: Send + Sync {
    /// Scans one image reference
    ///
    /// # Arguments
    /// * `image` - Image to scan
    /// * `token` - Cancelled when the exporter shuts down; implementations
    ///   should abort promptly and return [`ScanError::Cancelled`]
    ///
    /// # Returns
    /// One [`ScanResult`] per target found in the image (possibly none)
    async fn scan(
        &self,
        image: &ImageRef,
        token: &CancellationToken,
    ) -> std::result::Result<Vec<ScanResult>, ScanError>;

    /// Refreshes the vulnerability database before a cycle's scans
    ///
    /// The default implementation does nothing.
    async fn update_database(&self, _token: &CancellationToken) -> Result<()> {
        Ok(())
    }

    /// Clears scanner caches after a cycle's scans
    ///
    /// The default implementation does nothing.
    async fn clear_cache(&self, _token: &CancellationToken) -> Result<()> {
        Ok(())
    }
}
