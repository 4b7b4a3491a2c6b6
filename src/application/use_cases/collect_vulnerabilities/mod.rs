use crate::application::dto::CycleReport;
use crate::application::services::{ScanDispatcher, SnapshotPublisher};
use crate::ports::inbound::{CollectionCyclePort, SnapshotReader};
use crate::ports::outbound::{VulnerabilityScanner, WorkloadInventory};
use crate::shared::error::CycleError;
use crate::vulnerability_collection::services::ImageDeduplicator;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// CollectVulnerabilitiesUseCase - one enumerate → scan → publish cycle
///
/// This use case orchestrates the collection workflow. All state it
/// creates (image set, semaphore, result accumulator) lives only for the
/// duration of [`run_cycle`](CollectionCyclePort::run_cycle).
///
/// # Type Parameters
/// * `I` - WorkloadInventory implementation
/// * `S` - VulnerabilityScanner implementation
pub struct CollectVulnerabilitiesUseCase<I, S>
where
    I: WorkloadInventory,
    S: VulnerabilityScanner + ?Sized + 'static,
{
    inventory: I,
    scanner: Arc<S>,
    dispatcher: ScanDispatcher,
    publisher: Arc<SnapshotPublisher>,
}

impl<I, S> CollectVulnerabilitiesUseCase<I, S>
where
    I: WorkloadInventory,
    S: VulnerabilityScanner + ?Sized + 'static,
{
    /// Creates a new use case with injected dependencies
    ///
    /// # Arguments
    /// * `inventory` - Source of running container images
    /// * `scanner` - Scanner invoked once per unique image
    /// * `publisher` - Owner of the exported snapshot, shared with the metrics endpoint
    /// * `concurrency_limit` - Maximum simultaneous scanner invocations
    pub fn new(
        inventory: I,
        scanner: Arc<S>,
        publisher: Arc<SnapshotPublisher>,
        concurrency_limit: usize,
    ) -> Self {
        Self {
            inventory,
            scanner,
            dispatcher: ScanDispatcher::new(concurrency_limit),
            publisher,
        }
    }

    pub fn publisher(&self) -> Arc<SnapshotPublisher> {
        Arc::clone(&self.publisher)
    }
}

#[async_trait]
impl<I, S> CollectionCyclePort for CollectVulnerabilitiesUseCase<I, S>
where
    I: WorkloadInventory,
    S: VulnerabilityScanner + ?Sized + 'static,
{
    async fn run_cycle(&self, token: &CancellationToken) -> Result<CycleReport, CycleError> {
        let cycle_id = Uuid::new_v4();
        let started_at = Utc::now();

        // Step 1: Enumerate workloads; failure keeps the previous snapshot
        let containers = self
            .inventory
            .containers()
            .await
            .map_err(|e| CycleError::InventoryUnavailable {
                details: format!("{:#}", e),
            })?;
        let container_count = containers.len();

        // Step 2: Deduplicate
        let images = ImageDeduplicator::deduplicate(containers);
        let image_count = images.len();
        debug!(%cycle_id, containers = container_count, images = image_count, "Enumerated images");

        // Step 3: Pre-scan maintenance
        self.scanner
            .update_database(token)
            .await
            .map_err(|e| CycleError::DatabaseUpdateFailed {
                details: format!("{:#}", e),
            })?;

        // Step 4: Fan out scans
        let outcome = self
            .dispatcher
            .dispatch(images, Arc::clone(&self.scanner), token)
            .await;

        // Step 5: Publish, unless shutdown interrupted the fan-out
        let (published, published_series) = if token.is_cancelled() {
            warn!(%cycle_id, "Cycle interrupted by shutdown, keeping previous snapshot");
            (false, self.publisher.current().len())
        } else {
            let snapshot = self.publisher.publish(&outcome.results);
            (true, snapshot.len())
        };

        // Step 6: Post-scan maintenance; results are already published
        if !token.is_cancelled() {
            if let Err(e) = self.scanner.clear_cache(token).await {
                warn!(%cycle_id, error = %format!("{:#}", e), "Failed to clear scanner cache");
            }
        }

        let report = CycleReport {
            cycle_id,
            started_at,
            containers: container_count,
            images: image_count,
            failures: outcome.failures,
            published_series,
            published,
        };

        info!(
            %cycle_id,
            images = report.images,
            succeeded = report.succeeded_images(),
            failures = report.failures.len(),
            series = report.published_series,
            "Collection cycle complete"
        );

        Ok(report)
    }
}
