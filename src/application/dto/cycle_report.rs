use crate::shared::error::ScanError;
use crate::vulnerability_collection::domain::{ImageRef, ScanResult};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A scan that did not produce results for one image
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFailure {
    pub image: ImageRef,
    pub error: ScanError,
}

impl ImageFailure {
    pub fn new(image: ImageRef, error: ScanError) -> Self {
        Self { image, error }
    }
}

/// Everything the scan fan-out produced in one cycle
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    pub results: Vec<ScanResult>,
    pub failures: Vec<ImageFailure>,
}

/// CycleReport - Summary of one completed collection cycle
///
/// Returned to the scheduler for logging; it is not retained afterwards.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub cycle_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Container entries reported by the inventory, before deduplication
    pub containers: usize,
    /// Unique images dispatched to the scanner
    pub images: usize,
    pub failures: Vec<ImageFailure>,
    /// Series in the published snapshot
    pub published_series: usize,
    /// False when shutdown interrupted the cycle and the prior snapshot was kept
    pub published: bool,
}

impl CycleReport {
    pub fn succeeded_images(&self) -> usize {
        self.images.saturating_sub(self.failures.len())
    }
}
