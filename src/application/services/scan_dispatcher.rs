use crate::application::dto::{DispatchOutcome, ImageFailure};
use crate::ports::outbound::VulnerabilityScanner;
use crate::shared::error::ScanError;
use crate::shared::panic::panic_message;
use crate::vulnerability_collection::domain::{ImageRef, ScanResult};
use futures::FutureExt;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::{Id, JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// ScanDispatcher - bounded-concurrency fan-out over the scanner
///
/// Every image gets its own task, but at most `concurrency_limit` scanner
/// invocations are in flight at once.
#[derive(Debug, Clone)]
pub struct ScanDispatcher {
    concurrency_limit: usize,
}

impl ScanDispatcher {
    /// Creates a dispatcher; limits below 1 are raised to 1
    pub fn new(concurrency_limit: usize) -> Self {
        Self {
            concurrency_limit: concurrency_limit.max(1),
        }
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    /// Scans every image once and waits for all scans to finish
    ///
    /// Never fails: scanner errors, cancellations and panics are turned into
    /// [`ImageFailure`]s and logged with the image they belong to.
    ///
    /// # Arguments
    /// * `images` - Unique images to scan
    /// * `scanner` - Shared scanner used by every task
    /// * `token` - Forwarded to each scanner call; also aborts waits for a slot
    pub async fn dispatch<S>(
        &self,
        images: Vec<ImageRef>,
        scanner: Arc<S>,
        token: &CancellationToken,
    ) -> DispatchOutcome
    where
        S: VulnerabilityScanner + ?Sized + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.concurrency_limit));
        let accumulator: Arc<Mutex<Vec<ScanResult>>> = Arc::new(Mutex::new(Vec::new()));
        let mut tasks = JoinSet::new();
        let mut images_by_task = HashMap::with_capacity(images.len());

        for image in images {
            let tracked = image.clone();
            let semaphore = Arc::clone(&semaphore);
            let scanner = Arc::clone(&scanner);
            let accumulator = Arc::clone(&accumulator);
            let token = token.clone();

            let handle = tasks.spawn(async move {
                let outcome =
                    AssertUnwindSafe(scan_image(scanner.as_ref(), &image, &semaphore, &token))
                        .catch_unwind()
                        .await
                        .unwrap_or_else(|panic| {
                            Err(ScanError::Panicked {
                                message: panic_message(panic.as_ref()),
                            })
                        });

                match outcome {
                    Ok(results) => {
                        debug!(image = %image, targets = results.len(), "Scan finished");
                        accumulator.lock().await.extend(results);
                        None
                    }
                    Err(err) => {
                        log_failure(&image, &err);
                        Some(ImageFailure::new(image, err))
                    }
                }
            });
            images_by_task.insert(handle.id(), tracked);
        }

        let failures = join_all(tasks, images_by_task).await;
        let results = std::mem::take(&mut *accumulator.lock().await);
        DispatchOutcome { results, failures }
    }
}

/// Waits for every scan task and collects the failures they reported
///
/// A task that died outside its own panic guard is still reported against
/// its image, so no image goes missing from the failure list.
async fn join_all(
    mut tasks: JoinSet<Option<ImageFailure>>,
    mut images_by_task: HashMap<Id, ImageRef>,
) -> Vec<ImageFailure> {
    let mut failures = Vec::new();
    while let Some(joined) = tasks.join_next_with_id().await {
        match joined {
            Ok((_, Some(failure))) => failures.push(failure),
            Ok((_, None)) => {}
            Err(err) => {
                let id = err.id();
                match images_by_task.remove(&id) {
                    Some(image) => {
                        let err = join_error_to_scan_error(err);
                        log_failure(&image, &err);
                        failures.push(ImageFailure::new(image, err));
                    }
                    None => error!(task = %id, error = %err, "Scan task did not complete"),
                }
            }
        }
    }
    failures
}

fn join_error_to_scan_error(err: JoinError) -> ScanError {
    match err.try_into_panic() {
        Ok(payload) => ScanError::Panicked {
            message: panic_message(payload.as_ref()),
        },
        Err(_) => ScanError::Cancelled,
    }
}

/// Holds one semaphore slot for the duration of a single scanner call.
/// The permit is released when it goes out of scope, on every exit path.
async fn scan_image<S>(
    scanner: &S,
    image: &ImageRef,
    semaphore: &Semaphore,
    token: &CancellationToken,
) -> Result<Vec<ScanResult>, ScanError>
where
    S: VulnerabilityScanner + ?Sized,
{
    let _permit = tokio::select! {
        biased;
        _ = token.cancelled() => return Err(ScanError::Cancelled),
        permit = semaphore.acquire() => permit.map_err(|_| ScanError::Cancelled)?,
    };

    debug!(image = %image, "Scanning image");
    scanner.scan(image, token).await
}

fn log_failure(image: &ImageRef, err: &ScanError) {
    match err {
        ScanError::Execution { .. } => {
            error!(image = %image, error = %err, "Failed to detect vulnerability")
        }
        ScanError::UnparsableOutput { .. } => {
            error!(image = %image, error = %err, "Failed to parse scanner response")
        }
        ScanError::Panicked { .. } => error!(image = %image, error = %err, "Scan task panicked"),
        ScanError::Cancelled => warn!(image = %image, "Scan cancelled"),
    }
}
