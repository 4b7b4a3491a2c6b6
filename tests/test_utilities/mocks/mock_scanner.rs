use async_trait::async_trait;
use kube_vuln_exporter::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// What the mock does when asked to scan an image
#[derive(Clone)]
pub enum ScanBehavior {
    /// Returns one target named after the image with these (id, package) findings
    Findings(Vec<(&'static str, &'static str)>),
    Fail,
    Panic,
}

/// Mock VulnerabilityScanner for testing
///
/// Images without a configured behavior scan clean. Every finding is
/// reported with installed version `1.0` and severity `HIGH`.
pub struct MockScanner {
    behaviors: Mutex<HashMap<String, ScanBehavior>>,
    scanned: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockScanner {
    pub fn new() -> Self {
        Self {
            behaviors: Mutex::new(HashMap::new()),
            scanned: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_behavior(self, image: &str, behavior: ScanBehavior) -> Self {
        self.set_behavior(image, behavior);
        self
    }

    pub fn set_behavior(&self, image: &str, behavior: ScanBehavior) {
        self.behaviors
            .lock()
            .unwrap()
            .insert(image.to_string(), behavior);
    }

    /// Images scanned so far, in call order
    pub fn scanned(&self) -> Vec<String> {
        self.scanned.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VulnerabilityScanner for MockScanner {
    async fn scan(
        &self,
        image: &ImageRef,
        _token: &CancellationToken,
    ) -> std::result::Result<Vec<ScanResult>, ScanError> {
        self.scanned.lock().unwrap().push(image.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let behavior = self
            .behaviors
            .lock()
            .unwrap()
            .get(image.as_str())
            .cloned()
            .unwrap_or(ScanBehavior::Findings(vec![]));

        match behavior {
            ScanBehavior::Findings(findings) => Ok(vec![ScanResult::new(
                image.to_string(),
                findings
                    .into_iter()
                    .map(|(id, package)| {
                        Finding::new(
                            image.to_string(),
                            id.to_string(),
                            package.to_string(),
                            "1.0".to_string(),
                            None,
                            "HIGH".to_string(),
                        )
                    })
                    .collect(),
            )]),
            ScanBehavior::Fail => Err(ScanError::Execution {
                details: "Mock scanner failure".to_string(),
            }),
            ScanBehavior::Panic => panic!("Mock scanner panic on {}", image),
        }
    }
}
