use async_trait::async_trait;
use kube_vuln_exporter::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Mock WorkloadInventory for testing
///
/// The container list and the failure switch can be changed between cycles.
pub struct MockInventory {
    containers: Mutex<Vec<String>>,
    should_fail: AtomicBool,
    calls: AtomicUsize,
}

impl MockInventory {
    pub fn new(containers: &[&str]) -> Self {
        Self {
            containers: Mutex::new(containers.iter().map(|c| c.to_string()).collect()),
            should_fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_containers(&self, containers: &[&str]) {
        *self.containers.lock().unwrap() = containers.iter().map(|c| c.to_string()).collect();
    }

    pub fn set_failure(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WorkloadInventory for MockInventory {
    async fn containers(&self) -> Result<Vec<ImageRef>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail.load(Ordering::SeqCst) {
            anyhow::bail!("Mock inventory failure");
        }
        Ok(self
            .containers
            .lock()
            .unwrap()
            .iter()
            .map(|c| ImageRef::new(c.as_str()))
            .collect())
    }
}
