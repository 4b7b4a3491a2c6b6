use crate::ports::inbound::SnapshotReader;
use crate::vulnerability_collection::domain::{ScanResult, Snapshot};
use crate::vulnerability_collection::services::SnapshotBuilder;
use std::sync::{Arc, PoisonError, RwLock};

/// SnapshotPublisher owning the single current Snapshot
///
/// Publishing builds a brand-new snapshot outside the lock and then swaps
/// the `Arc` in one step, so a concurrent scrape sees either the old or the
/// new snapshot in full. Callers must not publish concurrently; the
/// scheduler runs cycles one at a time.
#[derive(Debug)]
pub struct SnapshotPublisher {
    current: RwLock<Arc<Snapshot>>,
    include_fixed_version: bool,
}

impl SnapshotPublisher {
    /// Creates a publisher holding an empty snapshot
    ///
    /// # Arguments
    /// * `include_fixed_version` - Adds the `fixedVersion` label to every series
    pub fn new(include_fixed_version: bool) -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot::empty(include_fixed_version))),
            include_fixed_version,
        }
    }

    /// Replaces the current snapshot with one built from `results`
    ///
    /// # Returns
    /// The snapshot that is now current
    pub fn publish(&self, results: &[ScanResult]) -> Arc<Snapshot> {
        let snapshot = Arc::new(SnapshotBuilder::build(results, self.include_fixed_version));

        // A panic while holding the lock cannot leave a half-built value
        // behind: the guarded value is only ever a complete Arc.
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::clone(&snapshot);

        snapshot
    }
}

impl SnapshotReader for SnapshotPublisher {
    fn current(&self) -> Arc<Snapshot> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vulnerability_collection::domain::{Finding, SnapshotKey};

    fn result_with(ids: &[&str]) -> ScanResult {
        let findings = ids
            .iter()
            .map(|id| {
                Finding::new(
                    "imgA".to_string(),
                    id.to_string(),
                    "pkgX".to_string(),
                    "1.0".to_string(),
                    None,
                    "HIGH".to_string(),
                )
            })
            .collect();
        ScanResult::new("imgA".to_string(), findings)
    }

    fn key(id: &str) -> SnapshotKey {
        SnapshotKey::new("imgA", id, "pkgX", "1.0", "HIGH")
    }

    #[test]
    fn test_new_publisher_starts_empty() {
        let publisher = SnapshotPublisher::new(false);
        assert!(publisher.current().is_empty());
    }

    #[test]
    fn test_publish_replaces_instead_of_merging() {
        let publisher = SnapshotPublisher::new(false);

        publisher.publish(&[result_with(&["f1", "f2"])]);
        assert_eq!(publisher.current().len(), 2);

        publisher.publish(&[result_with(&["f2"])]);
        let current = publisher.current();
        assert_eq!(current.len(), 1);
        assert!(current.contains(&key("f2")));
        assert!(!current.contains(&key("f1")));
    }

    #[test]
    fn test_publish_empty_results_clears_snapshot() {
        let publisher = SnapshotPublisher::new(false);
        publisher.publish(&[result_with(&["f1"])]);
        publisher.publish(&[]);
        assert!(publisher.current().is_empty());
    }

    #[test]
    fn test_reader_holding_old_snapshot_is_unaffected_by_publish() {
        let publisher = SnapshotPublisher::new(false);
        publisher.publish(&[result_with(&["f1"])]);

        let before = publisher.current();
        publisher.publish(&[result_with(&["f2", "f3"])]);

        assert_eq!(before.len(), 1);
        assert!(before.contains(&key("f1")));
        assert_eq!(publisher.current().len(), 2);
    }

    #[test]
    fn test_publish_returns_current_snapshot() {
        let publisher = SnapshotPublisher::new(true);
        let published = publisher.publish(&[result_with(&["f1"])]);
        assert!(Arc::ptr_eq(&published, &publisher.current()));
        assert!(published.includes_fixed_version());
    }

    #[test]
    fn test_concurrent_readers_only_see_complete_snapshots() {
        let publisher = Arc::new(SnapshotPublisher::new(false));
        let small = vec![result_with(&["a"])];
        let large = vec![result_with(&["a", "b", "c", "d", "e"])];

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let publisher = Arc::clone(&publisher);
                std::thread::spawn(move || {
                    for _ in 0..1_000 {
                        let len = publisher.current().len();
                        assert!(len == 0 || len == 1 || len == 5, "observed partial snapshot of {}", len);
                    }
                })
            })
            .collect();

        for i in 0..500 {
            if i % 2 == 0 {
                publisher.publish(&small);
            } else {
                publisher.publish(&large);
            }
        }

        for reader in readers {
            reader.join().unwrap();
        }
    }
}
