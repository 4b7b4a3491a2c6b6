use crate::vulnerability_collection::domain::Snapshot;
use std::sync::Arc;

/// SnapshotReader - Inbound port for reading the exported findings
///
/// This port is what the metrics endpoint scrapes. Implementations must
/// always hand out a complete snapshot, never one being built.
pub trait SnapshotReader: Send + Sync {
    /// Returns the currently published snapshot
    fn current(&self) -> Arc<Snapshot>;
}
