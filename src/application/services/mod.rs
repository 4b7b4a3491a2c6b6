/// Application services coordinating scans and the exported snapshot
mod scan_dispatcher;
mod snapshot_publisher;

pub use scan_dispatcher::ScanDispatcher;
pub use snapshot_publisher::SnapshotPublisher;
