pub mod finding;
pub mod image_ref;
pub mod snapshot;

pub use finding::{Finding, ScanResult};
pub use image_ref::ImageRef;
pub use snapshot::{Snapshot, SnapshotKey};
