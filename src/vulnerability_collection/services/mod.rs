/// Domain services containing pure collection logic
mod image_deduplicator;
mod snapshot_builder;

pub use image_deduplicator::ImageDeduplicator;
pub use snapshot_builder::SnapshotBuilder;
