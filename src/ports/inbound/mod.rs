/// Inbound ports (Driving ports) - interfaces the outside world calls into
pub mod collection_cycle_port;
pub mod snapshot_reader;

pub use collection_cycle_port::CollectionCyclePort;
pub use snapshot_reader::SnapshotReader;
