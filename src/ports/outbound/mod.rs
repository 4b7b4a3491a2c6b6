/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the collection engine uses to
/// reach external systems (cluster inventory, vulnerability scanner,
/// operating system processes).
pub mod command_executor;
pub mod vulnerability_scanner;
pub mod workload_inventory;

pub use command_executor::CommandExecutor;
pub use vulnerability_scanner::VulnerabilityScanner;
pub use workload_inventory::WorkloadInventory;
