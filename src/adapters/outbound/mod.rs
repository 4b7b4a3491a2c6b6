/// Outbound adapters - Infrastructure implementations of outbound ports
pub mod kubernetes;
pub mod process;
mod static_inventory;
pub mod trivy;

pub use static_inventory::StaticInventory;
