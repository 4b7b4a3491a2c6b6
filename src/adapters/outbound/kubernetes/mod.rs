/// Kubernetes adapters for workload discovery
mod kubectl_inventory;

pub use kubectl_inventory::KubectlInventory;
