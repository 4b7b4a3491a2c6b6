/// Mock implementations for testing
mod mock_inventory;
mod mock_scanner;

pub use mock_inventory::MockInventory;
pub use mock_scanner::{MockScanner, ScanBehavior};
