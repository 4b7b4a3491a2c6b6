/// Shared error types, panic helpers and result alias used across layers
pub mod error;
pub mod panic;
pub mod result;

pub use result::Result;
