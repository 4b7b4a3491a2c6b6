/// Type alias for Result with anyhow::Error as the error type.
/// Adapters and startup plumbing use this; the collection engine uses the
/// typed errors in [`crate::shared::error`].
pub type Result<T> = std::result::Result<T, anyhow::Error>;
