use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the exporter process.
///
/// These codes allow process supervisors to distinguish between a bad
/// invocation and a failure while starting or running the exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Clean shutdown after a termination signal
    Success = 0,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (invalid config, listener bind failure, etc.)
    ApplicationError = 3,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
        }
    }
}

/// Startup errors surfaced to the operator.
#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("Invalid configuration: {field}\nReason: {reason}\n\n💡 Hint: {hint}")]
    InvalidConfig {
        field: String,
        reason: String,
        hint: String,
    },

    #[error("Failed to read config file: {path}\nDetails: {details}\n\n💡 Hint: Check that the file exists and is readable")]
    ConfigReadError { path: PathBuf, details: String },

    #[error("Failed to listen on {address}\nDetails: {details}\n\n💡 Hint: Check that the address is valid and the port is not already in use")]
    BindFailed { address: String, details: String },
}

/// Errors that abort a whole collection cycle.
///
/// The previously published snapshot is kept when one of these occurs.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("Failed to get containers: {details}")]
    InventoryUnavailable { details: String },

    #[error("Failed to update vulnerability database: {details}")]
    DatabaseUpdateFailed { details: String },
}

/// Per-image scan failures.
///
/// These are isolated to the image they occurred on and never affect the
/// results of other images in the same cycle.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScanError {
    #[error("scanner execution failed: {details}")]
    Execution { details: String },

    #[error("could not parse scanner output: {details}")]
    UnparsableOutput { details: String },

    #[error("scan was cancelled")]
    Cancelled,

    #[error("scan task panicked: {message}")]
    Panicked { message: String },
}

/// Failures of an external process invocation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExecutionError {
    #[error("could not start {program}: {details}")]
    Spawn { program: String, details: String },

    #[error("{program} exited with {status}: {stderr}")]
    NonZeroExit {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("{program} was cancelled")]
    Cancelled { program: String },

    #[error("{program} did not finish within {seconds} seconds")]
    TimedOut { program: String, seconds: u64 },
}

impl From<ExecutionError> for ScanError {
    fn from(err: ExecutionError) -> Self {
        match err {
            ExecutionError::Cancelled { .. } => ScanError::Cancelled,
            other => ScanError::Execution {
                details: other.to_string(),
            },
        }
    }
}
