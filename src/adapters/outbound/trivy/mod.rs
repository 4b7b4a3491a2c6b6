/// Trivy adapters: CLI invocation and JSON report parsing
mod report;
mod trivy_scanner;

pub use trivy_scanner::{TrivyOptions, TrivyScanner};
