/// Data Transfer Objects for application layer
///
/// DTOs carry cycle outcomes between the application services and the
/// scheduler, keeping the domain layer isolated.
mod cycle_report;

pub use cycle_report::{CycleReport, DispatchOutcome, ImageFailure};
