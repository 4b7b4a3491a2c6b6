/// Application layer - Use cases, scheduling and DTOs
///
/// This layer contains the application logic that orchestrates
/// domain services and coordinates with infrastructure through ports.
pub mod dto;
pub mod scheduler;
pub mod services;
pub mod use_cases;
