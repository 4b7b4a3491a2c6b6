//! Domain layer for vulnerability collection.
//!
//! Pure value objects and services with no knowledge of processes,
//! HTTP or async runtimes.
pub mod domain;
pub mod services;
