//! kube-vuln-exporter - Prometheus exporter for vulnerabilities in cluster workloads
//!
//! This library periodically lists the container images running in a
//! Kubernetes cluster, scans every unique image with trivy, and publishes the
//! findings as a gauge family served on `/metrics`. It follows hexagonal
//! architecture and Domain-Driven Design principles.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`vulnerability_collection`): Findings, snapshots and pure services
//! - **Application Layer** (`application`): Collection cycle, scan fan-out, scheduler
//! - **Ports** (`ports`): Interface definitions for infrastructure
//! - **Adapters** (`adapters`): trivy, kubectl, process and HTTP implementations
//! - **Shared** (`shared`): Common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use kube_vuln_exporter::prelude::*;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn run() -> Result<()> {
//! // Create adapters
//! let inventory = StaticInventory::new(vec![ImageRef::from("nginx:1.19")]);
//! let scanner = Arc::new(TrivyScanner::new(
//!     TokioCommandExecutor::new(),
//!     TrivyOptions::default(),
//! ));
//! let publisher = Arc::new(SnapshotPublisher::new(false));
//!
//! // Create use case and run it every minute
//! let use_case = CollectVulnerabilitiesUseCase::new(inventory, scanner, publisher.clone(), 10);
//! let token = CancellationToken::new();
//! let collector = CollectorScheduler::new(Arc::new(use_case), Duration::from_secs(60))
//!     .with_scan_on_start(true)
//!     .start(&token);
//!
//! // Serve the snapshot
//! let server = HttpServer::bind("monitor", "127.0.0.1:9090").await?;
//! server.serve(monitor_router(publisher, None), token.clone()).await?;
//! collector.shutdown(Duration::from_secs(10)).await;
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod config;
pub mod ports;
pub mod shared;
pub mod telemetry;
pub mod vulnerability_collection;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::inbound::http::{api_router, monitor_router, HttpServer};
    pub use crate::adapters::outbound::kubernetes::KubectlInventory;
    pub use crate::adapters::outbound::process::TokioCommandExecutor;
    pub use crate::adapters::outbound::trivy::{TrivyOptions, TrivyScanner};
    pub use crate::adapters::outbound::StaticInventory;
    pub use crate::application::dto::{CycleReport, DispatchOutcome, ImageFailure};
    pub use crate::application::scheduler::{CollectorScheduler, SchedulerHandle, SchedulerState};
    pub use crate::application::services::{ScanDispatcher, SnapshotPublisher};
    pub use crate::application::use_cases::CollectVulnerabilitiesUseCase;
    pub use crate::ports::inbound::{CollectionCyclePort, SnapshotReader};
    pub use crate::ports::outbound::{CommandExecutor, VulnerabilityScanner, WorkloadInventory};
    pub use crate::shared::error::{CycleError, ExecutionError, ExporterError, ScanError};
    pub use crate::shared::Result;
    pub use crate::vulnerability_collection::domain::{
        Finding, ImageRef, ScanResult, Snapshot, SnapshotKey,
    };
    pub use crate::vulnerability_collection::services::{ImageDeduplicator, SnapshotBuilder};
    pub use tokio_util::sync::CancellationToken;
}
