//! Configuration file support for kube-vuln-exporter.
//!
//! Provides YAML-based configuration through `kube-vuln-exporter.config.yml`
//! files, and resolves file values and command-line flags into the
//! validated [`ExporterSettings`] the binary runs with.

use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::cli::ServerArgs;
use crate::shared::error::ExporterError;
use crate::shared::Result;
use crate::telemetry::LogFormat;
use crate::vulnerability_collection::domain::ImageRef;

const CONFIG_FILENAME: &str = "kube-vuln-exporter.config.yml";

const DEFAULT_API_ADDRESS: &str = "127.0.0.1:8000";
const DEFAULT_MONITOR_ADDRESS: &str = "127.0.0.1:9090";
const DEFAULT_TRIVY_CONCURRENCY: usize = 10;
const DEFAULT_LOOP_INTERVAL_SECS: u64 = 60;
const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 10;
const DEFAULT_SCAN_TIMEOUT_SECS: u64 = 600;

/// Top-level configuration file schema.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub api_address: Option<String>,
    pub monitor_address: Option<String>,
    pub api_max_connections: Option<u64>,
    pub monitor_max_connections: Option<u64>,
    pub trivy_concurrency: Option<u64>,
    /// Seconds between collection cycles
    pub collector_loop_interval: Option<u64>,
    /// Seconds after which one trivy invocation is killed
    pub scan_timeout: Option<u64>,
    pub shutdown_grace_period: Option<u64>,
    pub trivy_path: Option<String>,
    pub kubectl_path: Option<String>,
    pub namespace: Option<String>,
    pub include_fixed_version: Option<bool>,
    pub update_database: Option<bool>,
    pub clear_cache: Option<bool>,
    pub scan_on_start: Option<bool>,
    pub log_format: Option<LogFormat>,
    /// Fixed image list; replaces cluster discovery when present.
    pub images: Option<Vec<String>>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content =
        std::fs::read_to_string(path).map_err(|e| ExporterError::ConfigReadError {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;

    let config: ConfigFile = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    validate_config(&config)?;
    warn_unknown_fields(&config);

    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        return Ok(None);
    }

    let config = load_config_from_path(&config_path)?;
    Ok(Some(config))
}

/// Validate the loaded configuration.
fn validate_config(config: &ConfigFile) -> std::result::Result<(), ExporterError> {
    if config.trivy_concurrency == Some(0) {
        return Err(ExporterError::InvalidConfig {
            field: "trivy_concurrency".to_string(),
            reason: "must be at least 1".to_string(),
            hint: "Set the number of trivy processes allowed to run at once (e.g., 10)."
                .to_string(),
        });
    }

    for (field, value) in [
        ("api_max_connections", config.api_max_connections),
        ("monitor_max_connections", config.monitor_max_connections),
    ] {
        if value == Some(0) {
            return Err(ExporterError::InvalidConfig {
                field: field.to_string(),
                reason: "must be at least 1".to_string(),
                hint: "Remove the field to accept any number of requests at once.".to_string(),
            });
        }
    }

    if config.collector_loop_interval == Some(0) {
        return Err(ExporterError::InvalidConfig {
            field: "collector_loop_interval".to_string(),
            reason: "must be at least 1 second".to_string(),
            hint: "Set the number of seconds between collection cycles (e.g., 60).".to_string(),
        });
    }

    if config.scan_timeout == Some(0) {
        return Err(ExporterError::InvalidConfig {
            field: "scan_timeout".to_string(),
            reason: "must be at least 1 second".to_string(),
            hint: "Set the number of seconds one trivy run may take (e.g., 600).".to_string(),
        });
    }

    if let Some(ref images) = config.images {
        for (i, image) in images.iter().enumerate() {
            if image.trim().is_empty() {
                return Err(ExporterError::InvalidConfig {
                    field: format!("images[{}]", i),
                    reason: "must not be empty".to_string(),
                    hint: "Each images entry must be an image reference (e.g., \"nginx:1.19\")."
                        .to_string(),
                });
            }
        }
    }

    Ok(())
}

/// Warn about unknown fields in the config file.
///
/// Printed directly: the config is read before logging is configured.
fn warn_unknown_fields(config: &ConfigFile) {
    for key in config.unknown_fields.keys() {
        eprintln!(
            "⚠️  Warning: Unknown config field '{}' will be ignored.",
            key
        );
    }
}

/// Settings the exporter runs with, after merging flags, file and defaults
#[derive(Debug, Clone, PartialEq)]
pub struct ExporterSettings {
    pub api_address: String,
    pub monitor_address: String,
    /// `None` accepts any number of requests at once
    pub api_max_connections: Option<usize>,
    pub monitor_max_connections: Option<usize>,
    pub trivy_concurrency: usize,
    pub collector_loop_interval: Duration,
    pub scan_timeout: Duration,
    pub shutdown_grace_period: Duration,
    pub trivy_path: String,
    pub kubectl_path: String,
    pub namespace: Option<String>,
    pub include_fixed_version: bool,
    pub update_database: bool,
    pub clear_cache: bool,
    pub scan_on_start: bool,
    pub log_format: LogFormat,
    pub verbose: bool,
    /// `Some` when images come from the config file instead of the cluster
    pub images: Option<Vec<ImageRef>>,
}

impl Default for ExporterSettings {
    fn default() -> Self {
        Self {
            api_address: DEFAULT_API_ADDRESS.to_string(),
            monitor_address: DEFAULT_MONITOR_ADDRESS.to_string(),
            api_max_connections: None,
            monitor_max_connections: None,
            trivy_concurrency: DEFAULT_TRIVY_CONCURRENCY,
            collector_loop_interval: Duration::from_secs(DEFAULT_LOOP_INTERVAL_SECS),
            scan_timeout: Duration::from_secs(DEFAULT_SCAN_TIMEOUT_SECS),
            shutdown_grace_period: Duration::from_secs(DEFAULT_SHUTDOWN_GRACE_SECS),
            trivy_path: "trivy".to_string(),
            kubectl_path: "kubectl".to_string(),
            namespace: None,
            include_fixed_version: false,
            update_database: false,
            clear_cache: false,
            scan_on_start: false,
            log_format: LogFormat::Text,
            verbose: false,
            images: None,
        }
    }
}

impl ExporterSettings {
    /// Loads the config file named by `args` (or discovered in `cwd`) and merges it
    pub fn load(args: &ServerArgs, cwd: &Path) -> Result<Self> {
        let file = match &args.config {
            Some(path) => Some(load_config_from_path(path)?),
            None => discover_config(cwd)?,
        };
        Ok(Self::resolve(args, file.unwrap_or_default()))
    }

    /// Merges flags over file values over defaults
    ///
    /// Boolean flags can only switch a feature on; a `true` in the file is
    /// kept when the flag is absent.
    pub fn resolve(args: &ServerArgs, file: ConfigFile) -> Self {
        let defaults = Self::default();

        let trivy_concurrency = args
            .trivy_concurrency
            .or(file.trivy_concurrency)
            .map(to_usize)
            .unwrap_or(defaults.trivy_concurrency);

        Self {
            api_address: args
                .api_address
                .clone()
                .or(file.api_address)
                .unwrap_or(defaults.api_address),
            monitor_address: args
                .monitor_address
                .clone()
                .or(file.monitor_address)
                .unwrap_or(defaults.monitor_address),
            api_max_connections: args
                .api_max_connections
                .or(file.api_max_connections)
                .map(to_usize),
            monitor_max_connections: args
                .monitor_max_connections
                .or(file.monitor_max_connections)
                .map(to_usize),
            trivy_concurrency,
            collector_loop_interval: args
                .collector_loop_interval
                .or(file.collector_loop_interval)
                .map(Duration::from_secs)
                .unwrap_or(defaults.collector_loop_interval),
            scan_timeout: args
                .scan_timeout
                .or(file.scan_timeout)
                .map(Duration::from_secs)
                .unwrap_or(defaults.scan_timeout),
            shutdown_grace_period: args
                .shutdown_grace_period
                .or(file.shutdown_grace_period)
                .map(Duration::from_secs)
                .unwrap_or(defaults.shutdown_grace_period),
            trivy_path: args
                .trivy_path
                .clone()
                .or(file.trivy_path)
                .unwrap_or(defaults.trivy_path),
            kubectl_path: args
                .kubectl_path
                .clone()
                .or(file.kubectl_path)
                .unwrap_or(defaults.kubectl_path),
            namespace: args.namespace.clone().or(file.namespace),
            include_fixed_version: args.include_fixed_version
                || file.include_fixed_version.unwrap_or(false),
            update_database: args.update_database || file.update_database.unwrap_or(false),
            clear_cache: args.clear_cache || file.clear_cache.unwrap_or(false),
            scan_on_start: args.scan_on_start || file.scan_on_start.unwrap_or(false),
            log_format: args
                .log_format
                .or(file.log_format)
                .unwrap_or(defaults.log_format),
            verbose: args.verbose,
            images: file
                .images
                .map(|images| images.into_iter().map(ImageRef::new).collect()),
        }
    }
}

fn to_usize(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}
