use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::telemetry::LogFormat;

/// Export vulnerabilities found by trivy in cluster workloads as Prometheus metrics
#[derive(Parser, Debug)]
#[command(name = "kube-vuln-exporter")]
#[command(version)]
#[command(
    about = "Export vulnerabilities found by trivy in cluster workloads as Prometheus metrics",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the collector loop with the API and monitor servers
    Server(ServerArgs),
}

/// Flags of the `server` subcommand
///
/// Options left unset fall back to the config file, then to built-in defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct ServerArgs {
    /// Listen address of the API server (/health) [default: 127.0.0.1:8000]
    #[arg(long, value_name = "ADDR")]
    pub api_address: Option<String>,

    /// Listen address of the monitor server (/metrics) [default: 127.0.0.1:9090]
    #[arg(long, value_name = "ADDR")]
    pub monitor_address: Option<String>,

    /// Maximum number of requests the API server handles at once [default: unlimited]
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub api_max_connections: Option<u64>,

    /// Maximum number of requests the monitor server handles at once [default: unlimited]
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub monitor_max_connections: Option<u64>,

    /// Maximum number of concurrent trivy processes [default: 10]
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub trivy_concurrency: Option<u64>,

    /// Seconds between collection cycles [default: 60]
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    pub collector_loop_interval: Option<u64>,

    /// Seconds after which one trivy invocation is killed [default: 600]
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    pub scan_timeout: Option<u64>,

    /// Seconds to wait for in-flight work on shutdown [default: 10]
    #[arg(long, value_name = "SECONDS")]
    pub shutdown_grace_period: Option<u64>,

    /// Path to a YAML config file (defaults to kube-vuln-exporter.config.yml if present)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Trivy executable [default: trivy]
    #[arg(long, value_name = "PATH")]
    pub trivy_path: Option<String>,

    /// kubectl executable [default: kubectl]
    #[arg(long, value_name = "PATH")]
    pub kubectl_path: Option<String>,

    /// Only inspect workloads in this namespace
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Add the fixedVersion label to every series
    #[arg(long)]
    pub include_fixed_version: bool,

    /// Download the trivy vulnerability database before each cycle
    #[arg(long)]
    pub update_database: bool,

    /// Clear the trivy scan cache after each cycle
    #[arg(long)]
    pub clear_cache: bool,

    /// Run the first cycle at startup instead of after one interval
    #[arg(long)]
    pub scan_on_start: bool,

    /// Log format
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<ServerArgs, clap::Error> {
        let mut argv = vec!["kube-vuln-exporter", "server"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).map(|cli| match cli.command {
            Command::Server(args) => args,
        })
    }

    #[test]
    fn test_server_without_flags() {
        let args = parse(&[]).unwrap();
        assert!(args.api_address.is_none());
        assert!(args.trivy_concurrency.is_none());
        assert!(!args.include_fixed_version);
        assert!(!args.verbose);
    }

    #[test]
    fn test_server_flags() {
        let args = parse(&[
            "--api-address",
            "0.0.0.0:8000",
            "--monitor-address",
            "0.0.0.0:9090",
            "--trivy-concurrency",
            "4",
            "--collector-loop-interval",
            "300",
            "--scan-timeout",
            "120",
            "--monitor-max-connections",
            "16",
            "--namespace",
            "payments",
            "--include-fixed-version",
            "--log-format",
            "json",
            "-v",
        ])
        .unwrap();

        assert_eq!(args.api_address.as_deref(), Some("0.0.0.0:8000"));
        assert_eq!(args.monitor_address.as_deref(), Some("0.0.0.0:9090"));
        assert_eq!(args.trivy_concurrency, Some(4));
        assert_eq!(args.collector_loop_interval, Some(300));
        assert_eq!(args.scan_timeout, Some(120));
        assert_eq!(args.monitor_max_connections, Some(16));
        assert!(args.api_max_connections.is_none());
        assert_eq!(args.namespace.as_deref(), Some("payments"));
        assert!(args.include_fixed_version);
        assert_eq!(args.log_format, Some(LogFormat::Json));
        assert!(args.verbose);
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let err = parse(&["--trivy-concurrency", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        assert!(parse(&["--collector-loop-interval", "0"]).is_err());
    }

    #[test]
    fn test_zero_max_connections_is_rejected() {
        assert!(parse(&["--api-max-connections", "0"]).is_err());
        assert!(parse(&["--monitor-max-connections", "0"]).is_err());
    }

    #[test]
    fn test_zero_scan_timeout_is_rejected() {
        assert!(parse(&["--scan-timeout", "0"]).is_err());
    }

    #[test]
    fn test_unknown_log_format_is_rejected() {
        assert!(parse(&["--log-format", "xml"]).is_err());
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(Cli::try_parse_from(["kube-vuln-exporter"]).is_err());
    }
}
