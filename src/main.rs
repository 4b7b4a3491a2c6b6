use anyhow::Context;
use clap::Parser;
use kube_vuln_exporter::adapters::inbound::http::{api_router, monitor_router, HttpServer};
use kube_vuln_exporter::adapters::outbound::kubernetes::KubectlInventory;
use kube_vuln_exporter::adapters::outbound::process::TokioCommandExecutor;
use kube_vuln_exporter::adapters::outbound::trivy::{TrivyOptions, TrivyScanner};
use kube_vuln_exporter::adapters::outbound::StaticInventory;
use kube_vuln_exporter::application::scheduler::{CollectorScheduler, SchedulerHandle};
use kube_vuln_exporter::application::services::SnapshotPublisher;
use kube_vuln_exporter::application::use_cases::CollectVulnerabilitiesUseCase;
use kube_vuln_exporter::cli::{Cli, Command, ServerArgs};
use kube_vuln_exporter::config::ExporterSettings;
use kube_vuln_exporter::ports::outbound::WorkloadInventory;
use kube_vuln_exporter::shared::error::ExitCode;
use kube_vuln_exporter::shared::panic::install_panic_hook;
use kube_vuln_exporter::shared::Result;
use kube_vuln_exporter::telemetry;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Upper bound for one `kubectl get` call
const KUBECTL_TIMEOUT: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            process::exit(exit_code_for(&e).as_i32());
        }
    };

    let result = match cli.command {
        Command::Server(args) => server(args).await,
    };

    if let Err(e) = result {
        eprintln!("\n❌ An error occurred:\n");
        eprintln!("{}", e);

        // Display error chain
        let mut source = e.source();
        while let Some(err) = source {
            eprintln!("\nCaused by: {}", err);
            source = err.source();
        }

        eprintln!();
        process::exit(ExitCode::ApplicationError.as_i32());
    }

    process::exit(ExitCode::Success.as_i32());
}

/// `--help` and `--version` are not failures
fn exit_code_for(err: &clap::Error) -> ExitCode {
    if err.use_stderr() {
        ExitCode::InvalidArguments
    } else {
        ExitCode::Success
    }
}

async fn server(args: ServerArgs) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to determine working directory")?;
    let settings = ExporterSettings::load(&args, &cwd)?;

    telemetry::init(settings.log_format, settings.verbose)?;
    install_panic_hook();

    // Bind both listeners before anything runs in the background
    let api = HttpServer::bind("api", &settings.api_address).await?;
    let monitor = HttpServer::bind("monitor", &settings.monitor_address).await?;

    let token = CancellationToken::new();

    // Create adapters (Dependency Injection)
    let publisher = Arc::new(SnapshotPublisher::new(settings.include_fixed_version));
    let scanner = Arc::new(TrivyScanner::new(
        trivy_executor(&settings),
        TrivyOptions {
            program: settings.trivy_path.clone(),
            update_database: settings.update_database,
            clear_cache: settings.clear_cache,
        },
    ));

    let collector = match &settings.images {
        Some(images) => {
            info!(images = images.len(), "Using static image list from config");
            start_collector(
                StaticInventory::new(images.clone()),
                scanner,
                Arc::clone(&publisher),
                &settings,
                &token,
            )
        }
        None => start_collector(
            KubectlInventory::new(
                TokioCommandExecutor::with_timeout(KUBECTL_TIMEOUT),
                settings.kubectl_path.clone(),
                settings.namespace.clone(),
            ),
            scanner,
            Arc::clone(&publisher),
            &settings,
            &token,
        ),
    };

    let api_task = tokio::spawn(api.serve(
        api_router(settings.api_max_connections),
        token.clone(),
    ));
    let monitor_task = tokio::spawn(monitor.serve(
        monitor_router(publisher, settings.monitor_max_connections),
        token.clone(),
    ));

    shutdown_signal().await;
    info!("Shutting down");
    token.cancel();

    let grace = settings.shutdown_grace_period;
    let (collector_drained, servers) = tokio::join!(
        collector.shutdown(grace),
        tokio::time::timeout(grace, futures::future::join(api_task, monitor_task)),
    );

    match servers {
        Ok((api, monitor)) => {
            for (name, joined) in [("api", api), ("monitor", monitor)] {
                match joined {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => error!(server = name, error = %e, "Server failed"),
                    Err(e) => error!(server = name, error = %e, "Server task failed"),
                }
            }
        }
        Err(_) => warn!("shutdown timed out"),
    }

    if collector_drained {
        info!("Shutdown complete");
    }
    Ok(())
}

/// Executor for trivy; each invocation is killed after `scan_timeout`
fn trivy_executor(settings: &ExporterSettings) -> TokioCommandExecutor {
    TokioCommandExecutor::with_timeout(settings.scan_timeout)
}

fn start_collector<I>(
    inventory: I,
    scanner: Arc<TrivyScanner<TokioCommandExecutor>>,
    publisher: Arc<SnapshotPublisher>,
    settings: &ExporterSettings,
    token: &CancellationToken,
) -> SchedulerHandle
where
    I: WorkloadInventory + 'static,
{
    let use_case =
        CollectVulnerabilitiesUseCase::new(inventory, scanner, publisher, settings.trivy_concurrency);

    CollectorScheduler::new(Arc::new(use_case), settings.collector_loop_interval)
        .with_scan_on_start(settings.scan_on_start)
        .start(token)
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
