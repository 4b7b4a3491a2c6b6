use super::report::TrivyReport;
use crate::ports::outbound::{CommandExecutor, VulnerabilityScanner};
use crate::shared::error::ScanError;
use crate::shared::Result;
use crate::vulnerability_collection::domain::{ImageRef, ScanResult};
use anyhow::Context;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Options controlling how Trivy is invoked
#[derive(Debug, Clone)]
pub struct TrivyOptions {
    /// Trivy executable, resolved through `PATH` when not absolute
    pub program: String,
    /// Refresh the vulnerability database before each cycle
    pub update_database: bool,
    /// Drop cached scan layers after each cycle
    pub clear_cache: bool,
}

impl Default for TrivyOptions {
    fn default() -> Self {
        Self {
            program: "trivy".to_string(),
            update_database: false,
            clear_cache: false,
        }
    }
}

/// TrivyScanner adapter scanning images with the Trivy CLI
///
/// Each scan is one `trivy image` process. Process management is delegated
/// to the injected [`CommandExecutor`].
pub struct TrivyScanner<E: CommandExecutor> {
    executor: E,
    options: TrivyOptions,
}

impl<E: CommandExecutor> TrivyScanner<E> {
    pub fn new(executor: E, options: TrivyOptions) -> Self {
        Self { executor, options }
    }

    fn scan_args(image: &ImageRef) -> Vec<String> {
        ["-q", "image", "-f", "json", image.as_str()]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

#[async_trait]
impl<E: CommandExecutor> VulnerabilityScanner for TrivyScanner<E> {
    async fn scan(
        &self,
        image: &ImageRef,
        token: &CancellationToken,
    ) -> std::result::Result<Vec<ScanResult>, ScanError> {
        let stdout = self
            .executor
            .execute(&self.options.program, &Self::scan_args(image), token)
            .await?;

        let report =
            TrivyReport::parse(&stdout).map_err(|e| ScanError::UnparsableOutput {
                details: e.to_string(),
            })?;

        let results = report.into_scan_results();
        debug!(
            image = %image,
            targets = results.len(),
            findings = results.iter().map(|r| r.findings().len()).sum::<usize>(),
            "Parsed trivy report"
        );
        Ok(results)
    }

    async fn update_database(&self, token: &CancellationToken) -> Result<()> {
        if !self.options.update_database {
            return Ok(());
        }

        info!("Updating trivy vulnerability database");
        let args = ["-q", "image", "--download-db-only"].map(String::from);
        self.executor
            .execute(&self.options.program, &args, token)
            .await
            .context("trivy database download failed")?;
        Ok(())
    }

    async fn clear_cache(&self, token: &CancellationToken) -> Result<()> {
        if !self.options.clear_cache {
            return Ok(());
        }

        debug!("Clearing trivy scan cache");
        let args = ["clean", "--scan-cache"].map(String::from);
        self.executor
            .execute(&self.options.program, &args, token)
            .await
            .context("trivy cache cleanup failed")?;
        Ok(())
    }
}
