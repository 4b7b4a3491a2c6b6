use crate::ports::outbound::{CommandExecutor, WorkloadInventory};
use crate::shared::Result;
use crate::vulnerability_collection::domain::ImageRef;
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Workload kinds whose pod templates are inspected
const WORKLOAD_KINDS: &str = "deployments,statefulsets,daemonsets";

/// KubectlInventory adapter listing workload images through `kubectl`
///
/// Reads Deployments, StatefulSets and DaemonSets in one `kubectl get` call
/// and returns the image of every container in their pod templates. Cluster
/// credentials are whatever `kubectl` resolves (in-cluster service account
/// or kubeconfig).
pub struct KubectlInventory<E: CommandExecutor> {
    executor: E,
    program: String,
    namespace: Option<String>,
}

impl<E: CommandExecutor> KubectlInventory<E> {
    /// Creates an inventory
    ///
    /// # Arguments
    /// * `executor` - Runs the kubectl process
    /// * `program` - kubectl executable
    /// * `namespace` - Restricts the listing to one namespace; all namespaces when `None`
    pub fn new(executor: E, program: impl Into<String>, namespace: Option<String>) -> Self {
        Self {
            executor,
            program: program.into(),
            namespace,
        }
    }

    fn args(&self) -> Vec<String> {
        let mut args = vec![
            "get".to_string(),
            WORKLOAD_KINDS.to_string(),
            "-o".to_string(),
            "json".to_string(),
        ];
        match &self.namespace {
            Some(ns) => {
                args.push("-n".to_string());
                args.push(ns.clone());
            }
            None => args.push("--all-namespaces".to_string()),
        }
        args
    }
}

#[async_trait]
impl<E: CommandExecutor> WorkloadInventory for KubectlInventory<E> {
    async fn containers(&self) -> Result<Vec<ImageRef>> {
        // Listing is short-lived; shutdown does not interrupt it.
        let token = CancellationToken::new();
        let stdout = self
            .executor
            .execute(&self.program, &self.args(), &token)
            .await
            .context("could not list workloads")?;

        let images = parse_workload_list(&stdout)?;
        debug!(containers = images.len(), "Listed workload containers");
        Ok(images)
    }
}

#[derive(Debug, Deserialize)]
struct WorkloadList {
    #[serde(default)]
    items: Vec<Workload>,
}

#[derive(Debug, Deserialize)]
struct Workload {
    spec: WorkloadSpec,
}

#[derive(Debug, Deserialize)]
struct WorkloadSpec {
    template: PodTemplate,
}

#[derive(Debug, Deserialize)]
struct PodTemplate {
    spec: PodSpec,
}

#[derive(Debug, Deserialize)]
struct PodSpec {
    #[serde(default)]
    containers: Vec<Container>,
}

#[derive(Debug, Deserialize)]
struct Container {
    #[serde(default)]
    image: String,
}

fn parse_workload_list(bytes: &[u8]) -> Result<Vec<ImageRef>> {
    let list: WorkloadList =
        serde_json::from_slice(bytes).context("could not parse kubectl output")?;

    Ok(list
        .items
        .into_iter()
        .flat_map(|w| w.spec.template.spec.containers)
        .map(|c| ImageRef::new(c.image))
        .collect())
}
