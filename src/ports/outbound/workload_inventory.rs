use crate::shared::Result;
use crate::vulnerability_collection::domain::ImageRef;
use async_trait::async_trait;
use std::sync::Arc;

/// WorkloadInventory port for enumerating running container images
///
/// This port abstracts the source of workloads (Kubernetes API, a static
/// list, ...). It is called exactly once per collection cycle.
#[async_trait]
pub trait WorkloadInventory: Send + Sync {
    /// Lists the image of every container currently scheduled
    ///
    /// # Returns
    /// Image references in inventory order. Repeats are expected when
    /// several workloads share an image.
    ///
    /// # Errors
    /// Returns an error if the inventory cannot be enumerated. The caller
    /// treats this as fatal for the current cycle.
    async fn containers(&self) -> Result<Vec<ImageRef>>;
}

#[async_trait]
impl<T: WorkloadInventory + ?Sized> WorkloadInventory for Arc<T> {
    async fn containers(&self) -> Result<Vec<ImageRef>> {
        (**self).containers().await
    }
}
