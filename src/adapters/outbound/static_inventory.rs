use crate::ports::outbound::WorkloadInventory;
use crate::shared::Result;
use crate::vulnerability_collection::domain::ImageRef;
use async_trait::async_trait;

/// StaticInventory adapter returning a fixed image list
///
/// Used when the image set comes from the config file instead of a cluster.
#[derive(Debug, Clone)]
pub struct StaticInventory {
    images: Vec<ImageRef>,
}

impl StaticInventory {
    pub fn new(images: Vec<ImageRef>) -> Self {
        Self { images }
    }
}

#[async_trait]
impl WorkloadInventory for StaticInventory {
    async fn containers(&self) -> Result<Vec<ImageRef>> {
        Ok(self.images.clone())
    }
}
