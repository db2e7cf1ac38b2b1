//! Inventory fetcher. Lists every device the discoverer should publish.

use std::sync::Arc;

use packet_sd_client::{Device, InventoryApi};
use packet_sd_metrics::SdMetrics;
use tracing::debug;

use crate::error::FetchError;

/// Lists devices from the inventory API, recording latency and failures
/// for every call.
///
/// There are no retries here: a failure is returned immediately and the
/// discoverer tries again on its next tick.
pub struct Fetcher {
    api: Arc<dyn InventoryApi>,
    metrics: SdMetrics,
    /// `None` lists the devices of every accessible project.
    project_id: Option<String>,
}

impl Fetcher {
    pub fn new(api: Arc<dyn InventoryApi>, metrics: SdMetrics, project_id: Option<String>) -> Self {
        let project_id = project_id.filter(|id| !id.trim().is_empty());
        Self {
            api,
            metrics,
            project_id,
        }
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    /// Fetch the full inventory.
    ///
    /// Any failed call aborts the fetch; devices gathered from earlier
    /// projects are discarded.
    pub async fn fetch(&self) -> Result<Vec<Device>, FetchError> {
        let devices = match &self.project_id {
            Some(project_id) => self.list_devices(project_id).await?,
            None => {
                let projects = self
                    .metrics
                    .track(self.api.list_projects())
                    .await
                    .map_err(FetchError::ListProjects)?;

                let mut devices = Vec::new();
                for project in &projects {
                    devices.extend(self.list_devices(&project.id).await?);
                }
                devices
            }
        };

        debug!(nb = devices.len(), "get devices");
        Ok(devices)
    }

    async fn list_devices(&self, project_id: &str) -> Result<Vec<Device>, FetchError> {
        self.metrics
            .track(self.api.list_devices(project_id))
            .await
            .map_err(|source| FetchError::ListDevices {
                project_id: project_id.to_string(),
                source,
            })
    }
}
