use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use hestia_core::{BoxList, BoxStr, DeviceId, NormalizedBatch, NormalizedSample};
use jiff::Timestamp;
use tokio::sync::RwLock;

use crate::registry::{MeasurementFilter, MeasurementRegistry, RegistryError};

/// Accepted uploads per device, in commit order.
#[derive(Clone, Default)]
pub struct InMemoryMeasurementRegistry {
    uploads: Arc<RwLock<HashMap<DeviceId, Vec<NormalizedBatch>>>>,
}

impl InMemoryMeasurementRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MeasurementRegistry for InMemoryMeasurementRegistry {
    async fn store(&self, device_id: DeviceId, batch: NormalizedBatch) -> Result<usize, RegistryError> {
        let size = batch.size();
        let mut uploads = self.uploads.write().await;
        uploads.entry(device_id).or_default().push(batch);
        Ok(size)
    }

    async fn latest_timestamp(&self, device_id: DeviceId) -> Result<Option<Timestamp>, RegistryError> {
        let uploads = self.uploads.read().await;
        Ok(uploads
            .get(&device_id)
            .into_iter()
            .flatten()
            .filter_map(NormalizedBatch::latest_timestamp)
            .max())
    }

    async fn samples(
        &self,
        device_id: DeviceId,
        filter: &MeasurementFilter,
    ) -> Result<BoxList<NormalizedSample>, RegistryError> {
        let uploads = self.uploads.read().await;
        Ok(uploads
            .get(&device_id)
            .into_iter()
            .flatten()
            .flat_map(|batch| batch.samples.iter())
            .filter(|sample| filter.matches(sample))
            .cloned()
            .collect())
    }

    async fn property_names(&self, device_id: DeviceId) -> Result<Vec<BoxStr>, RegistryError> {
        let uploads = self.uploads.read().await;
        let mut names: Vec<BoxStr> = Vec::new();
        for sample in uploads.get(&device_id).into_iter().flatten().flat_map(|b| b.samples.iter()) {
            if !names.contains(&sample.property_name) {
                names.push(sample.property_name.clone());
            }
        }
        Ok(names)
    }
}
