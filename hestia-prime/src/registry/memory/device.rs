use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use async_trait::async_trait;
use hestia_core::{
    AccountId, BoxStr, Device, DeviceId, DeviceType, DeviceTypeId, Property, PropertyId,
    schema::ActivationToken,
};
use tokio::sync::RwLock;

use crate::registry::{DeviceRegistry, NewDeviceType, RegistryError};

#[derive(Default)]
pub(super) struct Devices {
    pub(super) types: HashMap<BoxStr, DeviceType>,
    pub(super) devices: HashMap<DeviceId, Device>,
    next_property_id: u64,
}

#[derive(Clone, Default)]
pub struct InMemoryDeviceRegistry {
    pub(super) inner: Arc<RwLock<Devices>>,
}

impl InMemoryDeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeviceRegistry for InMemoryDeviceRegistry {
    async fn register_type(&self, device_type: NewDeviceType) -> Result<DeviceType, RegistryError> {
        let mut inner = self.inner.write().await;

        if inner.types.contains_key(device_type.name.as_str()) {
            return Err(RegistryError::Duplicate);
        }

        let unique_names = {
            let mut names = HashSet::new();
            device_type.properties.iter().all(|p| names.insert(p.name.as_str()))
        };
        if !unique_names {
            return Err(RegistryError::Duplicate);
        }

        let first_property = inner.next_property_id;
        inner.next_property_id += device_type.properties.len() as u64;

        let registered = DeviceType {
            id: DeviceTypeId(inner.types.len() as u64 + 1),
            name: device_type.name.into_boxed_str(),
            installation_manual_url: device_type.installation_manual_url.into_boxed_str(),
            properties: device_type
                .properties
                .into_iter()
                .zip(first_property + 1..)
                .map(|(p, id)| Property {
                    id: PropertyId(id),
                    name: p.name.into_boxed_str(),
                    unit: p.unit.map(String::into_boxed_str),
                })
                .collect(),
        };
        inner
            .types
            .insert(registered.name.clone(), registered.clone());

        Ok(registered)
    }

    async fn device_type(&self, name: &str) -> Result<Option<DeviceType>, RegistryError> {
        let inner = self.inner.read().await;
        Ok(inner.types.get(name).cloned())
    }

    async fn create(
        &self,
        account_id: AccountId,
        device_type: DeviceType,
        activation_token: ActivationToken,
    ) -> Result<Device, RegistryError> {
        let mut inner = self.inner.write().await;

        // The token is how the device finds itself again on activation.
        if inner
            .devices
            .values()
            .any(|d| &*d.activation_token == activation_token.as_str())
        {
            return Err(RegistryError::Duplicate);
        }

        let id = DeviceId(inner.devices.len() as u64 + 1);
        let device = Device {
            id,
            account_id,
            device_type,
            activation_token: activation_token.as_str().into(),
            created_on: jiff::Timestamp::now(),
            activated_on: None,
        };
        inner.devices.insert(id, device.clone());

        Ok(device)
    }

    async fn activate(&self, token: &ActivationToken) -> Result<Device, RegistryError> {
        let mut inner = self.inner.write().await;

        let device = inner
            .devices
            .values_mut()
            .find(|d| &*d.activation_token == token.as_str())
            .ok_or(RegistryError::InvalidActivationToken)?;

        if device.activated_on.is_none() {
            device.activated_on = Some(jiff::Timestamp::now());
        }

        Ok(device.clone())
    }

    async fn get(&self, id: DeviceId) -> Result<Option<Device>, RegistryError> {
        let inner = self.inner.read().await;
        Ok(inner.devices.get(&id).cloned())
    }

    async fn by_account(&self, account_id: AccountId) -> Result<Vec<Device>, RegistryError> {
        let inner = self.inner.read().await;
        let mut devices: Vec<Device> = inner
            .devices
            .values()
            .filter(|d| d.account_id == account_id)
            .cloned()
            .collect();
        devices.sort_by_key(|d| d.id.0);
        Ok(devices)
    }
}
