pub mod memory;

use async_trait::async_trait;
use hestia_core::{
    Account, AccountId, BoxList, BoxStr, Device, DeviceId, DeviceType, NormalizedBatch,
    NormalizedSample,
    schema::{ActivationToken, NewAccount, SessionToken},
};
use jiff::Timestamp;
use serde::Deserialize;
use std::ops::RangeInclusive;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("not found")]
    NotFound,
    #[error("already exists")]
    Duplicate,
    #[error("activation token does not match")]
    InvalidActivationToken,
    #[error("no free pseudonym left in {min}..={max}")]
    PseudonymsExhausted { min: i64, max: i64 },
}

/// Device type definition as supplied by configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewDeviceType {
    pub name: String,
    pub installation_manual_url: String,
    #[serde(default)]
    pub properties: Vec<NewProperty>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewProperty {
    pub name: String,
    pub unit: Option<String>,
}

/// Narrows a device's stored samples. Bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MeasurementFilter {
    pub property: Option<String>,
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
}

impl MeasurementFilter {
    pub fn matches(&self, sample: &NormalizedSample) -> bool {
        self.property
            .as_deref()
            .is_none_or(|name| &*sample.property_name == name)
            && self.start.is_none_or(|start| sample.timestamp >= start)
            && self.end.is_none_or(|end| sample.timestamp <= end)
    }
}

/// Who a session token was issued to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    Account(AccountId),
    Device(DeviceId),
}

#[async_trait]
pub trait AccountRegistry: Clone + Send + Sync + 'static {
    /// Stores a new account under a freshly generated activation token.
    /// Without a pseudonym a free one is drawn from `pseudonyms`.
    async fn create(
        &self,
        account: NewAccount,
        pseudonyms: RangeInclusive<i64>,
    ) -> Result<Account, RegistryError>;

    /// Marks the account holding `token` as activated and returns it.
    async fn activate(&self, token: &ActivationToken) -> Result<Account, RegistryError>;

    async fn get(&self, id: AccountId) -> Result<Option<Account>, RegistryError>;
}

#[async_trait]
pub trait DeviceRegistry: Clone + Send + Sync + 'static {
    async fn register_type(&self, device_type: NewDeviceType) -> Result<DeviceType, RegistryError>;

    async fn device_type(&self, name: &str) -> Result<Option<DeviceType>, RegistryError>;

    async fn create(
        &self,
        account_id: AccountId,
        device_type: DeviceType,
        activation_token: ActivationToken,
    ) -> Result<Device, RegistryError>;

    /// Marks the device holding `token` as activated and returns it.
    async fn activate(&self, token: &ActivationToken) -> Result<Device, RegistryError>;

    async fn get(&self, id: DeviceId) -> Result<Option<Device>, RegistryError>;

    /// Devices owned by `account_id`, oldest first.
    async fn by_account(&self, account_id: AccountId) -> Result<Vec<Device>, RegistryError>;
}

#[async_trait]
pub trait SessionRegistry: Clone + Send + Sync + 'static {
    async fn issue(&self, subject: Subject) -> Result<SessionToken, RegistryError>;

    async fn resolve(&self, token: &SessionToken) -> Result<Option<Subject>, RegistryError>;
}

#[async_trait]
pub trait MeasurementRegistry: Clone + Send + Sync + 'static {
    /// Persists the whole batch and returns how many samples were written.
    async fn store(&self, device_id: DeviceId, batch: NormalizedBatch) -> Result<usize, RegistryError>;

    async fn latest_timestamp(&self, device_id: DeviceId) -> Result<Option<Timestamp>, RegistryError>;

    /// Stored samples matching `filter`, in commit order.
    async fn samples(
        &self,
        device_id: DeviceId,
        filter: &MeasurementFilter,
    ) -> Result<BoxList<NormalizedSample>, RegistryError>;

    /// Names of the properties the device has stored samples for.
    async fn property_names(&self, device_id: DeviceId) -> Result<Vec<BoxStr>, RegistryError>;
}

/// Random alphanumeric string used for activation and session tokens.
pub fn random_token(len: usize) -> BoxStr {
    use rand::{Rng, distr::Alphanumeric};

    rand::rng()
        .sample_iter(Alphanumeric)
        .take(len)
        .map(char::from)
        .collect::<String>()
        .into_boxed_str()
}
