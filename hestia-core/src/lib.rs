pub mod measurement;
pub mod schema;
pub mod status;
pub mod upload;

use serde::{Deserialize, Serialize};

pub use measurement::{
    MeasurementValue, PropertyMeasurements, PropertyMeasurementsFixed,
    PropertyMeasurementsVariable, TimestampType,
};
pub use schema::{FieldViolation, SchemaLimits, ValidationError, ValidationResult, ViolationKind};
pub use status::HttpStatus;
pub use upload::{
    MeasurementsUpload, MeasurementsUploadFixed, MeasurementsUploadResult,
    MeasurementsUploadVariable, NormalizedBatch, NormalizedSample, PropertySet, validate_upload,
};

// We use `Box<str>` and `Box<[T]>` for structures that don't need to be
// dynamically sized. This helps us keep allocations compact and avoid
// accidental cloning of large values.
pub type BoxStr = Box<str>;
pub type BoxList<T> = Box<[T]>;

/// Unique identifier for a participant account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub u64);

/// Unique identifier for a registered device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub u64);

/// Unique identifier for a device type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceTypeId(pub u64);

/// Unique identifier for a property of a device type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(pub u64);

/// A sensor channel exposed by a device type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    /// Name, unique within the owning device type.
    pub name: BoxStr,
    /// Unit of the measured quantity, if it has one.
    pub unit: Option<BoxStr>,
}

/// Reference data describing a kind of device and the properties it reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceType {
    pub id: DeviceTypeId,
    /// Human-readable name.
    pub name: BoxStr,
    /// Where installers can find instructions for this device type.
    pub installation_manual_url: BoxStr,
    /// Properties in declaration order.
    pub properties: BoxList<Property>,
}

impl DeviceType {
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| &*p.name == name)
    }
}

/// Longitude/latitude pair of a participant's building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub longitude: schema::FixedDecimal,
    pub latitude: schema::FixedDecimal,
}

/// A participant account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub pseudonym: i64,
    pub activation_token: BoxStr,
    pub location: Option<Location>,
    /// Set once the participant has activated the account.
    pub activated_at: Option<jiff::Timestamp>,
}

/// A device owned by an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub account_id: AccountId,
    pub device_type: DeviceType,
    pub activation_token: BoxStr,
    pub created_on: jiff::Timestamp,
    /// Set once the device has proven possession of its activation token.
    pub activated_on: Option<jiff::Timestamp>,
}
