use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{ActivationToken, FieldViolation, ValidationResult, ViolationKind, Violations};
use crate::{BoxList, BoxStr, Device, DeviceId, DeviceType, DeviceTypeId, Property, PropertyId};

/// Request from an account to register a new device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceCreate {
    /// Name of the device type.
    pub device_type: String,
    pub device_activation_token: String,
}

/// A validated [`DeviceCreate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDevice {
    pub device_type: BoxStr,
    pub activation_token: ActivationToken,
}

impl DeviceCreate {
    pub fn validate(self) -> ValidationResult<NewDevice> {
        let mut violations = Violations::default();

        let device_type = self.device_type.trim();
        if device_type.is_empty() {
            violations.push(FieldViolation::new("device_type", ViolationKind::Empty));
        }

        let token = violations.check(ActivationToken::parse(
            "device_activation_token",
            &self.device_activation_token,
        ));

        match token {
            Some(activation_token) if violations.is_empty() => Ok(NewDevice {
                device_type: device_type.into(),
                activation_token,
            }),
            _ => Err(violations.into_error()),
        }
    }
}

/// Request from a device proving it holds its activation token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceVerify {
    pub device_activation_token: String,
}

impl DeviceVerify {
    pub fn validate(self) -> ValidationResult<ActivationToken> {
        Ok(ActivationToken::parse(
            "device_activation_token",
            &self.device_activation_token,
        )?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceTypeItem {
    pub name: BoxStr,
    pub installation_manual_url: BoxStr,
}

impl From<&DeviceType> for DeviceTypeItem {
    fn from(device_type: &DeviceType) -> Self {
        Self {
            name: device_type.name.clone(),
            installation_manual_url: device_type.installation_manual_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyCompleteItem {
    pub id: PropertyId,
    pub name: BoxStr,
    pub unit: Option<BoxStr>,
}

impl From<&Property> for PropertyCompleteItem {
    fn from(property: &Property) -> Self {
        Self {
            id: property.id,
            name: property.name.clone(),
            unit: property.unit.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceTypeCompleteItem {
    pub id: DeviceTypeId,
    pub name: BoxStr,
    pub installation_manual_url: BoxStr,
    pub properties: BoxList<PropertyCompleteItem>,
}

impl From<&DeviceType> for DeviceTypeCompleteItem {
    fn from(device_type: &DeviceType) -> Self {
        Self {
            id: device_type.id,
            name: device_type.name.clone(),
            installation_manual_url: device_type.installation_manual_url.clone(),
            properties: device_type.properties.iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceItem {
    pub id: DeviceId,
    pub device_type: DeviceTypeItem,
    pub created_on: Timestamp,
    pub activated_on: Option<Timestamp>,
}

impl From<&Device> for DeviceItem {
    fn from(device: &Device) -> Self {
        Self {
            id: device.id,
            device_type: (&device.device_type).into(),
            created_on: device.created_on,
            activated_on: device.activated_on,
        }
    }
}

/// A device together with the time of its most recent measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceItemMeasurementTime {
    #[serde(flatten)]
    pub device: DeviceItem,
    pub latest_measurement_timestamp: Option<Timestamp>,
}

/// Everything the owner needs to provision a device, including its token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCompleteItem {
    pub id: DeviceId,
    pub device_type: DeviceTypeCompleteItem,
    pub device_activation_token: BoxStr,
    pub created_on: Timestamp,
    pub activated_on: Option<Timestamp>,
}

impl From<&Device> for DeviceCompleteItem {
    fn from(device: &Device) -> Self {
        Self {
            id: device.id,
            device_type: (&device.device_type).into(),
            device_activation_token: device.activation_token.clone(),
            created_on: device.created_on,
            activated_on: device.activated_on,
        }
    }
}
