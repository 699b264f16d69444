use std::collections::{HashMap, HashSet};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    BoxList, BoxStr, DeviceType, Property,
    measurement::{PropertyMeasurements, PropertyMeasurementsFixed, PropertyMeasurementsVariable},
    schema::{ValidationError, ValidationResult},
};

/// Upload envelope in which every property uses the fixed-interval encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementsUploadFixed {
    /// Submission time as reported by the client.
    pub upload_time: Timestamp,
    pub property_measurements: BoxList<PropertyMeasurementsFixed>,
}

/// Upload envelope in which every property carries explicit timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementsUploadVariable {
    /// Submission time as reported by the client.
    pub upload_time: Timestamp,
    pub property_measurements: BoxList<PropertyMeasurementsVariable>,
}

/// Either upload envelope, as seen by the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementsUpload {
    pub upload_time: Timestamp,
    pub property_measurements: BoxList<PropertyMeasurements>,
}

impl From<MeasurementsUploadFixed> for MeasurementsUpload {
    fn from(upload: MeasurementsUploadFixed) -> Self {
        Self {
            upload_time: upload.upload_time,
            property_measurements: upload
                .property_measurements
                .into_vec()
                .into_iter()
                .map(PropertyMeasurements::Fixed)
                .collect(),
        }
    }
}

impl From<MeasurementsUploadVariable> for MeasurementsUpload {
    fn from(upload: MeasurementsUploadVariable) -> Self {
        Self {
            upload_time: upload.upload_time,
            property_measurements: upload
                .property_measurements
                .into_vec()
                .into_iter()
                .map(PropertyMeasurements::Variable)
                .collect(),
        }
    }
}

/// Properties of the uploading device's type, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct PropertySet(HashMap<BoxStr, Property>);

impl PropertySet {
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Property> for PropertySet {
    fn from_iter<I: IntoIterator<Item = Property>>(iter: I) -> Self {
        Self(iter.into_iter().map(|p| (p.name.clone(), p)).collect())
    }
}

impl From<&DeviceType> for PropertySet {
    fn from(device_type: &DeviceType) -> Self {
        device_type.properties.iter().cloned().collect()
    }
}

/// One sample of a normalized batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedSample {
    pub property_name: BoxStr,
    pub timestamp: Timestamp,
    pub value: BoxStr,
}

/// Validated upload flattened to `(property_name, timestamp, value)` triples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedBatch {
    pub upload_time: Timestamp,
    /// Samples grouped by property in upload order, each group in series order.
    pub samples: BoxList<NormalizedSample>,
}

impl NormalizedBatch {
    pub fn size(&self) -> usize {
        self.samples.len()
    }

    /// Latest sample time in the batch, regardless of property.
    pub fn latest_timestamp(&self) -> Option<Timestamp> {
        self.samples.iter().map(|s| s.timestamp).max()
    }
}

/// Checks an upload against the device's properties and flattens it.
///
/// The first problem found rejects the whole upload; nothing is partially
/// accepted.
pub fn validate_upload(
    upload: impl Into<MeasurementsUpload>,
    properties: &PropertySet,
) -> ValidationResult<NormalizedBatch> {
    let upload = upload.into();

    if upload.property_measurements.is_empty() {
        return Err(ValidationError::EmptyUpload);
    }

    let mut seen = HashSet::with_capacity(upload.property_measurements.len());
    for block in &upload.property_measurements {
        let name = block.property_name();

        if properties.get(name).is_none() {
            return Err(ValidationError::UnknownProperty {
                property: name.into(),
            });
        }

        if !seen.insert(name) {
            return Err(ValidationError::DuplicateProperty {
                property: name.into(),
            });
        }
    }

    let mut samples = Vec::new();
    for block in upload.property_measurements.into_vec() {
        let property_name: BoxStr = block.property_name().into();
        let values = block.normalize()?;

        samples.extend(values.into_vec().into_iter().map(|v| NormalizedSample {
            property_name: property_name.clone(),
            timestamp: v.timestamp,
            value: v.value,
        }));
    }

    Ok(NormalizedBatch {
        upload_time: upload.upload_time,
        samples: samples.into_boxed_slice(),
    })
}

/// Receipt returned once a batch has been stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementsUploadResult {
    /// Server clock when the store acknowledged the batch.
    pub server_time: Timestamp,
    /// Number of samples stored.
    pub size: usize,
}

impl MeasurementsUploadResult {
    /// Stamps the receipt with the current time; call after the write succeeded.
    pub fn committed(size: usize) -> Self {
        Self {
            server_time: Timestamp::now(),
            size,
        }
    }
}
