use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode},
};
use hestia_core::{
    AccountId, BoxList, Device, DeviceId, HttpStatus, NormalizedSample,
    schema::{
        DeviceCompleteItem, DeviceCreate, DeviceItem, DeviceItemMeasurementTime, DeviceSession,
        DeviceTypeCompleteItem, DeviceVerify, PropertyCompleteItem,
    },
};
use tracing::{info, warn};

use crate::AppState;
use crate::registry::{
    AccountRegistry, DeviceRegistry, MeasurementFilter, MeasurementRegistry, SessionRegistry,
    Subject,
};

use super::{auth::require_account, error::ApiError};

// Register a device under the calling account
pub async fn create_device<A, D, S, M>(
    State(state): State<AppState<A, D, S, M>>,
    headers: HeaderMap,
    payload: Result<Json<DeviceCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<DeviceCompleteItem>), ApiError>
where
    A: AccountRegistry,
    D: DeviceRegistry,
    S: SessionRegistry,
    M: MeasurementRegistry,
{
    let account_id = require_account(&headers, &state.sessions).await?;
    let Json(request) = payload?;
    let new_device = request.validate()?;

    let device_type = state
        .devices
        .device_type(&new_device.device_type)
        .await?
        .ok_or_else(|| {
            HttpStatus::not_found(format!("unknown device type `{}`", new_device.device_type))
        })?;

    let device = state
        .devices
        .create(account_id, device_type, new_device.activation_token)
        .await?;
    info!(
        device_id = device.id.0,
        account_id = account_id.0,
        device_type = %device.device_type.name,
        "device created"
    );

    Ok((StatusCode::CREATED, Json(DeviceCompleteItem::from(&device))))
}

// Exchange a device activation token for a device session
pub async fn activate_device<A, D, S, M>(
    State(state): State<AppState<A, D, S, M>>,
    payload: Result<Json<DeviceVerify>, JsonRejection>,
) -> Result<Json<DeviceSession>, ApiError>
where
    A: AccountRegistry,
    D: DeviceRegistry,
    S: SessionRegistry,
    M: MeasurementRegistry,
{
    let Json(request) = payload?;
    let token = request.validate()?;

    let device = state.devices.activate(&token).await?;
    let session_token = state.sessions.issue(Subject::Device(device.id)).await?;
    info!(device_id = device.id.0, "device activated");

    Ok(Json(DeviceSession { session_token }))
}

// Get a device owned by the calling account
pub async fn get_device<A, D, S, M>(
    State(state): State<AppState<A, D, S, M>>,
    headers: HeaderMap,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<DeviceItemMeasurementTime>, ApiError>
where
    A: AccountRegistry,
    D: DeviceRegistry,
    S: SessionRegistry,
    M: MeasurementRegistry,
{
    let account_id = require_account(&headers, &state.sessions).await?;
    let Path(id) = id?;
    let device = owned_device(&state.devices, account_id, DeviceId(id)).await?;

    let latest_measurement_timestamp = state.measurements.latest_timestamp(device.id).await?;

    Ok(Json(DeviceItemMeasurementTime {
        device: (&device).into(),
        latest_measurement_timestamp,
    }))
}

// List every device of the calling account
pub async fn list_devices<A, D, S, M>(
    State(state): State<AppState<A, D, S, M>>,
    headers: HeaderMap,
) -> Result<Json<Vec<DeviceItem>>, ApiError>
where
    A: AccountRegistry,
    D: DeviceRegistry,
    S: SessionRegistry,
    M: MeasurementRegistry,
{
    let account_id = require_account(&headers, &state.sessions).await?;
    let devices = state.devices.by_account(account_id).await?;

    Ok(Json(devices.iter().map(DeviceItem::from).collect()))
}

// Stored measurements of a device, optionally narrowed by property and time
pub async fn get_device_measurements<A, D, S, M>(
    State(state): State<AppState<A, D, S, M>>,
    headers: HeaderMap,
    id: Result<Path<u64>, PathRejection>,
    filter: Result<Query<MeasurementFilter>, QueryRejection>,
) -> Result<Json<BoxList<NormalizedSample>>, ApiError>
where
    A: AccountRegistry,
    D: DeviceRegistry,
    S: SessionRegistry,
    M: MeasurementRegistry,
{
    let account_id = require_account(&headers, &state.sessions).await?;
    let Path(id) = id?;
    let Query(filter) = filter?;
    let device = owned_device(&state.devices, account_id, DeviceId(id)).await?;

    let samples = state.measurements.samples(device.id, &filter).await?;
    info!(device_id = id, returned = samples.len(), "measurements read");

    Ok(Json(samples))
}

// Properties the device has reported measurements for
pub async fn get_device_properties<A, D, S, M>(
    State(state): State<AppState<A, D, S, M>>,
    headers: HeaderMap,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<Vec<PropertyCompleteItem>>, ApiError>
where
    A: AccountRegistry,
    D: DeviceRegistry,
    S: SessionRegistry,
    M: MeasurementRegistry,
{
    let account_id = require_account(&headers, &state.sessions).await?;
    let Path(id) = id?;
    let device = owned_device(&state.devices, account_id, DeviceId(id)).await?;

    let names = state.measurements.property_names(device.id).await?;
    let properties = names
        .iter()
        .filter_map(|name| device.device_type.property(name))
        .map(PropertyCompleteItem::from)
        .collect();

    Ok(Json(properties))
}

/// Loads a device, refusing it to accounts other than its owner.
async fn owned_device<D: DeviceRegistry>(
    devices: &D,
    account_id: AccountId,
    device_id: DeviceId,
) -> Result<Device, ApiError> {
    let device = devices
        .get(device_id)
        .await?
        .ok_or_else(|| HttpStatus::not_found("device not found"))?;

    if device.account_id != account_id {
        warn!(
            device_id = device_id.0,
            account_id = account_id.0,
            "device requested by an account that does not own it"
        );
        return Err(HttpStatus::forbidden("device belongs to another account").into());
    }

    Ok(device)
}

// Get a device type and its properties by name
pub async fn get_device_type<A, D, S, M>(
    State(state): State<AppState<A, D, S, M>>,
    Path(name): Path<String>,
) -> Result<Json<DeviceTypeCompleteItem>, ApiError>
where
    A: AccountRegistry,
    D: DeviceRegistry,
    S: SessionRegistry,
    M: MeasurementRegistry,
{
    let device_type = state
        .devices
        .device_type(&name)
        .await?
        .ok_or_else(|| HttpStatus::not_found(format!("unknown device type `{name}`")))?;

    Ok(Json(DeviceTypeCompleteItem::from(&device_type)))
}
