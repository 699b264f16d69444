use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};
use hestia_core::{
    DeviceId, HttpStatus, MeasurementsUpload, MeasurementsUploadFixed, MeasurementsUploadResult,
    MeasurementsUploadVariable, PropertySet, validate_upload,
};
use tracing::{info, warn};

use crate::AppState;
use crate::registry::{AccountRegistry, DeviceRegistry, MeasurementRegistry, SessionRegistry};

use super::{auth::require_device, error::ApiError};

pub async fn upload_fixed<A, D, S, M>(
    State(state): State<AppState<A, D, S, M>>,
    headers: HeaderMap,
    payload: Result<Json<MeasurementsUploadFixed>, JsonRejection>,
) -> Result<(StatusCode, Json<MeasurementsUploadResult>), ApiError>
where
    A: AccountRegistry,
    D: DeviceRegistry,
    S: SessionRegistry,
    M: MeasurementRegistry,
{
    let device_id = require_device(&headers, &state.sessions).await?;
    let Json(upload) = payload?;
    store_upload(&state, device_id, upload.into()).await
}

pub async fn upload_variable<A, D, S, M>(
    State(state): State<AppState<A, D, S, M>>,
    headers: HeaderMap,
    payload: Result<Json<MeasurementsUploadVariable>, JsonRejection>,
) -> Result<(StatusCode, Json<MeasurementsUploadResult>), ApiError>
where
    A: AccountRegistry,
    D: DeviceRegistry,
    S: SessionRegistry,
    M: MeasurementRegistry,
{
    let device_id = require_device(&headers, &state.sessions).await?;
    let Json(upload) = payload?;
    store_upload(&state, device_id, upload.into()).await
}

/// Validates the whole envelope against the device's type, then stores it in one call.
async fn store_upload<A, D, S, M>(
    state: &AppState<A, D, S, M>,
    device_id: DeviceId,
    upload: MeasurementsUpload,
) -> Result<(StatusCode, Json<MeasurementsUploadResult>), ApiError>
where
    A: AccountRegistry,
    D: DeviceRegistry,
    S: SessionRegistry,
    M: MeasurementRegistry,
{
    let device = state
        .devices
        .get(device_id)
        .await?
        .ok_or_else(|| HttpStatus::not_found("device not found"))?;

    let properties = PropertySet::from(&device.device_type);
    let batch = match validate_upload(upload, &properties) {
        Ok(batch) => batch,
        Err(err) => {
            warn!(device_id = device_id.0, error = %err, "measurements rejected");
            return Err(err.into());
        }
    };

    let size = state.measurements.store(device_id, batch).await?;
    info!(device_id = device_id.0, size, "measurements stored");

    Ok((
        StatusCode::CREATED,
        Json(MeasurementsUploadResult::committed(size)),
    ))
}
