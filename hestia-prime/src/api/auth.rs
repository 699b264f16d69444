use axum::http::{HeaderMap, header};
use hestia_core::{AccountId, DeviceId, HttpStatus, schema::SessionToken};

use crate::registry::{SessionRegistry, Subject};

use super::error::ApiError;

/// Reads the bearer token and resolves it to the subject it was issued to.
pub async fn authenticate<S: SessionRegistry>(
    headers: &HeaderMap,
    sessions: &S,
) -> Result<Subject, ApiError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| HttpStatus::unauthorized("missing authorization header"))?;
    let auth_str = auth_header
        .to_str()
        .map_err(|_| HttpStatus::unauthorized("invalid authorization header"))?;
    let raw = auth_str
        .strip_prefix("Bearer ")
        .or_else(|| auth_str.strip_prefix("bearer "))
        .map(str::trim)
        .ok_or_else(|| HttpStatus::unauthorized("invalid bearer token"))?;
    let token =
        SessionToken::parse(raw).map_err(|_| HttpStatus::unauthorized("invalid bearer token"))?;

    match sessions.resolve(&token).await? {
        Some(subject) => Ok(subject),
        None => {
            tracing::warn!("unknown session token presented");
            Err(HttpStatus::unauthorized("unknown session token").into())
        }
    }
}

pub async fn require_account<S: SessionRegistry>(
    headers: &HeaderMap,
    sessions: &S,
) -> Result<AccountId, ApiError> {
    match authenticate(headers, sessions).await? {
        Subject::Account(id) => Ok(id),
        Subject::Device(_) => Err(HttpStatus::forbidden("account session required").into()),
    }
}

pub async fn require_device<S: SessionRegistry>(
    headers: &HeaderMap,
    sessions: &S,
) -> Result<DeviceId, ApiError> {
    match authenticate(headers, sessions).await? {
        Subject::Device(id) => Ok(id),
        Subject::Account(_) => Err(HttpStatus::forbidden("device session required").into()),
    }
}
