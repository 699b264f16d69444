use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};
use hestia_core::schema::{AccountActivate, AccountCreate, AccountItem, AccountSession};
use tracing::info;

use crate::AppState;
use crate::registry::{
    AccountRegistry, DeviceRegistry, MeasurementRegistry, SessionRegistry, Subject,
};

use super::error::ApiError;

pub async fn create_account<A, D, S, M>(
    State(state): State<AppState<A, D, S, M>>,
    payload: Result<Json<AccountCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<AccountItem>), ApiError>
where
    A: AccountRegistry,
    D: DeviceRegistry,
    S: SessionRegistry,
    M: MeasurementRegistry,
{
    let Json(request) = payload?;
    let new_account = request.validate(&state.limits)?;

    let pseudonyms = state.limits.pseudonym_min..=state.limits.pseudonym_max;
    let account = state.accounts.create(new_account, pseudonyms).await?;
    info!(account_id = account.id.0, pseudonym = account.pseudonym, "account created");

    Ok((
        StatusCode::CREATED,
        Json(AccountItem::new(&account, &state.activation_url_base)),
    ))
}

pub async fn activate_account<A, D, S, M>(
    State(state): State<AppState<A, D, S, M>>,
    payload: Result<Json<AccountActivate>, JsonRejection>,
) -> Result<Json<AccountSession>, ApiError>
where
    A: AccountRegistry,
    D: DeviceRegistry,
    S: SessionRegistry,
    M: MeasurementRegistry,
{
    let Json(request) = payload?;
    let token = request.validate()?;

    let account = state.accounts.activate(&token).await?;
    let session_token = state.sessions.issue(Subject::Account(account.id)).await?;
    info!(account_id = account.id.0, "account activated");

    Ok(Json(AccountSession { session_token }))
}
