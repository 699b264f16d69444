pub mod accounts;
pub mod auth;
pub mod devices;
pub mod error;
pub mod measurements;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::registry::{AccountRegistry, DeviceRegistry, MeasurementRegistry, SessionRegistry};

pub fn router<A, D, S, M>() -> Router<AppState<A, D, S, M>>
where
    A: AccountRegistry,
    D: DeviceRegistry,
    S: SessionRegistry,
    M: MeasurementRegistry,
{
    Router::new()
        .route("/health", get(health_handler))
        // Account routes
        .route("/account", post(accounts::create_account))
        .route("/account/activate", post(accounts::activate_account))
        // Device routes
        .route("/device", post(devices::create_device))
        .route("/device/activate", post(devices::activate_device))
        .route("/device/all", get(devices::list_devices))
        .route("/device/{id}", get(devices::get_device))
        .route(
            "/device/{id}/measurements",
            get(devices::get_device_measurements),
        )
        .route(
            "/device/{id}/properties",
            get(devices::get_device_properties),
        )
        .route("/device_type/{name}", get(devices::get_device_type))
        // Measurement routes
        .route(
            "/device/measurements/fixed",
            post(measurements::upload_fixed),
        )
        .route(
            "/device/measurements/variable",
            post(measurements::upload_variable),
        )
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http",
                    method = %req.method(),
                    uri = %req.uri(),
                )
            }),
        )
}

async fn health_handler() -> &'static str {
    "OK"
}
