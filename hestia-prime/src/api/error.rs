use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hestia_core::{HttpStatus, ValidationError};
use serde_json::json;

use crate::registry::RegistryError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Status(#[from] HttpStatus),
    #[error("internal server error: {0}")]
    Internal(RegistryError),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Status(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Status(HttpStatus::bad_request(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Status(HttpStatus::bad_request(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Status(HttpStatus::bad_request(rejection.body_text()))
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound => ApiError::Status(HttpStatus::not_found(err.to_string())),
            RegistryError::Duplicate => ApiError::Status(HttpStatus::bad_request(err.to_string())),
            RegistryError::InvalidActivationToken => {
                ApiError::Status(HttpStatus::forbidden(err.to_string()))
            }
            RegistryError::PseudonymsExhausted { .. } => ApiError::Internal(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Status(status) => {
                let code = StatusCode::from_u16(status.code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (code, Json(status)).into_response()
            }
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_errors_map_to_status() {
        let cases = [
            (RegistryError::NotFound, StatusCode::NOT_FOUND),
            (RegistryError::Duplicate, StatusCode::BAD_REQUEST),
            (RegistryError::InvalidActivationToken, StatusCode::FORBIDDEN),
            (
                RegistryError::PseudonymsExhausted { min: 1, max: 2 },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn validation_errors_are_bad_requests() {
        let response = ApiError::from(ValidationError::EmptyUpload).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
