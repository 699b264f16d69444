use serde::{Serialize, Serializer, ser::SerializeStruct};

use crate::{BoxStr, schema::ValidationError};

/// Error shapes returned at the service boundary.
///
/// Every variant has a fixed status code; only the detail differs per
/// instance. Serializes as `{"detail": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HttpStatus {
    #[error("bad request: {detail}")]
    BadRequest { detail: BoxStr },
    #[error("unauthorized: {detail}")]
    Unauthorized { detail: BoxStr },
    #[error("forbidden: {detail}")]
    Forbidden { detail: BoxStr },
    #[error("not found: {detail}")]
    NotFound { detail: BoxStr },
}

impl HttpStatus {
    pub fn bad_request(detail: impl Into<BoxStr>) -> Self {
        HttpStatus::BadRequest {
            detail: detail.into(),
        }
    }

    pub fn unauthorized(detail: impl Into<BoxStr>) -> Self {
        HttpStatus::Unauthorized {
            detail: detail.into(),
        }
    }

    pub fn forbidden(detail: impl Into<BoxStr>) -> Self {
        HttpStatus::Forbidden {
            detail: detail.into(),
        }
    }

    pub fn not_found(detail: impl Into<BoxStr>) -> Self {
        HttpStatus::NotFound {
            detail: detail.into(),
        }
    }

    pub const fn code(&self) -> u16 {
        match self {
            HttpStatus::BadRequest { .. } => 400,
            HttpStatus::Unauthorized { .. } => 401,
            HttpStatus::Forbidden { .. } => 403,
            HttpStatus::NotFound { .. } => 404,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            HttpStatus::BadRequest { detail }
            | HttpStatus::Unauthorized { detail }
            | HttpStatus::Forbidden { detail }
            | HttpStatus::NotFound { detail } => detail,
        }
    }
}

impl Serialize for HttpStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut body = serializer.serialize_struct("HttpStatus", 1)?;
        body.serialize_field("detail", self.detail())?;
        body.end()
    }
}

impl From<ValidationError> for HttpStatus {
    fn from(err: ValidationError) -> Self {
        HttpStatus::bad_request(err.to_string())
    }
}
