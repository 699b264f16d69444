use serde::{Deserialize, Serialize};

use super::{
    FieldViolation, ViolationKind,
    limits::{ACTIVATION_TOKEN_MAX_LEN, ACTIVATION_TOKEN_MIN_LEN},
};
use crate::BoxStr;

/// Shared secret used once to activate an account or a device.
///
/// Always stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivationToken(BoxStr);

impl ActivationToken {
    /// Trims surrounding whitespace, then checks the length of what remains.
    pub fn parse(field: &str, raw: &str) -> Result<Self, FieldViolation> {
        let trimmed = raw.trim();
        let len = trimmed.chars().count();

        if len < ACTIVATION_TOKEN_MIN_LEN {
            return Err(FieldViolation::new(
                field,
                ViolationKind::TooShort {
                    min: ACTIVATION_TOKEN_MIN_LEN,
                },
            ));
        }

        if len > ACTIVATION_TOKEN_MAX_LEN {
            return Err(FieldViolation::new(
                field,
                ViolationKind::TooLong {
                    max: ACTIVATION_TOKEN_MAX_LEN,
                },
            ));
        }

        Ok(Self(trimmed.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Opaque bearer token handed out after a successful activation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(BoxStr);

impl SessionToken {
    pub fn parse(raw: &str) -> Result<Self, FieldViolation> {
        if raw.is_empty() {
            return Err(FieldViolation::new("session_token", ViolationKind::Empty));
        }
        Ok(Self(raw.into()))
    }

    /// Wraps a token minted by the session issuer.
    pub fn issued(token: BoxStr) -> Self {
        debug_assert!(!token.is_empty());
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Session issued to a participant account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSession {
    pub session_token: SessionToken,
}

/// Session issued to an activated device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSession {
    pub session_token: SessionToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_before_measuring() {
        // Nine characters raw, five once trimmed.
        let err = ActivationToken::parse("activation_token", "  short  ").unwrap_err();
        assert_eq!(err.field.as_ref(), "activation_token");
        assert_eq!(err.kind, ViolationKind::TooShort { min: 8 });

        let token = ActivationToken::parse("activation_token", "\t01234567 \n").unwrap();
        assert_eq!(token.as_str(), "01234567");
    }

    #[test]
    fn enforces_upper_bound() {
        let at_limit = "x".repeat(ACTIVATION_TOKEN_MAX_LEN);
        assert!(ActivationToken::parse("t", &at_limit).is_ok());

        let over = "x".repeat(ACTIVATION_TOKEN_MAX_LEN + 1);
        assert_eq!(
            ActivationToken::parse("t", &over).unwrap_err().kind,
            ViolationKind::TooLong { max: 1024 }
        );
    }

    #[test]
    fn session_token_must_not_be_empty() {
        assert!(SessionToken::parse("").is_err());
        assert_eq!(SessionToken::parse("abc").unwrap().as_str(), "abc");
    }

    #[test]
    fn session_serializes_flat() {
        let session = DeviceSession {
            session_token: SessionToken::parse("tok").unwrap(),
        };
        assert_eq!(
            serde_json::to_string(&session).unwrap(),
            r#"{"session_token":"tok"}"#
        );
    }
}
