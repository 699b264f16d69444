use serde::{Deserialize, Serialize};

use super::{
    ActivationToken, DecimalError, FieldViolation, FixedDecimal, RawDecimal, SchemaLimits,
    ValidationResult, ViolationKind, Violations,
};
use crate::{Account, AccountId, BoxStr, Location};

/// Building location as submitted, before precision checks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountLocation {
    pub longitude: Option<RawDecimal>,
    pub latitude: Option<RawDecimal>,
}

/// Request to create a participant account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountCreate {
    /// Left out to let the server pick one.
    pub pseudonym: Option<i64>,
    pub location: Option<AccountLocation>,
}

/// A validated [`AccountCreate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub pseudonym: Option<i64>,
    pub location: Option<Location>,
}

impl AccountCreate {
    pub fn validate(self, limits: &SchemaLimits) -> ValidationResult<NewAccount> {
        let mut violations = Violations::default();

        if let Some(pseudonym) = self.pseudonym
            && !limits.pseudonym_in_range(pseudonym)
        {
            violations.push(FieldViolation::new(
                "pseudonym",
                ViolationKind::OutOfRange {
                    min: limits.pseudonym_min,
                    max: limits.pseudonym_max,
                },
            ));
        }

        let location = self.location.map(|location| {
            let longitude = violations.check(coordinate(
                "location.longitude",
                location.longitude.as_ref(),
                limits,
            ));
            let latitude = violations.check(coordinate(
                "location.latitude",
                location.latitude.as_ref(),
                limits,
            ));
            longitude.zip(latitude)
        });

        violations.finish(|| NewAccount {
            pseudonym: self.pseudonym,
            location: location.flatten().map(|(longitude, latitude)| Location {
                longitude,
                latitude,
            }),
        })
    }
}

fn coordinate(
    field: &str,
    raw: Option<&RawDecimal>,
    limits: &SchemaLimits,
) -> Result<FixedDecimal, FieldViolation> {
    let raw = raw.ok_or_else(|| FieldViolation::new(field, ViolationKind::Missing))?;

    let value = raw.parse().map_err(|e| {
        let kind = match e {
            DecimalError::Malformed => ViolationKind::MalformedDecimal,
            DecimalError::Overflow => ViolationKind::TooManyDigits {
                max: limits.location_max_digits,
            },
        };
        FieldViolation::new(field, kind)
    })?;

    value
        .check_precision(limits.location_max_digits, limits.location_decimal_places)
        .map_err(|kind| FieldViolation::new(field, kind))?;

    Ok(value)
}

/// Request to activate an account with the token it was created with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountActivate {
    pub activation_token: String,
}

impl AccountActivate {
    pub fn validate(self) -> ValidationResult<ActivationToken> {
        Ok(ActivationToken::parse("activation_token", &self.activation_token)?)
    }
}

/// An account as returned to the administrator who created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountItem {
    pub id: AccountId,
    pub pseudonym: i64,
    pub activation_token: BoxStr,
    /// Link the participant opens on their phone to activate the account.
    pub firebase_url: BoxStr,
}

impl AccountItem {
    pub fn new(account: &Account, activation_url_base: &str) -> Self {
        Self {
            id: account.id,
            pseudonym: account.pseudonym,
            activation_token: account.activation_token.clone(),
            firebase_url: format!("{activation_url_base}{}", account.activation_token).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> SchemaLimits {
        SchemaLimits {
            pseudonym_min: 100,
            pseudonym_max: 999,
            location_max_digits: 9,
            location_decimal_places: 6,
        }
    }

    fn location(longitude: &str, latitude: &str) -> Option<AccountLocation> {
        Some(AccountLocation {
            longitude: Some(longitude.into()),
            latitude: Some(latitude.into()),
        })
    }

    #[test]
    fn empty_request_is_valid() {
        let account = AccountCreate::default().validate(&limits()).unwrap();
        assert_eq!(
            account,
            NewAccount {
                pseudonym: None,
                location: None
            }
        );
    }

    #[test]
    fn pseudonym_bounds_are_inclusive() {
        for pseudonym in [100, 999] {
            let request = AccountCreate {
                pseudonym: Some(pseudonym),
                location: None,
            };
            assert!(request.validate(&limits()).is_ok(), "{pseudonym}");
        }

        let request = AccountCreate {
            pseudonym: Some(1000),
            location: None,
        };
        let err = request.validate(&limits()).unwrap_err();
        assert_eq!(
            err.violations(),
            &[FieldViolation::new(
                "pseudonym",
                ViolationKind::OutOfRange { min: 100, max: 999 }
            )]
        );
    }

    #[test]
    fn keeps_exact_coordinates() {
        let request = AccountCreate {
            pseudonym: None,
            location: location("6.083700", "52.500000"),
        };
        let account = request.validate(&limits()).unwrap();
        let location = account.location.unwrap();
        assert_eq!(location.longitude.to_string(), "6.083700");
        assert_eq!(location.latitude.to_string(), "52.500000");
    }

    #[test]
    fn reports_every_violation() {
        let request = AccountCreate {
            pseudonym: Some(5),
            location: Some(AccountLocation {
                longitude: Some("east".into()),
                latitude: None,
            }),
        };

        let err = request.validate(&limits()).unwrap_err();
        assert_eq!(
            err.violations(),
            &[
                FieldViolation::new("pseudonym", ViolationKind::OutOfRange { min: 100, max: 999 }),
                FieldViolation::new("location.longitude", ViolationKind::MalformedDecimal),
                FieldViolation::new("location.latitude", ViolationKind::Missing),
            ]
        );
    }

    #[test]
    fn coordinate_precision_is_enforced() {
        let request = AccountCreate {
            pseudonym: None,
            location: location("6.0837001", "5200.5"),
        };

        let err = request.validate(&limits()).unwrap_err();
        assert_eq!(
            err.violations(),
            &[
                FieldViolation::new(
                    "location.longitude",
                    ViolationKind::TooManyDecimalPlaces { max: 6 }
                ),
                FieldViolation::new(
                    "location.latitude",
                    ViolationKind::TooManyWholeDigits { max: 3 }
                ),
            ]
        );
    }

    #[test]
    fn location_accepts_json_numbers() {
        let request: AccountCreate =
            serde_json::from_str(r#"{"location": {"longitude": 6.5, "latitude": "52.1"}}"#)
                .unwrap();
        let account = request.validate(&limits()).unwrap();
        assert_eq!(account.location.unwrap().longitude, FixedDecimal::new(65, 1));
    }

    #[test]
    fn activation_token_is_trimmed() {
        let request = AccountActivate {
            activation_token: "  short  ".into(),
        };
        assert!(matches!(
            request.validate(),
            Err(crate::ValidationError::Constraint(_))
        ));
    }

    #[test]
    fn item_builds_activation_link() {
        let account = Account {
            id: AccountId(3),
            pseudonym: 123456,
            activation_token: "abcdefgh".into(),
            location: None,
            activated_at: None,
        };
        let item = AccountItem::new(&account, "https://example.org/activate?token=");
        assert_eq!(
            item.firebase_url.as_ref(),
            "https://example.org/activate?token=abcdefgh"
        );
    }
}
