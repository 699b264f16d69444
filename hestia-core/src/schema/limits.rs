use serde::{Deserialize, Serialize};

use super::decimal::MAX_PRECISION;

/// Shortest activation token accepted, counted after trimming.
pub const ACTIVATION_TOKEN_MIN_LEN: usize = 8;
/// Longest activation token accepted, counted after trimming.
pub const ACTIVATION_TOKEN_MAX_LEN: usize = 1024;

/// Deployment-specific bounds enforced by the schema.
///
/// Supplied once at startup and constant afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaLimits {
    /// Smallest pseudonym an account may carry (inclusive).
    pub pseudonym_min: i64,
    /// Largest pseudonym an account may carry (inclusive).
    pub pseudonym_max: i64,
    /// Total significant digits allowed in a longitude or latitude.
    pub location_max_digits: u32,
    /// Digits allowed after the decimal point in a longitude or latitude.
    pub location_decimal_places: u32,
}

impl Default for SchemaLimits {
    fn default() -> Self {
        Self {
            pseudonym_min: 100_000,
            pseudonym_max: 899_999,
            location_max_digits: 9,
            location_decimal_places: 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LimitsError {
    #[error("pseudonym_min ({min}) is greater than pseudonym_max ({max})")]
    PseudonymRange { min: i64, max: i64 },
    #[error("location_decimal_places ({places}) exceeds location_max_digits ({digits})")]
    DecimalPlaces { places: u32, digits: u32 },
    #[error("location_max_digits must be between 1 and {max}, got {0}", max = MAX_PRECISION)]
    Precision(u32),
}

impl SchemaLimits {
    /// Rejects limit combinations no value could ever satisfy.
    pub fn check(&self) -> Result<(), LimitsError> {
        if self.pseudonym_min > self.pseudonym_max {
            return Err(LimitsError::PseudonymRange {
                min: self.pseudonym_min,
                max: self.pseudonym_max,
            });
        }

        if self.location_max_digits == 0 || self.location_max_digits > MAX_PRECISION {
            return Err(LimitsError::Precision(self.location_max_digits));
        }

        if self.location_decimal_places > self.location_max_digits {
            return Err(LimitsError::DecimalPlaces {
                places: self.location_decimal_places,
                digits: self.location_max_digits,
            });
        }

        Ok(())
    }

    pub fn pseudonym_in_range(&self, pseudonym: i64) -> bool {
        (self.pseudonym_min..=self.pseudonym_max).contains(&pseudonym)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_consistent() {
        assert_eq!(SchemaLimits::default().check(), Ok(()));
    }

    #[test]
    fn inverted_pseudonym_range_is_rejected() {
        let limits = SchemaLimits {
            pseudonym_min: 10,
            pseudonym_max: 5,
            ..Default::default()
        };
        assert_eq!(
            limits.check(),
            Err(LimitsError::PseudonymRange { min: 10, max: 5 })
        );
    }

    #[test]
    fn decimal_places_cannot_exceed_digits() {
        let limits = SchemaLimits {
            location_max_digits: 4,
            location_decimal_places: 6,
            ..Default::default()
        };
        assert!(matches!(
            limits.check(),
            Err(LimitsError::DecimalPlaces { places: 6, digits: 4 })
        ));
    }

    #[test]
    fn partial_table_falls_back_to_defaults() {
        let limits: SchemaLimits = serde_json::from_str(r#"{"pseudonym_max": 999}"#).unwrap();
        assert_eq!(limits.pseudonym_max, 999);
        assert_eq!(limits.pseudonym_min, SchemaLimits::default().pseudonym_min);
    }
}
