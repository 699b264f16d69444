use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use super::ViolationKind;
use crate::BoxStr;

/// Most significant digits a [`FixedDecimal`] can hold.
pub const MAX_PRECISION: u32 = 38;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecimalError {
    #[error("not a decimal number")]
    Malformed,
    #[error("more than {max} significant digits", max = MAX_PRECISION)]
    Overflow,
}

/// Exact fixed-point decimal: `mantissa * 10^-scale`.
///
/// Trailing fractional zeros are kept, so `12.50` has scale 2 and four digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedDecimal {
    mantissa: i128,
    scale: u32,
}

impl FixedDecimal {
    pub const fn new(mantissa: i128, scale: u32) -> Self {
        Self { mantissa, scale }
    }

    pub fn mantissa(&self) -> i128 {
        self.mantissa
    }

    /// Digits after the decimal point.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Significant digits, ignoring leading zeros. A value with more fractional
    /// places than significant digits counts its fractional places instead.
    pub fn digits(&self) -> u32 {
        let significant = self
            .mantissa
            .unsigned_abs()
            .checked_ilog10()
            .map_or(1, |d| d + 1);
        significant.max(self.scale)
    }

    pub fn whole_digits(&self) -> u32 {
        self.digits() - self.scale
    }

    /// Checks the value against a `max_digits`/`decimal_places` column definition.
    pub fn check_precision(&self, max_digits: u32, decimal_places: u32) -> Result<(), ViolationKind> {
        if self.digits() > max_digits {
            return Err(ViolationKind::TooManyDigits { max: max_digits });
        }

        if self.scale > decimal_places {
            return Err(ViolationKind::TooManyDecimalPlaces {
                max: decimal_places,
            });
        }

        let whole_max = max_digits.saturating_sub(decimal_places);
        if self.whole_digits() > whole_max {
            return Err(ViolationKind::TooManyWholeDigits { max: whole_max });
        }

        Ok(())
    }
}

impl FromStr for FixedDecimal {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (negative, unsigned) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };

        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(DecimalError::Malformed);
        }

        let digits = whole.bytes().chain(fraction.bytes());
        if !digits.clone().all(|b| b.is_ascii_digit()) {
            return Err(DecimalError::Malformed);
        }

        let scale = u32::try_from(fraction.len()).map_err(|_| DecimalError::Overflow)?;
        let significant = digits.clone().skip_while(|&b| b == b'0').count();
        if scale > MAX_PRECISION || significant > MAX_PRECISION as usize {
            return Err(DecimalError::Overflow);
        }

        // At most MAX_PRECISION significant digits, which always fits an i128.
        let magnitude = digits.fold(0i128, |acc, b| acc * 10 + i128::from(b - b'0'));
        let mantissa = if negative { -magnitude } else { magnitude };

        Ok(Self { mantissa, scale })
    }
}

impl fmt::Display for FixedDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mantissa < 0 {
            f.write_str("-")?;
        }

        let magnitude = self.mantissa.unsigned_abs().to_string();
        let scale = self.scale as usize;
        if scale == 0 {
            return f.write_str(&magnitude);
        }

        let padded = format!("{magnitude:0>width$}", width = scale + 1);
        let (whole, fraction) = padded.split_at(padded.len() - scale);
        write!(f, "{whole}.{fraction}")
    }
}

impl Serialize for FixedDecimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FixedDecimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawDecimal::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Decimal exactly as the client sent it, before any precision checks.
///
/// Accepts JSON strings as well as numbers so that a malformed value can be
/// reported against its field instead of failing the whole body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDecimal(BoxStr);

impl RawDecimal {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn parse(&self) -> Result<FixedDecimal, DecimalError> {
        self.0.parse()
    }
}

impl From<&str> for RawDecimal {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl Serialize for RawDecimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RawDecimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RawDecimalVisitor;

        impl de::Visitor<'_> for RawDecimalVisitor {
            type Value = RawDecimal;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a decimal number or numeric string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(RawDecimal(v.into()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(RawDecimal(v.to_string().into()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(RawDecimal(v.to_string().into()))
            }

            // Shortest representation that reads back as the same float, which
            // is the literal the client wrote for any value within f64 precision.
            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(RawDecimal(v.to_string().into()))
            }
        }

        deserializer.deserialize_any(RawDecimalVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> FixedDecimal {
        s.parse().unwrap()
    }

    #[test]
    fn parses_sign_and_scale() {
        assert_eq!(dec("-12.50"), FixedDecimal::new(-1250, 2));
        assert_eq!(dec("+3"), FixedDecimal::new(3, 0));
        assert_eq!(dec(".5"), FixedDecimal::new(5, 1));
        assert_eq!(dec("7."), FixedDecimal::new(7, 0));
    }

    #[test]
    fn rejects_garbage() {
        for input in ["", ".", "-", "1.2.3", "12a", "1e5", "NaN", "--1"] {
            assert_eq!(input.parse::<FixedDecimal>(), Err(DecimalError::Malformed), "{input}");
        }
    }

    #[test]
    fn rejects_more_than_max_precision() {
        let long = "1".repeat(MAX_PRECISION as usize + 1);
        assert_eq!(long.parse::<FixedDecimal>(), Err(DecimalError::Overflow));

        let leading_zeros = format!("000{}", "9".repeat(MAX_PRECISION as usize));
        assert!(leading_zeros.parse::<FixedDecimal>().is_ok());
    }

    #[test]
    fn counts_digits_like_a_decimal_tuple() {
        assert_eq!(dec("12.50").digits(), 4);
        assert_eq!(dec("0.5").digits(), 1);
        assert_eq!(dec("0.05").digits(), 2);
        assert_eq!(dec("0.00").digits(), 2);
        assert_eq!(dec("100").digits(), 3);
        assert_eq!(dec("007.1").whole_digits(), 1);
    }

    #[test]
    fn precision_checks_in_order() {
        assert_eq!(dec("52.123456").check_precision(9, 6), Ok(()));
        assert_eq!(
            dec("1234567890").check_precision(9, 6),
            Err(ViolationKind::TooManyDigits { max: 9 })
        );
        assert_eq!(
            dec("5.1234567").check_precision(9, 6),
            Err(ViolationKind::TooManyDecimalPlaces { max: 6 })
        );
        assert_eq!(
            dec("1234.5").check_precision(9, 6),
            Err(ViolationKind::TooManyWholeDigits { max: 3 })
        );
    }

    #[test]
    fn display_restores_scale() {
        assert_eq!(dec("-0.05").to_string(), "-0.05");
        assert_eq!(dec("6.100").to_string(), "6.100");
        assert_eq!(dec("42").to_string(), "42");
    }

    #[test]
    fn raw_decimal_accepts_numbers_and_strings() {
        let raw: RawDecimal = serde_json::from_str("52.5").unwrap();
        assert_eq!(raw.as_str(), "52.5");

        let raw: RawDecimal = serde_json::from_str("-6").unwrap();
        assert_eq!(raw.as_str(), "-6");

        let raw: RawDecimal = serde_json::from_str(r#""6.100""#).unwrap();
        assert_eq!(raw.parse(), Ok(FixedDecimal::new(6100, 3)));
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&dec("52.000100")).unwrap();
        assert_eq!(json, r#""52.000100""#);
    }
}
