use std::str::FromStr;

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

use crate::{
    BoxList, BoxStr,
    schema::{FieldViolation, ValidationError, ValidationResult, ViolationKind},
};

/// A single sample with an explicit timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementValue {
    pub timestamp: Timestamp,
    /// Textual encoding of the measured quantity. Not interpreted here.
    pub value: BoxStr,
}

/// Which end of a fixed-interval series the anchor timestamp marks.
///
/// Unknown names are reported as [`ViolationKind::InvalidEnum`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum TimestampType {
    /// Anchor is the first sample.
    Start,
    /// Anchor is the last sample.
    End,
}

impl TimestampType {
    pub const NAMES: &'static [&'static str] = &["start", "end"];
}

impl FromStr for TimestampType {
    type Err = FieldViolation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(TimestampType::Start),
            "end" => Ok(TimestampType::End),
            _ => Err(FieldViolation::new(
                "timestamp_type",
                ViolationKind::InvalidEnum {
                    expected: Self::NAMES,
                },
            )),
        }
    }
}

impl TryFrom<String> for TimestampType {
    type Error = FieldViolation;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Series of one property sampled at a constant interval.
///
/// Timestamps are implicit: the k-th of n values lies at
/// `timestamp + k * interval` for [`TimestampType::Start`] and at
/// `timestamp - (n - 1 - k) * interval` for [`TimestampType::End`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyMeasurementsFixed {
    pub property_name: BoxStr,
    pub timestamp: Timestamp,
    pub timestamp_type: TimestampType,
    #[serde(with = "interval")]
    pub interval: SignedDuration,
    pub measurements: BoxList<BoxStr>,
}

impl PropertyMeasurementsFixed {
    /// Expands the series into explicitly timestamped values, in input order.
    pub fn reconstruct(self) -> ValidationResult<BoxList<MeasurementValue>> {
        let Self {
            property_name,
            timestamp,
            timestamp_type,
            interval,
            measurements,
        } = self;

        if measurements.is_empty() {
            return Err(ValidationError::EmptySeries {
                property: property_name,
            });
        }

        if !interval.is_positive() {
            return Err(ValidationError::NonPositiveInterval {
                property: property_name,
            });
        }

        let last = measurements.len() - 1;
        let reconstructed = measurements
            .into_vec()
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                let time = match timestamp_type {
                    TimestampType::Start => {
                        offset(interval, i).and_then(|d| timestamp.checked_add(d).ok())
                    }
                    TimestampType::End => {
                        offset(interval, last - i).and_then(|d| timestamp.checked_sub(d).ok())
                    }
                };

                time.map(|timestamp| MeasurementValue { timestamp, value })
                    .ok_or_else(|| ValidationError::TimestampOutOfRange {
                        property: property_name.clone(),
                    })
            })
            .collect::<ValidationResult<BoxList<_>>>()?;

        Ok(reconstructed)
    }
}

fn offset(interval: SignedDuration, steps: usize) -> Option<SignedDuration> {
    interval.checked_mul(i32::try_from(steps).ok()?)
}

/// Series of one property where every sample carries its own timestamp.
///
/// Samples keep the order they were sent in; timestamps need not be sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyMeasurementsVariable {
    pub property_name: BoxStr,
    pub measurements: BoxList<MeasurementValue>,
}

/// Measurements of one property in either encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyMeasurements {
    Fixed(PropertyMeasurementsFixed),
    Variable(PropertyMeasurementsVariable),
}

impl PropertyMeasurements {
    pub fn property_name(&self) -> &str {
        match self {
            PropertyMeasurements::Fixed(fixed) => &fixed.property_name,
            PropertyMeasurements::Variable(variable) => &variable.property_name,
        }
    }

    /// Brings either encoding to explicitly timestamped values.
    pub fn normalize(self) -> ValidationResult<BoxList<MeasurementValue>> {
        match self {
            PropertyMeasurements::Fixed(fixed) => fixed.reconstruct(),
            PropertyMeasurements::Variable(variable) if variable.measurements.is_empty() => {
                Err(ValidationError::EmptySeries {
                    property: variable.property_name,
                })
            }
            PropertyMeasurements::Variable(variable) => Ok(variable.measurements),
        }
    }
}

impl From<PropertyMeasurementsFixed> for PropertyMeasurements {
    fn from(fixed: PropertyMeasurementsFixed) -> Self {
        PropertyMeasurements::Fixed(fixed)
    }
}

impl From<PropertyMeasurementsVariable> for PropertyMeasurements {
    fn from(variable: PropertyMeasurementsVariable) -> Self {
        PropertyMeasurements::Variable(variable)
    }
}

/// Interval on the wire: seconds as a number, or a duration string such as
/// `"PT5M"`, `"5m"` or `"P1D"`. Days count as 24 hours.
mod interval {
    use std::fmt;

    use jiff::{SignedDuration, Span, SpanRelativeTo};
    use serde::{Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(interval: &SignedDuration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(interval)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SignedDuration, D::Error> {
        struct IntervalVisitor;

        impl de::Visitor<'_> for IntervalVisitor {
            type Value = SignedDuration;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a number of seconds or a duration string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                if let Ok(duration) = v.parse::<SignedDuration>() {
                    return Ok(duration);
                }
                // Calendar units need a span; only uniform units are accepted.
                let span: Span = v.parse().map_err(E::custom)?;
                span.to_duration(SpanRelativeTo::days_are_24_hours())
                    .map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(SignedDuration::from_secs(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                let secs = i64::try_from(v).map_err(E::custom)?;
                Ok(SignedDuration::from_secs(secs))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                SignedDuration::try_from_secs_f64(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(IntervalVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(second: i64) -> Timestamp {
        Timestamp::from_second(second).unwrap()
    }

    fn fixed(timestamp_type: TimestampType, anchor: i64, interval: i64, n: usize) -> PropertyMeasurementsFixed {
        PropertyMeasurementsFixed {
            property_name: "roomTemp".into(),
            timestamp: t(anchor),
            timestamp_type,
            interval: SignedDuration::from_secs(interval),
            measurements: (0..n).map(|i| i.to_string().into()).collect(),
        }
    }

    fn times(values: &[MeasurementValue]) -> Vec<i64> {
        values.iter().map(|v| v.timestamp.as_second()).collect()
    }

    #[test]
    fn start_anchor_counts_forward() {
        let values = fixed(TimestampType::Start, 1_000, 300, 4).reconstruct().unwrap();
        assert_eq!(times(&values), vec![1_000, 1_300, 1_600, 1_900]);
        assert_eq!(&*values[2].value, "2");
    }

    #[test]
    fn end_anchor_counts_backward() {
        let values = fixed(TimestampType::End, 1_000, 300, 4).reconstruct().unwrap();
        assert_eq!(times(&values), vec![100, 400, 700, 1_000]);
        assert_eq!(&*values[0].value, "0");
    }

    #[test]
    fn single_value_lands_on_anchor() {
        for timestamp_type in [TimestampType::Start, TimestampType::End] {
            let values = fixed(timestamp_type, 42, 60, 1).reconstruct().unwrap();
            assert_eq!(times(&values), vec![42]);
        }
    }

    #[test]
    fn end_matches_start_at_shifted_anchor() {
        for n in 1..8usize {
            let delta = 17;
            let anchor = 10_000;
            let end = fixed(TimestampType::End, anchor, delta, n).reconstruct().unwrap();
            let shifted = anchor - (n as i64 - 1) * delta;
            let start = fixed(TimestampType::Start, shifted, delta, n).reconstruct().unwrap();
            assert_eq!(end, start, "n = {n}");
        }
    }

    #[test]
    fn empty_series_is_rejected() {
        let err = fixed(TimestampType::Start, 0, 60, 0).reconstruct().unwrap_err();
        assert_eq!(
            err,
            ValidationError::EmptySeries {
                property: "roomTemp".into()
            }
        );
    }

    #[test]
    fn non_positive_interval_is_rejected() {
        for interval in [0, -60] {
            let err = fixed(TimestampType::End, 0, interval, 3).reconstruct().unwrap_err();
            assert!(
                matches!(err, ValidationError::NonPositiveInterval { .. }),
                "interval {interval}"
            );
        }
    }

    #[test]
    fn overflowing_series_is_rejected() {
        let mut series = fixed(TimestampType::Start, 0, 0, 3);
        series.interval = SignedDuration::from_hours(24 * 365 * 9_000);
        series.timestamp = Timestamp::MAX;
        let err = series.reconstruct().unwrap_err();
        assert!(matches!(err, ValidationError::TimestampOutOfRange { .. }));
    }

    #[test]
    fn variable_series_keeps_order() {
        let measurements: BoxList<MeasurementValue> = [30, 10, 20]
            .into_iter()
            .map(|s| MeasurementValue {
                timestamp: t(s),
                value: s.to_string().into(),
            })
            .collect();
        let variable = PropertyMeasurements::Variable(PropertyMeasurementsVariable {
            property_name: "co2".into(),
            measurements: measurements.clone(),
        });

        assert_eq!(variable.normalize().unwrap(), measurements);
    }

    #[test]
    fn empty_variable_series_is_rejected() {
        let variable = PropertyMeasurements::Variable(PropertyMeasurementsVariable {
            property_name: "co2".into(),
            measurements: Box::new([]),
        });
        assert!(matches!(
            variable.normalize(),
            Err(ValidationError::EmptySeries { .. })
        ));
    }

    #[test]
    fn timestamp_type_parses_lowercase_names() {
        assert_eq!("end".parse::<TimestampType>(), Ok(TimestampType::End));
        let err = "middle".parse::<TimestampType>().unwrap_err();
        assert_eq!(
            err.kind,
            ViolationKind::InvalidEnum {
                expected: &["start", "end"]
            }
        );
    }

    #[test]
    fn fixed_block_reads_numeric_and_text_intervals() {
        let json = r#"{
            "property_name": "roomTemp",
            "timestamp": "2024-01-01T00:00:00Z",
            "timestamp_type": "start",
            "interval": 300,
            "measurements": ["20.1", "20.3"]
        }"#;
        let block: PropertyMeasurementsFixed = serde_json::from_str(json).unwrap();
        assert_eq!(block.interval, SignedDuration::from_mins(5));

        let json = json.replace("300", r#""PT5M""#);
        let block: PropertyMeasurementsFixed = serde_json::from_str(&json).unwrap();
        assert_eq!(block.interval, SignedDuration::from_mins(5));

        let json = json.replace(r#""PT5M""#, "0.5");
        let block: PropertyMeasurementsFixed = serde_json::from_str(&json).unwrap();
        assert_eq!(block.interval, SignedDuration::from_millis(500));
    }

    #[test]
    fn unknown_timestamp_type_fails_to_deserialize() {
        let json = r#"{
            "property_name": "roomTemp",
            "timestamp": "2024-01-01T00:00:00Z",
            "timestamp_type": "middle",
            "interval": 60,
            "measurements": ["1"]
        }"#;
        let err = serde_json::from_str::<PropertyMeasurementsFixed>(json).unwrap_err();
        assert!(
            err.to_string()
                .contains("timestamp_type must be one of: start, end"),
            "{err}"
        );
    }

    #[test]
    fn day_intervals_count_as_24_hours() {
        let json = r#"{
            "property_name": "electricityImport",
            "timestamp": "2024-01-01T00:00:00Z",
            "timestamp_type": "end",
            "interval": "P1D",
            "measurements": ["1", "2"]
        }"#;
        let block: PropertyMeasurementsFixed = serde_json::from_str(json).unwrap();
        assert_eq!(block.interval, SignedDuration::from_hours(24));

        let json = json.replace("P1D", "P0DT0H5M0S");
        let block: PropertyMeasurementsFixed = serde_json::from_str(&json).unwrap();
        assert_eq!(block.interval, SignedDuration::from_mins(5));

        let json = json.replace("P0DT0H5M0S", "P1M");
        assert!(serde_json::from_str::<PropertyMeasurementsFixed>(&json).is_err());
    }
}
