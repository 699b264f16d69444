use std::fmt;

use crate::BoxStr;

pub type ValidationResult<T> = core::result::Result<T, ValidationError>;

/// Why an inbound record or upload envelope was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// One or more fields break their declared constraints.
    #[error("invalid fields: {}", ViolationList(.0))]
    Constraint(Box<[FieldViolation]>),
    #[error("property `{property}` has no measurements")]
    EmptySeries { property: BoxStr },
    #[error("property `{property}` has a non-positive interval")]
    NonPositiveInterval { property: BoxStr },
    #[error("timestamps of property `{property}` fall outside the supported range")]
    TimestampOutOfRange { property: BoxStr },
    #[error("upload contains no property measurements")]
    EmptyUpload,
    #[error("device type has no property `{property}`")]
    UnknownProperty { property: BoxStr },
    #[error("property `{property}` appears more than once in the upload")]
    DuplicateProperty { property: BoxStr },
}

impl ValidationError {
    /// Field violations carried by a [`ValidationError::Constraint`], empty otherwise.
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            ValidationError::Constraint(violations) => violations,
            _ => &[],
        }
    }
}

impl From<FieldViolation> for ValidationError {
    fn from(violation: FieldViolation) -> Self {
        ValidationError::Constraint(Box::new([violation]))
    }
}

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} {kind}")]
pub struct FieldViolation {
    /// Dotted path of the offending field, e.g. `location.latitude`.
    pub field: BoxStr,
    pub kind: ViolationKind,
}

impl FieldViolation {
    pub fn new(field: impl Into<BoxStr>, kind: ViolationKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViolationKind {
    #[error("must be between {min} and {max}")]
    OutOfRange { min: i64, max: i64 },
    #[error("must be at least {min} characters long")]
    TooShort { min: usize },
    #[error("must be at most {max} characters long")]
    TooLong { max: usize },
    #[error("must be one of: {}", .expected.join(", "))]
    InvalidEnum { expected: &'static [&'static str] },
    #[error("is not a valid decimal number")]
    MalformedDecimal,
    #[error("must have at most {max} digits")]
    TooManyDigits { max: u32 },
    #[error("must have at most {max} decimal places")]
    TooManyDecimalPlaces { max: u32 },
    #[error("must have at most {max} digits before the decimal point")]
    TooManyWholeDigits { max: u32 },
    #[error("is required")]
    Missing,
    #[error("must not be empty")]
    Empty,
}

struct ViolationList<'a>(&'a [FieldViolation]);

impl fmt::Display for ViolationList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

/// Collects every violation of a record before deciding whether it is valid.
#[derive(Debug, Default)]
pub(crate) struct Violations(Vec<FieldViolation>);

impl Violations {
    pub(crate) fn push(&mut self, violation: FieldViolation) {
        self.0.push(violation);
    }

    /// Keeps the value when it passed, records the violation otherwise.
    pub(crate) fn check<T>(&mut self, result: Result<T, FieldViolation>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(violation) => {
                self.push(violation);
                None
            }
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn into_error(self) -> ValidationError {
        ValidationError::Constraint(self.0.into_boxed_slice())
    }

    pub(crate) fn finish<T>(self, value: impl FnOnce() -> T) -> ValidationResult<T> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self.into_error())
        }
    }
}
