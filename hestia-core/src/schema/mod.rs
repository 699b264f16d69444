//! Field-level constraints for every record that crosses the service boundary.
//!
//! Inbound records deserialize leniently and are turned into validated values
//! by their `validate` method, which reports every violated field at once.

mod account;
mod decimal;
mod device;
mod error;
mod limits;
mod token;

pub use account::{AccountActivate, AccountCreate, AccountItem, AccountLocation, NewAccount};
pub use decimal::{DecimalError, FixedDecimal, MAX_PRECISION, RawDecimal};
pub use device::{
    DeviceCompleteItem, DeviceCreate, DeviceItem, DeviceItemMeasurementTime,
    DeviceTypeCompleteItem, DeviceTypeItem, DeviceVerify, NewDevice, PropertyCompleteItem,
};
pub use error::{FieldViolation, ValidationError, ValidationResult, ViolationKind};
pub(crate) use error::Violations;
pub use limits::{ACTIVATION_TOKEN_MAX_LEN, ACTIVATION_TOKEN_MIN_LEN, LimitsError, SchemaLimits};
pub use token::{AccountSession, ActivationToken, DeviceSession, SessionToken};
