pub mod api;
pub mod config;
pub mod registry;

use std::sync::Arc;

use hestia_core::SchemaLimits;

// AppState must be defined in lib.rs to be visible to all modules
#[derive(Clone)]
pub struct AppState<A, D, S, M> {
    pub accounts: A,
    pub devices: D,
    pub sessions: S,
    pub measurements: M,
    pub limits: SchemaLimits,
    /// Prefix of the link handed to participants for activating an account.
    pub activation_url_base: Arc<str>,
}
