mod account;
mod device;
mod measurement;
mod session;

pub use account::InMemoryAccountRegistry;
pub use device::InMemoryDeviceRegistry;
pub use measurement::InMemoryMeasurementRegistry;
pub use session::InMemorySessionRegistry;

/// Length of generated activation and session tokens.
const TOKEN_LEN: usize = 32;
