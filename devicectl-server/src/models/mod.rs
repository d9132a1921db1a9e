//! Domain models with validation at construction
//!
//! Invalid input returns ValidationError, not panic.

pub mod device;
pub mod validation;

pub use device::{Device, DeviceUpdate, NewDevice};
pub use validation::ValidationError;
