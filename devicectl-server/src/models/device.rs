//! Device entity and its write-side inputs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::ValidationError;

/// A stored device row.
///
/// `id` and `creation_time` are assigned by storage and never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Device {
    pub id: i64,
    pub name: String,
    pub brand: String,
    pub creation_time: DateTime<Utc>,
}

/// Validated input for creating a device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDevice {
    name: String,
    brand: String,
}

impl NewDevice {
    /// Create a new device input, rejecting empty name or brand.
    ///
    /// # Example
    /// ```
    /// use devicectl_server::models::NewDevice;
    ///
    /// assert!(NewDevice::new("Pixel", "Google").is_ok());
    /// assert!(NewDevice::new("", "Google").is_err());
    /// assert!(NewDevice::new("Pixel", "  ").is_ok());
    /// ```
    pub fn new(name: impl Into<String>, brand: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        let brand = brand.into();
        require("name", &name)?;
        require("brand", &brand)?;
        Ok(Self { name, brand })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn brand(&self) -> &str {
        &self.brand
    }
}

/// Update request body.
///
/// Only `name` and `brand` are read; `id` and `creation_time` in the body
/// are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceUpdate {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub brand: String,
}

impl DeviceUpdate {
    /// Merge name and brand onto an existing device.
    pub fn apply_to(self, mut device: Device) -> Result<Device, ValidationError> {
        require("name", &self.name)?;
        require("brand", &self.brand)?;
        device.name = self.name;
        device.brand = self.brand;
        Ok(device)
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(())
}
