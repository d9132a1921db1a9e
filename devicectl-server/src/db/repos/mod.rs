//! Repository abstraction for device storage
//!
//! Handlers only see the `DeviceRepository` trait. `PgDeviceRepo` is the
//! PostgreSQL implementation; tests substitute a mock.

pub mod devices;

use async_trait::async_trait;

use crate::models::{Device, NewDevice};

pub use devices::PgDeviceRepo;

/// Repository error type
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("device with id {id} not found")]
    NotFound { id: i64 },

    #[error("device '{name}' with brand '{brand}' already exists")]
    ConstraintViolation { name: String, brand: String },

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Storage operations for devices
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceRepository: Send + Sync {
    /// Insert a device and return the stored row (generated id and creation time).
    async fn save(&self, device: NewDevice) -> Result<Device, RepoError>;

    /// Fetch one device by primary key.
    async fn find_by_id(&self, id: i64) -> Result<Device, RepoError>;

    /// Fetch every device. Empty table yields an empty vec.
    async fn find_all(&self) -> Result<Vec<Device>, RepoError>;

    /// Fetch devices whose brand equals `brand` exactly.
    async fn find_by_brand(&self, brand: &str) -> Result<Vec<Device>, RepoError>;

    /// Write name and brand for `device.id`, returning the device as given.
    async fn update(&self, device: Device) -> Result<Device, RepoError>;

    /// Delete one device, `NotFound` if it does not exist.
    async fn delete_by_id(&self, id: i64) -> Result<(), RepoError>;

    /// Empty the table. Failures are logged, not returned.
    async fn delete_all(&self);

    /// Round-trip to storage, used by the readiness check.
    async fn ping(&self) -> Result<(), RepoError>;
}
