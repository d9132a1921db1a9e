//! devicectl-server: HTTP CRUD and search over device records
//!
//! A `DeviceRepository` owns all SQL against the `devices` table; the
//! `http` layer maps requests onto one repository call each and turns the
//! typed result into a status code and JSON body.

pub mod db;
pub mod http;
pub mod models;

pub use db::{create_pool, DeviceRepository, PgDeviceRepo, RepoError};
pub use http::{build_router, run_server, ApiError, AppState, ServerConfig, ServerError};
pub use models::{Device, DeviceUpdate, NewDevice, ValidationError};
