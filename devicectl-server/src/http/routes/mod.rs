//! Route handlers organized by resource

pub mod devices;
pub mod health;
