//! Database layer - connection pool, schema and repositories
//!
//! - Connection pool with fixed limits, no per-request tuning
//! - Rely on DB constraints, classify conflicts by SQLSTATE
//! - No explicit transactions

pub mod pool;
pub mod repos;
pub mod schema;

pub use pool::{create_pool, create_pool_with_options, PoolSettings};
pub use repos::*;
pub use schema::ensure_schema;
