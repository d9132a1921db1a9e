//! Command implementations for devicectl

pub mod purge;
pub mod serve;

pub use purge::run_purge;
pub use serve::run_serve;
