//! Maintenance command: delete every device

use anyhow::{bail, Context, Result};
use clap::Parser;

use devicectl_server::db::create_pool;
use devicectl_server::{DeviceRepository, PgDeviceRepo};

/// Arguments for the purge command
#[derive(Parser, Debug)]
pub struct PurgeArgs {
    /// Confirm that all devices should be deleted
    #[arg(long)]
    pub yes: bool,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,
}

/// Empty the devices table
pub async fn run_purge(args: PurgeArgs) -> Result<()> {
    if !args.yes {
        bail!("Refusing to delete all devices without --yes");
    }

    let pool = create_pool(&args.database_url)
        .await
        .context("Failed to create database pool")?;

    // Failures are logged by the repository, not returned
    PgDeviceRepo::new(pool).delete_all().await;

    Ok(())
}
