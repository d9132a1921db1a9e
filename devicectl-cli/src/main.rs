//! devicectl - device registry HTTP service
//!
//! Entry point for the `devicectl` binary:
//! - `serve`: run the device CRUD/search API over PostgreSQL
//! - `purge`: delete every stored device (maintenance)

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod tracing_setup;

use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "devicectl",
    author,
    version,
    about = "Device registry: create, read, update, delete and search devices over HTTP"
)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces via OTLP (requires the `telemetry` feature)
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Delete all devices from the database
    Purge(commands::purge::PurgeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_files = config::load_dotenv();
    let cli = Cli::parse();

    tracing_setup::init(&TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
    })
    .ok();

    for path in &env_files {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    let result = match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await,
        Commands::Purge(args) => commands::run_purge(args).await,
    };

    tracing_setup::shutdown_otel();
    result
}
