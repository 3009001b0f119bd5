//! CoreSuit server: generic CRUD API over PostgreSQL.
//!
//! Main entry point that loads configuration, initializes logging and
//! either serves the API or applies migrations.

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use coresuit_core::config::AppConfig;
use coresuit_core::config::database::Backend;
use coresuit_core::error::AppError;
use coresuit_database::DatabasePool;

/// CoreSuit API server.
#[derive(Debug, Parser)]
#[command(name = "coresuit-server", version, about)]
struct Cli {
    /// Base configuration file, without extension.
    #[arg(short, long, env = "CORESUIT_CONFIG", default_value = "config/default")]
    config: String,

    /// Environment overlay loaded from the same directory (`config/{env}.toml`).
    #[arg(short, long, env = "CORESUIT_ENV", default_value = "development")]
    env: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_configuration(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => coresuit_api::run_server(config).await,
        Command::Migrate => migrate(&config).await,
    };

    if let Err(e) = result {
        tracing::error!(kind = %e.kind, "{}", e.message_chain());
        std::process::exit(1);
    }
}

/// Load and validate configuration from file and environment.
fn load_configuration(cli: &Cli) -> Result<AppConfig, AppError> {
    let config = AppConfig::load_from(&cli.config, &cli.env)?;
    config.validate()?;
    Ok(config)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    if config.logging.is_json() {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt().pretty().with_env_filter(filter).with_target(true).init();
    }
}

async fn migrate(config: &AppConfig) -> Result<(), AppError> {
    if config.database.backend == Backend::Memory {
        tracing::info!("In-memory backend has no migrations to run");
        return Ok(());
    }

    let pool = DatabasePool::connect(&config.database).await?;
    coresuit_database::migration::run_migrations(pool.pool()).await?;
    pool.close().await;
    tracing::info!("All migrations applied successfully");
    Ok(())
}
