//! Search Migrator Main Entry Point
//!
//! Deploys the next schema version of a search index, or loads documents into
//! the index of the current version.

use std::env;

use clap::Parser;
use dotenv::dotenv;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use search_migrator::{Cli, Command, Dependencies, MigrationError, MigratorConfig};

/// Initialize tracing/logging.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("search_migrator=info,search_migrator_repository=info"));

    let json = env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .init();
    }

    info!(
        service_name = "search-migrator",
        service_version = env!("CARGO_PKG_VERSION"),
        json,
        "Tracing initialized"
    );
}

#[tokio::main]
async fn main() -> Result<(), MigrationError> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();
    init_tracing();

    let config = MigratorConfig::from_cli(&cli).map_err(|e| {
        error!(error = %e, "Invalid configuration");
        e
    })?;

    let deps = match Dependencies::new(config) {
        Ok(deps) => deps,
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    let result = match cli.command {
        Command::Deploy => deps.migrator.deploy().await.map(|_| ()),
        Command::Load => deps.migrator.load().await.map(|report| {
            if report.failed() > 0 {
                warn!(
                    failed = report.failed(),
                    total = report.total,
                    errors = ?report.error_counts,
                    "Load completed with failed documents"
                );
            }
        }),
    };

    match result {
        Ok(()) => {
            info!(command = ?cli.command, "Search migrator completed successfully");
            Ok(())
        }
        Err(e) => {
            error!(command = ?cli.command, error = %e, "Search migrator failed");
            Err(e)
        }
    }
}
