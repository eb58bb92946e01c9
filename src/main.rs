//! autoroute
//!
//! Serves whatever routes the manifest tree declares.
//!
//! # Architecture Overview
//!
//! ```text
//!   routes/**/*.toml ──▶ discovery ──▶ validator ──▶ binder + composer
//!                                                        │
//!                                   report (✓/✗ table) ◀─┤
//!                                                        ▼
//!   Client ──▶ axum fallback ──▶ DispatchTable ──▶ executor ──▶ handler
//!                   │ unmatched                       │ failure
//!                   ▼                                 ▼
//!              404 page                        500 {"error": ...}
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use autoroute::config::{load_or_default, AppConfig, ConfigSource};
use autoroute::handlers::builtin_registry;
use autoroute::http::HttpServer;
use autoroute::lifecycle::{register_routes, spawn_signal_listener, Registered, Shutdown};
use autoroute::observability::init_logging;

#[derive(Parser)]
#[command(name = "autoroute")]
#[command(about = "Discover route manifests and serve them", long_about = None)]
struct Cli {
    /// Configuration file; defaults apply when it does not exist.
    #[arg(short, long, default_value = "autoroute.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy, Default)]
enum Command {
    /// Register routes and serve them (default)
    #[default]
    Serve,
    /// Register routes, print the report and exit; non-zero if any failed
    Check,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let (config, source) = load_or_default(&cli.config)?;
    init_logging(&config.observability)?;

    tracing::info!("autoroute v{} starting", env!("CARGO_PKG_VERSION"));
    match source {
        ConfigSource::File => tracing::info!(path = %cli.config.display(), "Configuration loaded"),
        ConfigSource::Defaults => {
            tracing::info!(path = %cli.config.display(), "No config file found, using defaults")
        }
    }

    let registry = builtin_registry(&config);
    let registered = register_routes(&config, &registry);
    registered.report.emit();

    match cli.command.unwrap_or_default() {
        Command::Check => {
            let failed = registered.report.len() - registered.report.active_routes();
            Ok(if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Command::Serve => {
            serve(&config, registered).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn serve(config: &AppConfig, registered: Registered) -> Result<(), Box<dyn std::error::Error>> {
    let Registered { table, binder, .. } = registered;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Server running");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, table);
    let signals = spawn_signal_listener(shutdown.clone());

    server.run(listener, shutdown.subscribe()).await?;
    signals.abort();

    binder.flush_all().await;
    tracing::info!("Shutdown complete");
    Ok(())
}
