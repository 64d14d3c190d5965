//! Request marking service.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                 REQUEST MARK                 │
//!     Client Request     │  ┌─────────┐   ┌────────────┐   ┌─────────┐  │
//!     ───────────────────┼─▶│  http   │──▶│    mark    │──▶│ forward │──┼──▶ Upstream
//!                        │  │ server  │   │ middleware │   │ handler │  │
//!                        │  └─────────┘   └─────┬──────┘   └─────────┘  │
//!                        │                      │ load()                │
//!                        │                      ▼                       │
//!                        │               ┌────────────┐                 │
//!                        │               │ RuleStore  │◀── replace() ───┼─── Refresher ◀── Redis
//!                        │               └────────────┘                 │
//!                        └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use axum::http::Request;
use clap::{Parser, Subcommand};
use serde_json::json;
use tokio::net::TcpListener;

use request_mark::config::{load_config, MarkConfig};
use request_mark::observability::{logging, metrics};
use request_mark::{HttpServer, MarkEngine, Shutdown};

#[derive(Parser)]
#[command(name = "request-mark")]
#[command(about = "Marks HTTP requests for gray-release routing", long_about = None)]
struct Cli {
    /// Configuration file (TOML, or JSON with a .json extension).
    #[arg(short, long, default_value = "request-mark.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the marking proxy (default)
    Serve,
    /// Evaluate the inline rules against a synthetic request
    Check {
        /// Request URI, e.g. "/api/v2/orders?uid=42"
        #[arg(long, default_value = "/")]
        url: String,

        /// Request header as "name:value", repeatable
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Check { url, headers } => check(&config, &url, &headers),
    }
}

async fn serve(config: MarkConfig) -> Result<(), Box<dyn std::error::Error>> {
    logging::init(&config.observability.log_level);

    tracing::info!("request-mark v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::debug!(config = ?config.redacted(), "Configuration loaded");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let server_shutdown = shutdown.subscribe();

    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Shutdown signal received"),
            Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C, shutting down"),
        }
        signal.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn check(
    config: &MarkConfig,
    url: &str,
    headers: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = Request::builder().uri(url);
    for header in headers {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| format!("header `{}` is not in name:value form", header))?;
        builder = builder.header(name.trim(), value.trim());
    }
    let request = builder.body(())?;

    let engine = MarkEngine::from_config(config);
    let decision = match engine.evaluate(&request) {
        Some(mark) => json!({ "marked": true, "rule": mark.rule, "key": mark.key, "value": mark.value }),
        None => json!({ "marked": false }),
    };

    println!("{}", serde_json::to_string_pretty(&decision)?);
    Ok(())
}
