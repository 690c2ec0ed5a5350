//! Host router server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──▶ http::server ──▶ handlers ──▶ routing::Router ──▶ forwarder ──▶ Host
//!                                                  │
//!                                                  ├─ load_balancer (registry + round robin)
//!                                                  └─ health (active prober | passive breaker)
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use host_router::config::load_config;
use host_router::lifecycle::{signals, startup};
use host_router::observability::{logging, metrics};
use host_router::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "host-router")]
#[command(about = "Round-robin reverse proxy with health checking", long_about = None)]
struct Args {
    /// Path to the JSON (or TOML) configuration file
    #[arg(short, long, default_value = "configs/appconfig.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    startup::started_at();
    let args = Args::parse();

    let config = load_config(&args.config)?;
    logging::init(&config.observability.log_level);

    tracing::info!(
        config = %args.config.display(),
        bind_address = %config.listener.bind_address,
        passive = config.is_passive(),
        "Configuration loaded"
    );

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
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let signal = shutdown.clone();
    tokio::spawn(async move { signals::shutdown_on_ctrl_c(&signal).await });

    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
