//! Echo receiver: a minimal upstream that reports its status and echoes JSON.

use clap::Parser;
use tokio::net::TcpListener;

use host_router::http::echo::echo_router;
use host_router::lifecycle::startup;
use host_router::observability::logging;

#[derive(Parser)]
#[command(name = "echo-receiver")]
struct Args {
    /// Port to listen on
    #[arg(default_value_t = 4000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    startup::started_at();
    let args = Args::parse();
    logging::init("info");

    let listener = TcpListener::bind(("0.0.0.0", args.port)).await?;
    tracing::info!(address = %listener.local_addr()?, "Echo receiver listening");

    axum::serve(listener, echo_router())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
