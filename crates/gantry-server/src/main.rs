//! Gantry API server
//!
//! Wires the pieces together: configuration from flags or environment,
//! tracing, the kube-backed control plane, and the axum serve loop with
//! graceful shutdown.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use gantry_api::{AppState, SchemaRegistry};
use gantry_kube::KubeControlPlane;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "gantry-server")]
#[command(version)]
#[command(about = "Workspace orchestration API server", long_about = None)]
struct Config {
    /// Listen port
    #[arg(long, env = "GANTRY_PORT", default_value_t = 8080)]
    port: u16,

    /// Bind address
    #[arg(long, env = "GANTRY_BIND", default_value = "0.0.0.0")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let control = KubeControlPlane::new().await?;
    let state = AppState::new(SchemaRegistry::new(), Arc::new(control));
    let app = gantry_api::router(state);

    let addr = format!("{}:{}", config.bind, config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("gantry api server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
