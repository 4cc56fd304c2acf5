//! Content forge HTTP server.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use forge_config::ForgeConfig;
use forge_server::bootstrap::build_state;
use forge_server::router;
use forge_telemetry::init_tracing;
use hyper::Server;
use hyper::service::{make_service_fn, service_fn};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "forge-server", about = "Generate content from curated posts with an LLM")]
struct Args {
    /// TOML config file; falls back to $FORGE_CONFIG, then built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Listen address, overriding the config file.
    #[arg(long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = ForgeConfig::load(args.config.as_deref()).context("loading configuration")?;
    init_tracing(&config.telemetry).context("installing the tracing subscriber")?;

    let addr = match args.bind {
        Some(addr) => addr,
        None => config.server.bind_addr()?,
    };

    let state = Arc::new(build_state(&config).await?);
    let make_service = make_service_fn(move |_conn| {
        let state = Arc::clone(&state);
        async move {
            Ok::<_, Infallible>(service_fn(move |request| {
                router::handle(Arc::clone(&state), request)
            }))
        }
    });

    let server = Server::try_bind(&addr)
        .with_context(|| format!("binding {addr}"))?
        .serve(make_service);
    info!(%addr, "listening");

    server
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated with error")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for ctrl-c, shutting down");
        return;
    }
    info!("shutting down");
}
