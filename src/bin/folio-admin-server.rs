// ABOUTME: Main server binary for the portfolio admin session guard
// ABOUTME: Loads configuration, initializes logging, and serves the HTTP API
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Admin guard server entry point.

use anyhow::{Context, Result};
use clap::Parser;
use folio_admin_guard::config::environment::ServerConfig;
use folio_admin_guard::logging::LoggingConfig;
use folio_admin_guard::routes::{router, ServerResources};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "folio-admin-server",
    about = "Admin authentication backend for the portfolio site",
    version
)]
struct Args {
    /// HTTP port to listen on (overrides HTTP_PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    LoggingConfig::from_env().init()?;

    // Missing secrets abort startup here, before any socket is bound
    let mut config = ServerConfig::from_env()?;
    if let Some(port) = args.port {
        config.http_port = port;
    }
    info!("configuration loaded: {}", config.summary());

    let resources = Arc::new(ServerResources::new(config));
    let addr = SocketAddr::from(([0, 0, 0, 0], resources.config.http_port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "admin guard listening");

    axum::serve(
        listener,
        router(resources).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install ctrl-c handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("failed to install SIGTERM handler: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received ctrl-c, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}
