//! Server binary for fileconv.
//!
//! A thin shim over the library crate: parse flags, resolve tool candidates
//! from the environment, bind, serve until ctrl-c.

use anyhow::{Context, Result};
use clap::Parser;
use fileconv::config::ToolConfig;
use fileconv::http::{router, AppState};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fileconv", version, about = "HTTP file conversion service")]
struct Args {
    /// Address to bind.
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    host: IpAddr,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 5000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let tools = ToolConfig::from_env();
    tracing::info!(
        ghostscript = ?tools.ghostscript,
        libreoffice = ?tools.libreoffice,
        pdftoppm = ?tools.pdftoppm,
        "resolved external tool candidates"
    );

    let addr = SocketAddr::new(args.host, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "fileconv listening");

    axum::serve(listener, router(AppState::new(tools)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install ctrl-c handler");
        return;
    }
    tracing::info!("shutdown signal received");
}
