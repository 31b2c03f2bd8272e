//! typeaheadd — the autocomplete server binary.
//!
//! Wires the store, the snapshot flusher, and the HTTP router together,
//! then serves until a shutdown signal (SIGINT, SIGQUIT, SIGTERM) arrives.
//! Shutdown stops accepting requests, drains in-flight ones, and runs a
//! final full snapshot pass.

mod args;
mod http;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use typeahead_store::{Flusher, Store, StoreConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = args::parse();

    let store = Arc::new(
        Store::open(StoreConfig {
            max_elems: args.max_elems,
            data_dir: args.data_dir.clone(),
            default_locale: args.locale.clone(),
        })
        .context("failed to open store")?,
    );

    let flusher = if args.data_dir.is_some() {
        let persisted = store.persisted_namespaces()?;
        info!(namespaces = persisted.len(), "snapshot tree scanned");
        Some(Flusher::start(Arc::clone(&store), args.snapshot_interval))
    } else {
        info!("no data dir configured, running in-memory only");
        None
    };

    let addr: SocketAddr = format!("{}:{}", args.address, args.port)
        .parse()
        .context("invalid listen address")?;
    info!(%addr, locale = %args.locale, "listening");

    axum::Server::bind(&addr)
        .serve(http::router(Arc::clone(&store)).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(flusher) = flusher {
        flusher.shutdown();
    }
    info!("shutdown complete");
    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt =
        signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
    let mut quit = signal(SignalKind::quit()).expect("failed to install SIGQUIT handler");
    let mut terminate =
        signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

    tokio::select! {
        _ = interrupt.recv() => {}
        _ = quit.recv() => {}
        _ = terminate.recv() => {}
    }
    info!("shutdown signal received");
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
