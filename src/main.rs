use anyhow::Result;
use axum::Router;
use std::{io::ErrorKind, sync::Arc};
use tokio::{net::TcpListener, signal};
use tracing_subscriber::EnvFilter;

mod config;
mod errors;
mod handlers;
mod models;
mod repository;
mod routes;
mod services;
mod validation;

use repository::{BinRepository, memory::InMemoryBinRepository, mongo::MongoBinRepository};

#[tokio::main]
async fn main() -> Result<()> {
    // .env first, so RUST_LOG from it reaches the filter below
    let dotenv_result = dotenv::dotenv();

    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(err) = dotenv_result {
        tracing::debug!("No .env loaded: {}", err);
    }

    // --- Parse config ---
    let cfg = config::AppConfig::from_env_and_args()?;

    tracing::info!(
        "Starting bin-tracker on {} (store: {})",
        cfg.addr(),
        if cfg.in_memory {
            "in-memory".to_string()
        } else {
            format!(
                "{} {}/{}",
                cfg.redacted_mongo_uri(),
                cfg.database,
                cfg.collection
            )
        }
    );

    // --- Initialize store ---
    let repo: Arc<dyn BinRepository> = if cfg.in_memory {
        tracing::warn!("Using in-memory store; bins are lost on shutdown");
        Arc::new(InMemoryBinRepository::new())
    } else {
        Arc::new(
            MongoBinRepository::connect(&cfg.mongo_uri, &cfg.database, &cfg.collection).await?,
        )
    };

    // --- Initialize core service ---
    let service = services::bin_service::BinService::new(repo);

    // --- Build router ---
    let app: Router = routes::routes::routes().with_state(service);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM. If a handler can't be installed, that
/// branch never resolves and the other still can.
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
            Err(err) => {
                tracing::error!("Failed to listen for Ctrl+C: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
