//! Earthquake gateway
//!
//! Serves the record store over HTTP and hosts the background loops that
//! feed it.
//!
//! # Endpoints
//!
//! - `GET /`, `GET /api` - All records (filtered by the magnitude policy, if set)
//! - `POST /add` - Insert one record
//! - `GET /health` - Store reachability and record count
//!
//! # Background tasks
//!
//! - USGS ingestion loop (always)
//! - Random record generator posting to `/add` (when configured)

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;

use std::future::IntoFuture;
use std::time::Duration;

use anyhow::Context;
use quake_ingest::{HttpFeed, IngestConfig, IngestError, Ingester, RetryPolicy};
use quake_sim::{run_generator, GeneratorConfig, RandomReporter, Submitter};
use quake_store::{SharedStore, StoreConfig};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub use config::GatewayConfig;
pub use router::create_router;
pub use state::AppState;

/// Run the gateway until shutdown, or until ingestion fails under the
/// exit policy.
pub async fn run(config: GatewayConfig) -> anyhow::Result<()> {
    let store_config = StoreConfig {
        op_timeout: config.store_timeout,
        ..StoreConfig::default()
    };
    let store = quake_store::connect(&config.store_url, store_config)
        .await
        .with_context(|| format!("failed to open record store at {}", config.store_url))?;

    match store.count().await {
        Ok(records) => info!(records, "Record store ready"),
        Err(e) => warn!(error = %e, "Record store did not answer a count"),
    }

    let listener = TcpListener::bind(config.socket_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.socket_addr()))?;

    serve(config, store, listener).await
}

/// Serve on an already bound listener with an already opened store.
pub async fn serve(config: GatewayConfig, store: SharedStore, listener: TcpListener) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;

    let feed = HttpFeed::new(config.feed_url.clone(), config.feed_timeout)?;
    let mut ingester = Ingester::new(
        feed,
        store.clone(),
        IngestConfig {
            interval: config.ingest_interval,
            failure_policy: config.failure_policy,
            retry: RetryPolicy::default(),
            policy: config.policy,
        },
    );
    let ingestion = tokio::spawn(async move { ingester.run().await });
    let ingestion_abort = ingestion.abort_handle();

    let generator = match config.random_interval {
        Some(interval) => {
            let submitter = Submitter::new(&config::loopback_url_for(addr), Duration::from_secs(10))?;
            let generator_config = GeneratorConfig::new("random", interval);
            Some(tokio::spawn(async move {
                run_generator(RandomReporter::from_entropy(), &submitter, &generator_config).await;
            }))
        }
        None => None,
    };

    let app = create_router(AppState::new(store, config.policy));
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .into_future();

    info!("Listening on {}", addr);

    let outcome = tokio::select! {
        res = server => res.context("HTTP server failed"),
        err = ingestion_failure(ingestion) => Err(err),
    };

    ingestion_abort.abort();
    if let Some(generator) = generator {
        generator.abort();
    }

    info!("Gateway stopped");
    outcome
}

/// Resolves only if ingestion ends with an error or panics.
async fn ingestion_failure(handle: JoinHandle<Result<(), IngestError>>) -> anyhow::Error {
    match handle.await {
        Ok(Ok(())) => {
            info!("Startup ingestion finished");
            std::future::pending().await
        }
        Ok(Err(e)) => anyhow::Error::new(e).context("ingestion stopped under the exit failure policy"),
        Err(e) => anyhow::Error::new(e).context("ingestion task aborted"),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install signal handler");
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
