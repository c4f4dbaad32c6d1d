//! Packtrace Ingest Server
//!
//! Receives replayed network packages, geolocates them and serves the
//! aggregated view polled by the dashboard.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PACKTRACE INGEST                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  POST /api/packages            GET /api/packages            │
//! │        │                              │                     │
//! │        ▼                              ▼                     │
//! │  ┌───────────┐  ┌───────────┐  ┌─────────────┐              │
//! │  │  Ingest   │─▶│  GeoIP    │  │  Aggregate  │              │
//! │  │  Service  │  │  Resolver │  │  (top 5)    │              │
//! │  └─────┬─────┘  └───────────┘  └──────┬──────┘              │
//! │        │ append                       │ snapshot            │
//! │        ▼                              │                     │
//! │  ┌──────────────────────────────────────┐                   │
//! │  │  PackageStore (all + suspicious)     │                   │
//! │  └──────────────────────────────────────┘                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod aggregate;
mod config;
mod error;
mod geo;
mod handlers;
mod ingest;
mod models;
mod store;

use anyhow::Context;
use axum::{
    Router,
    routing::get,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
    services::ServeDir,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

use config::{Config, LogFormat};
use geo::{DisabledResolver, GeoResolver, IpApiResolver};
use ingest::IngestService;
use store::PackageStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    init_tracing(config.log_format);

    tracing::info!("Packtrace ingest server starting...");

    let resolver: Arc<dyn GeoResolver> = if config.geo_lookup_enabled {
        tracing::info!(
            "Geolocation: {} (timeout {}s)",
            config.geo_api_url,
            config.geo_timeout_secs
        );
        Arc::new(IpApiResolver::new(
            &config.geo_api_url,
            Duration::from_secs(config.geo_timeout_secs),
        )?)
    } else {
        tracing::warn!("Geolocation disabled - packages will be stored without location");
        Arc::new(DisabledResolver)
    };

    let state = AppState::new(resolver);

    if let Some(dir) = &config.static_dir {
        tracing::info!("Serving dashboard from {}", dir.display());
    }
    let app = create_router(state, config.static_dir.as_deref());

    // Start server
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {}", addr))?;
    tracing::info!("🚀 Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "packtrace_ingest=debug,tower_http=debug".into());

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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

    tracing::info!("Shutdown signal received");
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PackageStore>,
    pub ingest: Arc<IngestService>,
}

impl AppState {
    /// One store per process, shared by the ingest path and the query path
    pub fn new(resolver: Arc<dyn GeoResolver>) -> Self {
        let store = Arc::new(PackageStore::new());
        let ingest = Arc::new(IngestService::new(Arc::clone(&store), resolver));
        Self { store, ingest }
    }
}

/// Create the main router with all routes
fn create_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health::check))
        .route(
            "/api/packages",
            get(handlers::packages::overview).post(handlers::packages::submit),
        );

    // Dashboard page
    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
