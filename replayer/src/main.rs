//! Packtrace Replay - Main Entry Point
//!
//! Replays a recorded CSV capture of network packages against the ingest
//! server, keeping the original gaps between packages.

mod client;
mod constants;
mod dataset;
mod replay;

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::watch;

use client::{IngestClient, IngestConfig};
use replay::Replayer;

#[derive(Parser, Debug)]
#[command(name = "packtrace-replay", version, about = "Replay a recorded package capture at its original pacing")]
struct Cli {
    /// CSV capture (header: ip address,Latitude,Longitude,Timestamp,suspicious)
    #[arg(short, long, env = "REPLAY_DATASET", default_value = constants::DEFAULT_DATASET)]
    dataset: PathBuf,

    /// Ingest endpoint receiving one package per POST
    #[arg(short, long, env = "INGEST_URL", default_value = constants::DEFAULT_INGEST_URL)]
    endpoint: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "INGEST_TIMEOUT_SECS", default_value_t = constants::DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    let cli = Cli::parse();

    log::info!("Starting {} v{}...", constants::APP_NAME, constants::APP_VERSION);

    let reader = dataset::open(&cli.dataset)
        .with_context(|| format!("open dataset {}", cli.dataset.display()))?;

    let client = IngestClient::new(IngestConfig {
        endpoint: cli.endpoint.clone(),
        timeout_seconds: cli.timeout_secs,
    })?;

    // Ctrl+C cuts the current pacing sleep short and ends the run
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                log::warn!("Received Ctrl+C, stopping replay...");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => log::error!("Failed to listen for Ctrl+C: {}", e),
        }
    });

    log::info!("Starting to send packages from {}...", cli.dataset.display());
    log::info!("   Target: {}", client.endpoint());

    let summary = Replayer::new(client)
        .run(dataset::rows(reader), shutdown_rx)
        .await;

    log::info!(
        "Replay {}: {} sent, {} rejected, {} failed, {} skipped",
        if summary.interrupted { "interrupted" } else { "finished" },
        summary.sent,
        summary.rejected,
        summary.failed,
        summary.skipped,
    );

    Ok(())
}
