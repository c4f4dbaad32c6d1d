//! Pacing replay loop
//!
//! Sends decoded packages in dataset order, sleeping between sends for the
//! gap between their recorded timestamps so the receiver sees the original
//! arrival rhythm.

use std::time::Duration;
use tokio::sync::watch;

use crate::client::PackageSink;
use crate::dataset::{self, DecodeError, RawRow};

/// Outcome counters for one replay run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Delivered and acknowledged with a 2xx status
    pub sent: usize,
    /// Delivered but answered with a non-2xx status
    pub rejected: usize,
    /// Transport failures
    pub failed: usize,
    /// Rows that did not decode
    pub skipped: usize,
    /// Stopped early by the shutdown signal
    pub interrupted: bool,
}

/// Wait before sending a package stamped `current`, given the timestamp of
/// the previously decoded package. `None` means send now.
pub fn pacing_delay(previous: Option<i64>, current: i64) -> Option<Duration> {
    let delay = current - previous?;
    (delay > 0).then(|| Duration::from_secs(delay as u64))
}

pub struct Replayer<S> {
    sink: S,
}

impl<S: PackageSink> Replayer<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Replay `rows` once, start to finish. Decode and transport failures are
    /// logged and skipped; only the shutdown signal ends the run early.
    pub async fn run<I>(&self, rows: I, mut shutdown: watch::Receiver<bool>) -> ReplaySummary
    where
        I: IntoIterator<Item = Result<RawRow, DecodeError>>,
    {
        let mut summary = ReplaySummary::default();
        let mut previous: Option<i64> = None;

        for (index, row) in rows.into_iter().enumerate() {
            if *shutdown.borrow() {
                summary.interrupted = true;
                break;
            }

            let package = match row.and_then(|raw| dataset::decode(&raw)) {
                Ok(package) => package,
                Err(e) => {
                    log::warn!("Skipping row {}: {}", index + 1, e);
                    summary.skipped += 1;
                    continue;
                }
            };

            if let Some(delay) = pacing_delay(previous, package.timestamp) {
                log::info!("Waiting {} seconds before next package...", delay.as_secs());
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = wait_for_shutdown(&mut shutdown) => {
                        summary.interrupted = true;
                        break;
                    }
                }
            }

            match self.sink.send(&package).await {
                Ok(status) if (200..300).contains(&status) => {
                    log::info!("Sent package from {} - Status: {}", package.ip, status);
                    summary.sent += 1;
                }
                Ok(status) => {
                    log::warn!("Sent package from {} - Status: {}", package.ip, status);
                    summary.rejected += 1;
                }
                Err(e) => {
                    log::error!("Failed to send package from {}: {}", package.ip, e);
                    summary.failed += 1;
                }
            }

            // pacing follows dataset time, not delivery success
            previous = Some(package.timestamp);
        }

        summary
    }
}

/// Resolves once shutdown is requested. A dropped sender never resolves.
async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    let closed = shutdown.wait_for(|stop| *stop).await.is_err();
    if closed {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests;
