//! Ingest API Client
//!
//! HTTP client that delivers replayed packages to the ingest server, one
//! package per request.

use async_trait::async_trait;
use std::time::Duration;

use crate::dataset::WirePackage;

/// Transport errors (send side)
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),

    #[error("network error: {0}")]
    Network(reqwest::Error),
}

/// Destination for replayed packages
#[async_trait]
pub trait PackageSink: Send + Sync {
    /// Deliver one package and return the HTTP status the receiver answered with
    async fn send(&self, package: &WirePackage) -> Result<u16, TransportError>;
}

/// Ingest client configuration
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Full URL of `POST /api/packages`
    pub endpoint: String,
    pub timeout_seconds: u64,
}

/// Ingest API client
pub struct IngestClient {
    config: IngestConfig,
    http_client: reqwest::Client,
}

impl IngestClient {
    /// Create new ingest client
    pub fn new(config: IngestConfig) -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(TransportError::Client)?;

        Ok(Self { config, http_client })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

#[async_trait]
impl PackageSink for IngestClient {
    async fn send(&self, package: &WirePackage) -> Result<u16, TransportError> {
        let response = self.http_client
            .post(&self.config.endpoint)
            .json(package)
            .send()
            .await
            .map_err(TransportError::Network)?;

        Ok(response.status().as_u16())
    }
}
