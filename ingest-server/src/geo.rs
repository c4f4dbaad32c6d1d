//! IP geolocation
//!
//! Best-effort lookup used to enrich incoming packages. Every failure mode
//! (an address that is not a literal IP, network error, timeout, non-2xx
//! status, bad body, `"status": "fail"`) ends as `None`; nothing here can
//! reject a submission.

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;

use crate::models::GeoLocation;

#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid geolocation base URL {0:?}")]
    BaseUrl(String),

    #[error("not an IP address: {0:?}")]
    Address(String),

    #[error("upstream returned HTTP {0}")]
    Status(u16),

    #[error("lookup unsuccessful: {0}")]
    Lookup(String),
}

#[async_trait]
pub trait GeoResolver: Send + Sync {
    /// Resolve `ip` to a location, or `None` if it cannot be resolved
    async fn resolve(&self, ip: &str) -> Option<GeoLocation>;
}

/// ip-api.com JSON response
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

impl IpApiResponse {
    fn into_location(self) -> Result<GeoLocation, GeoError> {
        if self.status != "success" {
            return Err(GeoError::Lookup(
                self.message.unwrap_or(self.status),
            ));
        }

        match (self.lat, self.lon) {
            (Some(latitude), Some(longitude)) => Ok(GeoLocation {
                latitude,
                longitude,
                city: self.city,
                country: self.country,
            }),
            _ => Err(GeoError::Lookup("missing coordinates".to_string())),
        }
    }
}

/// Resolver backed by the ip-api.com JSON endpoint
pub struct IpApiResolver {
    base_url: Url,
    http_client: reqwest::Client,
}

impl IpApiResolver {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GeoError> {
        let base_url = Url::parse(base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| GeoError::BaseUrl(base_url.to_string()))?;

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self { base_url, http_client })
    }

    /// `{base_url}/{ip}` with the address as exactly one path segment.
    /// Anything that is not a literal IP address is refused, so the location
    /// always belongs to the declared address.
    fn lookup_url(&self, ip: &str) -> Result<Url, GeoError> {
        let addr: IpAddr = ip
            .trim()
            .parse()
            .map_err(|_| GeoError::Address(ip.to_string()))?;

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GeoError::BaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(&addr.to_string());
        Ok(url)
    }

    async fn lookup(&self, ip: &str) -> Result<GeoLocation, GeoError> {
        let url = self.lookup_url(ip)?;

        let response = self.http_client
            .get(url)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeoError::Status(response.status().as_u16()));
        }

        let body: IpApiResponse = response.json().await?;
        body.into_location()
    }
}

#[async_trait]
impl GeoResolver for IpApiResolver {
    async fn resolve(&self, ip: &str) -> Option<GeoLocation> {
        match self.lookup(ip).await {
            Ok(location) => {
                tracing::debug!(ip, country = ?location.country, "Geolocated");
                Some(location)
            }
            Err(e) => {
                tracing::warn!("Geolocation error for {}: {}", ip, e);
                None
            }
        }
    }
}

/// Resolver that never resolves; used when lookups are turned off
pub struct DisabledResolver;

#[async_trait]
impl GeoResolver for DisabledResolver {
    async fn resolve(&self, _ip: &str) -> Option<GeoLocation> {
        None
    }
}
