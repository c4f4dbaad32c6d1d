//! Dashboard query model

use serde::Serialize;
use std::sync::Arc;

use super::StoredPackage;

/// Response body of `GET /api/packages`
#[derive(Debug, Clone, Serialize)]
pub struct PackageOverview {
    pub all_packages: Vec<Arc<StoredPackage>>,
    pub suspicious_packages: Vec<Arc<StoredPackage>>,
    pub total_received: usize,
    pub total_suspicious: usize,
    /// `[country, count]` pairs, most frequent first
    pub top_countries: Vec<(String, usize)>,
    pub last_received: Option<Arc<StoredPackage>>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub status: &'static str,
}
