//! Ingestion pipeline
//!
//! validate → stamp → geolocate → store. Geolocation runs before the store
//! lock is taken, so a slow lookup only delays its own submission.

use chrono::Utc;
use std::sync::Arc;
use validator::Validate;

use crate::geo::GeoResolver;
use crate::models::{IngestPackage, StoredPackage};
use crate::store::PackageStore;
use crate::AppResult;

pub struct IngestService {
    store: Arc<PackageStore>,
    resolver: Arc<dyn GeoResolver>,
}

impl IngestService {
    pub fn new(store: Arc<PackageStore>, resolver: Arc<dyn GeoResolver>) -> Self {
        Self { store, resolver }
    }

    /// Accept one package. Fails only on an invalid payload; a failed
    /// geolocation still stores the package, without any location.
    pub async fn submit(&self, package: IngestPackage) -> AppResult<Arc<StoredPackage>> {
        package.validate()?;

        let received_at = Utc::now();

        tracing::trace!(
            ip = %package.ip,
            latitude = package.latitude,
            longitude = package.longitude,
            "Discarding client-declared coordinates"
        );

        let location = self.resolver.resolve(&package.ip).await;
        let stored = self.store.append(StoredPackage::from_submission(package, received_at, location));

        tracing::info!(
            "Received package from {} at {}{}",
            stored.ip,
            stored.server_received_at.to_rfc3339(),
            if stored.is_suspicious() { " [suspicious]" } else { "" }
        );

        Ok(stored)
    }
}
