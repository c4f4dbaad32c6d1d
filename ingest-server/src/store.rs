//! In-memory package store
//!
//! Holds the main log of every accepted package plus the suspicious log, an
//! index over the same `Arc`s. Both logs sit behind one lock so a reader
//! never sees them out of step. Retention is unbounded for the life of the
//! process.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::models::StoredPackage;

#[derive(Default)]
struct Logs {
    all: Vec<Arc<StoredPackage>>,
    suspicious: Vec<Arc<StoredPackage>>,
}

/// Point-in-time copy of both logs
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    pub all: Vec<Arc<StoredPackage>>,
    pub suspicious: Vec<Arc<StoredPackage>>,
}

#[derive(Default)]
pub struct PackageStore {
    logs: RwLock<Logs>,
}

impl PackageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a package to the main log, and to the suspicious log when it
    /// is flagged. Both pushes happen under a single write lock.
    pub fn append(&self, package: StoredPackage) -> Arc<StoredPackage> {
        let package = Arc::new(package);
        let mut logs = self.logs.write();

        logs.all.push(Arc::clone(&package));
        if package.is_suspicious() {
            logs.suspicious.push(Arc::clone(&package));
        }

        package
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        let logs = self.logs.read();
        StoreSnapshot {
            all: logs.all.clone(),
            suspicious: logs.suspicious.clone(),
        }
    }

    /// (total received, total suspicious)
    pub fn counts(&self) -> (usize, usize) {
        let logs = self.logs.read();
        (logs.all.len(), logs.suspicious.len())
    }
}
