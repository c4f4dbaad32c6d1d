//! Aggregation over a store snapshot

use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{PackageOverview, StoredPackage};
use crate::store::StoreSnapshot;

pub const TOP_COUNTRIES_LIMIT: usize = 5;

/// Most frequent countries across `packages`, highest count first. Equal
/// counts keep the order in which the countries were first seen.
pub fn top_countries(packages: &[Arc<StoredPackage>], limit: usize) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for country in packages.iter().filter_map(|p| p.country()) {
        match index.get(country) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(country, counts.len());
                counts.push((country.to_string(), 1));
            }
        }
    }

    // stable sort keeps first-seen order among ties
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(limit);
    counts
}

/// Build the dashboard view from a snapshot
pub fn overview(snapshot: StoreSnapshot) -> PackageOverview {
    let top_countries = top_countries(&snapshot.all, TOP_COUNTRIES_LIMIT);

    PackageOverview {
        total_received: snapshot.all.len(),
        total_suspicious: snapshot.suspicious.len(),
        last_received: snapshot.all.last().cloned(),
        top_countries,
        all_packages: snapshot.all,
        suspicious_packages: snapshot.suspicious,
    }
}
