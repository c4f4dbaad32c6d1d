//! Liveness probe

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    packages_received: usize,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (packages_received, _) = state.store.counts();

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        packages_received,
    })
}
