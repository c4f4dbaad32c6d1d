//! Package ingest and dashboard query handlers

use axum::{extract::{rejection::JsonRejection, State}, Json};

use crate::{aggregate, AppState, AppResult};
use crate::models::{IngestPackage, PackageOverview, SubmitResponse};

/// Accept one package from a producer
pub async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<IngestPackage>, JsonRejection>,
) -> AppResult<Json<SubmitResponse>> {
    let Json(package) = payload?;

    state.ingest.submit(package).await?;

    Ok(Json(SubmitResponse { status: "success" }))
}

/// Current aggregate view; recomputed on every call
pub async fn overview(State(state): State<AppState>) -> Json<PackageOverview> {
    Json(aggregate::overview(state.store.snapshot()))
}
