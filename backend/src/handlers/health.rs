//! Liveness endpoint

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub store: &'static str,
    /// Bumped on every catalog refresh
    pub catalog_generation: u64,
}

/// Always 200; a dead store is reported in the body
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = match state.docs.store().ping().await {
        Ok(()) => "connected",
        Err(err) => {
            tracing::warn!(error = %err, "Document store ping failed");
            "disconnected"
        }
    };

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        store,
        catalog_generation: state.catalog.snapshot().await.generation,
    })
}
