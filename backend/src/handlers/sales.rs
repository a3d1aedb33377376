//! HTTP handlers for sales CSV import

use axum::{extract::State, Json};
use serde::Deserialize;
use shared::SalesRow;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::sales_import::{SalesImportOutcome, SalesImportService, SalesPreview};
use crate::AppState;

#[derive(Deserialize)]
pub struct PreviewSalesRequest {
    pub csv: String,
}

#[derive(Deserialize)]
pub struct ApplySalesRequest {
    pub rows: Vec<SalesRow>,
}

/// Parse a POS export and show which rows match the menu
pub async fn preview_sales(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(body): Json<PreviewSalesRequest>,
) -> AppResult<Json<SalesPreview>> {
    let service = SalesImportService::new(state.docs.clone(), state.catalog.clone());
    Ok(Json(service.preview(&body.csv).await?))
}

/// Deduct stock for the confirmed rows
pub async fn apply_sales(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<ApplySalesRequest>,
) -> AppResult<Json<SalesImportOutcome>> {
    let service = SalesImportService::new(state.docs.clone(), state.catalog.clone());
    let outcome = service.apply(&body.rows, current_user.0.user_id).await?;
    Ok(Json(outcome))
}
