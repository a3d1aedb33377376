//! HTTP handlers for administrative ledger operations

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::{LedgerService, SessionService};
use crate::AppState;

#[derive(Deserialize)]
pub struct ResetRequest {
    pub pin: String,
}

#[derive(Serialize)]
pub struct ResetResponse {
    pub ingredients_reset: usize,
}

/// Zero all stock; requires an admin session and the PIN again
pub async fn reset_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<ResetRequest>,
) -> AppResult<Json<ResetResponse>> {
    current_user.0.ensure_admin()?;
    SessionService::new(state.docs.clone(), &state.config)
        .verify_pin(&body.pin)
        .await?;

    let batch = LedgerService::new(state.docs.clone(), state.catalog.clone())
        .reset(current_user.0.user_id)
        .await?;

    Ok(Json(ResetResponse {
        ingredients_reset: batch.stock.len(),
    }))
}
