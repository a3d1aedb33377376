//! HTTP handlers for receiving endpoints

use axum::{extract::State, Json};
use serde::Deserialize;
use shared::{lenient_text, parse_quantity, PendingReceipt, UnitSelection};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::receiving::{ReceivingOutcome, ReceivingService};
use crate::AppState;

/// A staged delivery line as typed; unreadable quantities count as zero
#[derive(Deserialize)]
pub struct ReceiptLine {
    pub ingredient_id: Uuid,
    #[serde(default, deserialize_with = "lenient_text")]
    pub quantity: String,
    #[serde(default)]
    pub unit: UnitSelection,
}

#[derive(Deserialize)]
pub struct CommitReceivingRequest {
    pub items: Vec<ReceiptLine>,
}

/// Commit the staged delivery list
pub async fn commit_receiving(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<CommitReceivingRequest>,
) -> AppResult<Json<ReceivingOutcome>> {
    let receipts: Vec<PendingReceipt> = body
        .items
        .iter()
        .map(|line| PendingReceipt {
            ingredient_id: line.ingredient_id,
            quantity: parse_quantity(&line.quantity).value(),
            unit: line.unit,
        })
        .collect();

    let service = ReceivingService::new(state.docs.clone(), state.catalog.clone());
    let outcome = service.commit(&receipts, current_user.0.user_id).await?;
    Ok(Json(outcome))
}
