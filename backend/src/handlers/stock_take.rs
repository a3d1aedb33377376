//! HTTP handlers for stock-take endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::{CountEntry, SheetSection, StockCountSubmission, SubmissionStatus};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::stock_take::{ApprovalOutcome, StockTakeService};
use crate::AppState;

#[derive(Deserialize)]
pub struct SubmitCountRequest {
    #[serde(default)]
    pub entries: Vec<CountEntry>,
}

#[derive(Deserialize)]
pub struct SubmissionQuery {
    pub status: Option<SubmissionStatus>,
}

fn service(state: &AppState) -> StockTakeService {
    StockTakeService::new(
        state.docs.clone(),
        state.catalog.clone(),
        state.config.ledger.guard_approvals,
    )
}

/// Count sheet grouped by storage area
pub async fn get_sheet(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<SheetSection>>> {
    Ok(Json(service(&state).sheet().await?))
}

/// Submit a physical count for approval
pub async fn submit_count(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<SubmitCountRequest>,
) -> AppResult<(StatusCode, Json<StockCountSubmission>)> {
    let submission = service(&state)
        .submit(&body.entries, current_user.0.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

pub async fn list_submissions(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<SubmissionQuery>,
) -> AppResult<Json<Vec<StockCountSubmission>>> {
    current_user.0.ensure_admin()?;
    Ok(Json(service(&state).list(query.status).await?))
}

pub async fn get_submission(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<StockCountSubmission>> {
    current_user.0.ensure_admin()?;
    Ok(Json(service(&state).get(id).await?))
}

/// Approve a pending count, overwriting stock with the counted values
pub async fn approve_submission(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApprovalOutcome>> {
    current_user.0.ensure_admin()?;
    let outcome = service(&state).approve(id, current_user.0.user_id).await?;
    Ok(Json(outcome))
}

/// Reject (delete) a pending count
pub async fn reject_submission(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    current_user.0.ensure_admin()?;
    service(&state).reject(id, current_user.0.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
