//! Session handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::error::AppResult;
use crate::services::session::{SessionService, SessionToken};
use crate::AppState;

#[derive(Deserialize, Default)]
pub struct StaffSessionRequest {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Deserialize)]
pub struct AdminSessionRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    pub pin: String,
}

/// Open a staff session
pub async fn create_staff_session(
    State(state): State<AppState>,
    body: Option<Json<StaffSessionRequest>>,
) -> AppResult<(StatusCode, Json<SessionToken>)> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let service = SessionService::new(state.docs.clone(), &state.config);
    let token = service.staff_session(body.user_id)?;
    Ok((StatusCode::CREATED, Json(token)))
}

/// Open an admin session after checking the PIN
pub async fn create_admin_session(
    State(state): State<AppState>,
    Json(body): Json<AdminSessionRequest>,
) -> AppResult<(StatusCode, Json<SessionToken>)> {
    let service = SessionService::new(state.docs.clone(), &state.config);
    let token = service.admin_session(body.user_id, &body.pin).await?;
    Ok((StatusCode::CREATED, Json(token)))
}
