//! Settings handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::SessionService;
use crate::AppState;

#[derive(Deserialize)]
pub struct ChangePinRequest {
    pub current_pin: String,
    pub new_pin: String,
    pub confirm_pin: String,
}

/// Change the admin PIN
pub async fn change_pin(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<ChangePinRequest>,
) -> AppResult<StatusCode> {
    current_user.0.ensure_admin()?;
    let service = SessionService::new(state.docs.clone(), &state.config);
    service
        .change_pin(
            current_user.0.user_id,
            &body.current_pin,
            &body.new_pin,
            &body.confirm_pin,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
