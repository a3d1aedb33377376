//! HTTP handlers for prep item endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::PrepItem;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::prep::{PrepItemInput, PrepService};
use crate::AppState;

fn service(state: &AppState) -> PrepService {
    PrepService::new(state.docs.clone(), state.catalog.clone())
}

pub async fn list_prep_items(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<PrepItem>>> {
    Ok(Json(service(&state).list().await?))
}

pub async fn create_prep_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<PrepItemInput>,
) -> AppResult<(StatusCode, Json<PrepItem>)> {
    current_user.0.ensure_admin()?;
    let prep = service(&state).create(input).await?;
    Ok((StatusCode::CREATED, Json(prep)))
}

pub async fn update_prep_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<PrepItemInput>,
) -> AppResult<Json<PrepItem>> {
    current_user.0.ensure_admin()?;
    Ok(Json(service(&state).update(id, input).await?))
}

pub async fn delete_prep_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    current_user.0.ensure_admin()?;
    service(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
