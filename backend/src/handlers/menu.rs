//! HTTP handlers for menu item endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::CostedMenuItem;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::menu::{MenuItemInput, MenuService};
use crate::AppState;

fn service(state: &AppState) -> MenuService {
    MenuService::new(state.docs.clone(), state.catalog.clone())
}

/// List menu items with their unit cost
pub async fn list_menu_items(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<CostedMenuItem>>> {
    Ok(Json(service(&state).list().await?))
}

pub async fn get_menu_item(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CostedMenuItem>> {
    Ok(Json(service(&state).get(id).await?))
}

pub async fn create_menu_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<MenuItemInput>,
) -> AppResult<(StatusCode, Json<CostedMenuItem>)> {
    current_user.0.ensure_admin()?;
    let item = service(&state).create(input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update_menu_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<MenuItemInput>,
) -> AppResult<Json<CostedMenuItem>> {
    current_user.0.ensure_admin()?;
    Ok(Json(service(&state).update(id, input).await?))
}

pub async fn delete_menu_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    current_user.0.ensure_admin()?;
    service(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
