//! HTTP handlers for ingredient endpoints

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{ConvertedQuantity, Ingredient, UnitSelection, ValuationSort};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::ingredient::{IngredientInput, IngredientService};
use crate::services::ReportingService;
use crate::AppState;

#[derive(Deserialize)]
pub struct IngredientQuery {
    pub search: Option<String>,
}

#[derive(Deserialize)]
pub struct ConvertRequest {
    #[serde(default)]
    pub unit: UnitSelection,
    pub quantity: Decimal,
}

#[derive(Deserialize)]
pub struct ValuationQuery {
    #[serde(default)]
    pub sort: ValuationSort,
    pub format: Option<String>, // "json" or "csv"
}

fn service(state: &AppState) -> IngredientService {
    IngredientService::new(state.docs.clone(), state.catalog.clone())
}

/// List ingredients
pub async fn list_ingredients(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<IngredientQuery>,
) -> AppResult<Json<Vec<Ingredient>>> {
    let ingredients = service(&state).list(query.search.as_deref()).await?;
    Ok(Json(ingredients))
}

/// Get one ingredient
pub async fn get_ingredient(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Ingredient>> {
    Ok(Json(service(&state).get(id).await?))
}

/// Create an ingredient
pub async fn create_ingredient(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<IngredientInput>,
) -> AppResult<(StatusCode, Json<Ingredient>)> {
    current_user.0.ensure_admin()?;
    let ingredient = service(&state).create(input).await?;
    Ok((StatusCode::CREATED, Json(ingredient)))
}

/// Update an ingredient
pub async fn update_ingredient(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<IngredientInput>,
) -> AppResult<Json<Ingredient>> {
    current_user.0.ensure_admin()?;
    Ok(Json(service(&state).update(id, input).await?))
}

/// Delete an ingredient
pub async fn delete_ingredient(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    current_user.0.ensure_admin()?;
    service(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Convert a quantity in a form to base units
pub async fn convert_quantity(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<ConvertRequest>,
) -> AppResult<Json<ConvertedQuantity>> {
    let converted = service(&state).convert(id, body.unit, body.quantity).await?;
    Ok(Json(converted))
}

/// Stock value report
pub async fn get_valuation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ValuationQuery>,
) -> AppResult<Response> {
    current_user.0.ensure_admin()?;
    let valuation = service(&state).valuation(query.sort).await?;

    if query.format.as_deref() == Some("csv") {
        let csv = ReportingService::valuation_to_csv(&valuation)?;
        return Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"stock_value.csv\""),
            ],
            csv,
        )
            .into_response());
    }

    Ok(Json(valuation).into_response())
}
