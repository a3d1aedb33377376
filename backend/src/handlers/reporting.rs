//! Reporting handlers for audit reports, activity log and dashboard

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use shared::{ActivityLogEntry, VarianceReport};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::reporting::{DashboardStats, ReportingService};
use crate::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct ReportQuery {
    pub format: Option<String>, // "json" or "csv"
}

fn service(state: &AppState) -> ReportingService {
    ReportingService::new(state.docs.clone(), state.catalog.clone())
}

/// Get dashboard metrics
pub async fn get_dashboard(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<DashboardStats>> {
    Ok(Json(service(&state).dashboard().await?))
}

/// List audit reports
pub async fn list_variance_reports(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<VarianceReport>>> {
    current_user.0.ensure_admin()?;
    Ok(Json(service(&state).variance_reports(query.limit).await?))
}

/// Get one audit report
pub async fn get_variance_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    current_user.0.ensure_admin()?;
    let report = service(&state).variance_report(id).await?;

    if query.format.as_deref() == Some("csv") {
        let csv = ReportingService::report_to_csv(&report)?;
        return Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"report.csv\""),
            ],
            csv,
        )
            .into_response());
    }

    Ok(Json(report).into_response())
}

/// Activity log
pub async fn list_logs(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<ActivityLogEntry>>> {
    current_user.0.ensure_admin()?;
    Ok(Json(service(&state).logs(query.limit).await?))
}
