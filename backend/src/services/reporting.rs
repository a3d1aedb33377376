//! Reporting service: audit reports, activity log, dashboard and CSV export

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use shared::{
    ActivityLogEntry, ReportLine, StockCountSubmission, StockValuation, SubmissionStatus,
    VarianceReport,
};
use uuid::Uuid;

use crate::catalog::CatalogCache;
use crate::error::{AppError, AppResult};
use crate::store::{Collection, Documents};

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    docs: Documents,
    catalog: Arc<CatalogCache>,
}

/// Dashboard metrics
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_ingredients: usize,
    pub low_stock: usize,
    pub pending_counts: usize,
    pub menu_items: usize,
    pub stock_value: Decimal,
}

/// Flat CSV row for a report line
#[derive(Debug, Serialize)]
struct ReportCsvRow<'a> {
    name: &'a str,
    system: Option<Decimal>,
    counted: Option<Decimal>,
    change: Decimal,
    unit: &'a str,
}

impl<'a> From<&'a ReportLine> for ReportCsvRow<'a> {
    fn from(line: &'a ReportLine) -> Self {
        match line {
            ReportLine::Variance {
                name,
                system,
                counted,
                variance,
                unit,
            } => ReportCsvRow {
                name,
                system: Some(*system),
                counted: Some(*counted),
                change: *variance,
                unit,
            },
            ReportLine::Change { name, change, unit } => ReportCsvRow {
                name,
                system: None,
                counted: None,
                change: *change,
                unit,
            },
        }
    }
}

impl ReportingService {
    pub fn new(docs: Documents, catalog: Arc<CatalogCache>) -> Self {
        Self { docs, catalog }
    }

    /// Audit reports, newest first
    pub async fn variance_reports(&self, limit: Option<usize>) -> AppResult<Vec<VarianceReport>> {
        let mut reports: Vec<VarianceReport> = self.docs.list(Collection::VarianceReports).await?;
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = limit {
            reports.truncate(limit);
        }
        Ok(reports)
    }

    pub async fn variance_report(&self, id: Uuid) -> AppResult<VarianceReport> {
        self.docs.require(Collection::VarianceReports, id, "Report").await
    }

    /// Activity log, newest first
    pub async fn logs(&self, limit: Option<usize>) -> AppResult<Vec<ActivityLogEntry>> {
        let mut logs: Vec<ActivityLogEntry> = self.docs.list(Collection::Logs).await?;
        logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        if let Some(limit) = limit {
            logs.truncate(limit);
        }
        Ok(logs)
    }

    pub async fn dashboard(&self) -> AppResult<DashboardStats> {
        let snapshot = self.catalog.snapshot().await;
        let submissions: Vec<StockCountSubmission> = self.docs.list(Collection::StockCounts).await?;

        Ok(DashboardStats {
            total_ingredients: snapshot.ingredients.len(),
            low_stock: snapshot.low_stock().count(),
            pending_counts: submissions
                .iter()
                .filter(|s| s.status == SubmissionStatus::Pending)
                .count(),
            menu_items: snapshot.menu_items.len(),
            stock_value: snapshot
                .ingredients
                .iter()
                .map(|i| i.stock_value())
                .fold(Decimal::ZERO, Decimal::saturating_add),
        })
    }

    /// Export a report's lines as CSV
    pub fn report_to_csv(report: &VarianceReport) -> AppResult<String> {
        let rows: Vec<ReportCsvRow<'_>> = report.lines.iter().map(ReportCsvRow::from).collect();
        Self::export_to_csv(&rows)
    }

    /// Export a stock valuation as CSV
    pub fn valuation_to_csv(valuation: &StockValuation) -> AppResult<String> {
        Self::export_to_csv(&valuation.lines)
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}
