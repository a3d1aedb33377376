//! Sales CSV import
//!
//! Two steps: `preview` parses a POS export and matches rows against the
//! menu; `apply` deducts stock for the matched rows in one ledger batch.

use std::sync::Arc;

use csv::{ReaderBuilder, Trim};
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use shared::{
    match_sales_rows, numeric_prefix, plan_sales_import, Ingredient, MatchedSalesRow, MenuItem,
    SalesRow, UserId, VarianceReport,
};

use crate::catalog::CatalogCache;
use crate::error::{AppError, AppResult};
use crate::services::LedgerService;
use crate::store::{Collection, Documents};

#[derive(Clone)]
pub struct SalesImportService {
    docs: Documents,
    catalog: Arc<CatalogCache>,
}

#[derive(Debug, Serialize)]
pub struct SalesPreview {
    pub rows: Vec<MatchedSalesRow>,
    pub matched: usize,
    pub unknown: usize,
}

#[derive(Debug, Serialize)]
pub struct SalesImportOutcome {
    pub matched: usize,
    pub unknown: Vec<String>,
    pub report: Option<VarianceReport>,
}

impl SalesImportService {
    pub fn new(docs: Documents, catalog: Arc<CatalogCache>) -> Self {
        Self { docs, catalog }
    }

    /// Read (quantity, item name) pairs from a POS export.
    ///
    /// Rows up to and including the first line mentioning both "name" and
    /// "total" are treated as header. Quantity may sit in either of the
    /// first two columns. Rows without a readable quantity or a name are
    /// skipped.
    pub fn parse_rows(text: &str) -> AppResult<Vec<SalesRow>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(text.as_bytes());

        let mut records = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| AppError::validation("csv", format!("Unreadable CSV: {}", e)))?;
            records.push(record);
        }

        let start = records
            .iter()
            .position(|r| {
                let line = r.iter().collect::<Vec<_>>().join(",").to_lowercase();
                line.contains("name") && line.contains("total")
            })
            .map_or(0, |header| header + 1);

        let rows = records[start..]
            .iter()
            .filter(|r| r.len() >= 2)
            .filter_map(|r| {
                let (first, second) = (r.get(0).unwrap_or(""), r.get(1).unwrap_or(""));
                let (qty, name) = match whole_quantity(first) {
                    Some(qty) => (Some(qty), second),
                    None => (whole_quantity(second), first),
                };
                let name = name.trim();
                match qty {
                    Some(qty) if !name.is_empty() => Some(SalesRow {
                        qty,
                        name: name.to_string(),
                    }),
                    _ => None,
                }
            })
            .collect();

        Ok(rows)
    }

    /// Parse and match without touching stock
    pub async fn preview(&self, text: &str) -> AppResult<SalesPreview> {
        let rows = Self::parse_rows(text)?;
        let snapshot = self.catalog.snapshot().await;
        let rows = match_sales_rows(&rows, &snapshot.menu_items);
        let matched = rows.iter().filter(|r| r.is_found()).count();

        Ok(SalesPreview {
            unknown: rows.len() - matched,
            matched,
            rows,
        })
    }

    /// Deduct stock for every row that matches a menu item
    pub async fn apply(&self, rows: &[SalesRow], actor: UserId) -> AppResult<SalesImportOutcome> {
        let menu: Vec<MenuItem> = self.docs.list(Collection::MenuItems).await?;
        let ingredients: Vec<Ingredient> = self.docs.list(Collection::Ingredients).await?;

        let matched_rows = match_sales_rows(rows, &menu);
        let unknown: Vec<String> = matched_rows
            .iter()
            .filter(|r| !r.is_found())
            .map(|r| r.name.clone())
            .collect();
        if !unknown.is_empty() {
            tracing::debug!(unknown = ?unknown, "Skipping unknown sales rows");
        }

        let batch = plan_sales_import(&matched_rows, &menu, &ingredients, actor)?;
        LedgerService::new(self.docs.clone(), self.catalog.clone())
            .commit(&batch)
            .await?;

        Ok(SalesImportOutcome {
            matched: matched_rows.len() - unknown.len(),
            unknown,
            report: batch.report,
        })
    }
}

/// Integer read the way POS exports are read: leading digits, fraction dropped
fn whole_quantity(raw: &str) -> Option<i64> {
    numeric_prefix(raw).and_then(|q| q.trunc().to_i64())
}
