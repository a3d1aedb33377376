//! Variance / activity reports written once per ledger batch

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::UserId;

/// What produced a report
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    StockTake,
    SalesUpload,
    Receiving,
    Other,
}

/// One audited change
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportLine {
    /// Count against system stock
    Variance {
        name: String,
        system: Decimal,
        counted: Decimal,
        variance: Decimal,
        unit: String,
    },
    /// Applied delta
    Change {
        name: String,
        change: Decimal,
        unit: String,
    },
}

impl ReportLine {
    /// Signed quantity delta
    pub fn delta(&self) -> Decimal {
        match self {
            ReportLine::Variance { variance, .. } => *variance,
            ReportLine::Change { change, .. } => *change,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ReportLine::Variance { name, .. } | ReportLine::Change { name, .. } => name,
        }
    }
}

/// Append-only audit record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VarianceReport {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub kind: ReportKind,
    pub title: String,
    pub created_by: UserId,
    pub lines: Vec<ReportLine>,
}

impl VarianceReport {
    pub fn new(kind: ReportKind, title: impl Into<String>, created_by: UserId, lines: Vec<ReportLine>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            kind,
            title: title.into(),
            created_by,
            lines,
        }
    }
}
