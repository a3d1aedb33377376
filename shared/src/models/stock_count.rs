//! Stock count submissions

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::UserId;

/// Submission status. Rejection deletes the submission.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    Approved,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Approved => "approved",
        }
    }
}

/// Snapshot of one ingredient at count time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountLine {
    pub ingredient_id: Uuid,
    pub name: String,
    pub system_stock: Decimal,
    /// Fully resolved to base units, prep portions already expanded
    pub counted_stock: Decimal,
    pub unit: String,
    /// Ingredient version when the snapshot was taken
    #[serde(default)]
    pub system_version: i64,
}

impl CountLine {
    pub fn variance(&self) -> Decimal {
        self.counted_stock.saturating_sub(self.system_stock)
    }
}

/// Where a count entry was typed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum CountField {
    Loose { ingredient_id: Uuid },
    Form { ingredient_id: Uuid, form_index: usize },
    Prep { prep_id: Uuid },
}

/// An entry that could not be read as a number and was counted as zero
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnparsedEntry {
    #[serde(flatten)]
    pub field: CountField,
    pub raw: String,
}

/// A physical count waiting for (or past) approval
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockCountSubmission {
    pub id: Uuid,
    pub submitted_by: UserId,
    pub submitted_at: DateTime<Utc>,
    pub status: SubmissionStatus,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub approved_by: Option<UserId>,
    pub items: Vec<CountLine>,
    #[serde(default)]
    pub unparsed: Vec<UnparsedEntry>,
}

impl StockCountSubmission {
    pub fn new(submitted_by: UserId, items: Vec<CountLine>, unparsed: Vec<UnparsedEntry>) -> Self {
        Self {
            id: Uuid::new_v4(),
            submitted_by,
            submitted_at: Utc::now(),
            status: SubmissionStatus::Pending,
            approved_at: None,
            approved_by: None,
            items,
            unparsed,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == SubmissionStatus::Pending
    }
}
