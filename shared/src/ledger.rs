//! Ledger batches
//!
//! A `LedgerBatch` describes every document change of one stock movement:
//! the stock writes, sold-count bumps, the submission status flip, and the
//! audit report and log entry that go with them. The store commits a batch
//! all-or-nothing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::models::{
    ActivityLogEntry, Ingredient, IngredientIndex, ReportKind, StockCountSubmission,
    VarianceReport,
};
use crate::reconciliation::variance_lines;
use crate::types::UserId;

/// How a stock write changes `current_stock`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", content = "amount", rename_all = "snake_case")]
pub enum StockChange {
    /// Signed delta added to whatever the stock is at commit time
    Increment(Decimal),
    /// Absolute overwrite
    Set(Decimal),
}

impl StockChange {
    /// Resulting stock, saturating at the bounds of `Decimal`
    pub fn apply(&self, current: Decimal) -> Decimal {
        match self {
            StockChange::Increment(delta) => current.saturating_add(*delta),
            StockChange::Set(value) => *value,
        }
    }
}

/// A stock write on one ingredient
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockMutation {
    pub ingredient_id: Uuid,
    pub change: StockChange,
    /// Reject the whole batch unless the ingredient is still at this version
    #[serde(default)]
    pub expected_version: Option<i64>,
}

/// Why a batch was written
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LedgerReason {
    Receiving,
    SalesImport,
    StockTakeApproval,
    Reset,
}

impl LedgerReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerReason::Receiving => "receiving",
            LedgerReason::SalesImport => "sales_import",
            LedgerReason::StockTakeApproval => "stock_take_approval",
            LedgerReason::Reset => "reset",
        }
    }
}

/// Sold-count bump on a menu item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoldCountIncrement {
    pub menu_item_id: Uuid,
    pub quantity: i64,
}

/// Status flip of an approved submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmissionApproval {
    pub submission_id: Uuid,
    pub approved_by: UserId,
    pub approved_at: DateTime<Utc>,
}

/// Everything one ledger movement writes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerBatch {
    pub reason: LedgerReason,
    pub actor: UserId,
    pub stock: Vec<StockMutation>,
    #[serde(default)]
    pub sold_counts: Vec<SoldCountIncrement>,
    #[serde(default)]
    pub approval: Option<SubmissionApproval>,
    #[serde(default)]
    pub report: Option<VarianceReport>,
    #[serde(default)]
    pub log: Option<ActivityLogEntry>,
}

impl LedgerBatch {
    pub fn new(reason: LedgerReason, actor: UserId) -> Self {
        Self {
            reason,
            actor,
            stock: Vec::new(),
            sold_counts: Vec::new(),
            approval: None,
            report: None,
            log: None,
        }
    }

    /// Add `delta` to an ingredient, merging with an earlier increment of the same one
    pub fn increment(&mut self, ingredient_id: Uuid, delta: Decimal) -> Result<(), DomainError> {
        let existing = self
            .stock
            .iter_mut()
            .filter(|m| m.ingredient_id == ingredient_id)
            .find_map(|m| match &mut m.change {
                StockChange::Increment(total) => Some(total),
                StockChange::Set(_) => None,
            });
        if let Some(total) = existing {
            *total = total.checked_add(delta).ok_or_else(DomainError::too_large)?;
            return Ok(());
        }
        self.stock.push(StockMutation {
            ingredient_id,
            change: StockChange::Increment(delta),
            expected_version: None,
        });
        Ok(())
    }

    pub fn set(&mut self, ingredient_id: Uuid, value: Decimal, expected_version: Option<i64>) {
        self.stock.push(StockMutation {
            ingredient_id,
            change: StockChange::Set(value),
            expected_version,
        });
    }

    pub fn bump_sold(&mut self, menu_item_id: Uuid, quantity: i64) -> Result<(), DomainError> {
        match self
            .sold_counts
            .iter_mut()
            .find(|s| s.menu_item_id == menu_item_id)
        {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(quantity)
                    .ok_or_else(DomainError::too_large)?;
            }
            None => self.sold_counts.push(SoldCountIncrement {
                menu_item_id,
                quantity,
            }),
        }
        Ok(())
    }

    pub fn with_log(mut self, message: impl Into<String>) -> Self {
        self.log = Some(ActivityLogEntry::new(self.actor.clone(), message));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.stock.is_empty() && self.sold_counts.is_empty() && self.approval.is_none()
    }

    /// Stock mutation targeting `ingredient_id`, if any
    pub fn mutation_for(&self, ingredient_id: &Uuid) -> Option<&StockMutation> {
        self.stock.iter().find(|m| &m.ingredient_id == ingredient_id)
    }
}

/// Overwrite stock with the approved counts.
///
/// Lines whose ingredient has since been deleted are skipped. With
/// `guard_versions` each write requires the ingredient to be unchanged
/// since the count was taken.
pub fn plan_approval(
    submission: &StockCountSubmission,
    ingredients: &[Ingredient],
    approver: UserId,
    guard_versions: bool,
) -> Result<LedgerBatch, DomainError> {
    if !submission.is_pending() {
        return Err(DomainError::SubmissionNotPending(submission.id));
    }

    let index = IngredientIndex::new(ingredients);
    let applied: Vec<_> = submission
        .items
        .iter()
        .filter(|item| index.contains(&item.ingredient_id))
        .cloned()
        .collect();

    let mut batch = LedgerBatch::new(LedgerReason::StockTakeApproval, approver.clone());
    for item in &applied {
        batch.set(
            item.ingredient_id,
            item.counted_stock,
            guard_versions.then_some(item.system_version),
        );
    }

    let lines = variance_lines(&applied);
    let title = format!(
        "Stock Take {}",
        submission.submitted_at.format("%Y-%m-%d %H:%M")
    );
    let message = format!(
        "Approved stock count {} ({} items, {} variances)",
        submission.id,
        applied.len(),
        lines.len()
    );
    batch.report = Some(VarianceReport::new(
        ReportKind::StockTake,
        title,
        approver.clone(),
        lines,
    ));
    batch.approval = Some(SubmissionApproval {
        submission_id: submission.id,
        approved_by: approver,
        approved_at: Utc::now(),
    });
    Ok(batch.with_log(message))
}

/// Set every ingredient's stock to zero
pub fn plan_reset(ingredients: &[Ingredient], actor: UserId) -> Result<LedgerBatch, DomainError> {
    if ingredients.is_empty() {
        return Err(DomainError::EmptyBatch);
    }
    let mut batch = LedgerBatch::new(LedgerReason::Reset, actor);
    for ing in ingredients {
        batch.set(ing.id, Decimal::ZERO, None);
    }
    let message = format!("Reset stock to zero for {} ingredients", ingredients.len());
    Ok(batch.with_log(message))
}
