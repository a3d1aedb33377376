//! Stock-take service: count sheet, submissions, approval and rejection

use std::sync::Arc;

use serde::Serialize;
use shared::{
    plan_approval, reconcile, sheet_sections, ActivityLogEntry, CountEntry, CountSheet, Ingredient,
    PrepItem, SheetSection, StockCountSubmission, SubmissionStatus, UserId, VarianceReport,
};
use uuid::Uuid;

use crate::catalog::CatalogCache;
use crate::error::{AppError, AppResult};
use crate::services::LedgerService;
use crate::store::{BatchWrite, Collection, Documents};

#[derive(Clone)]
pub struct StockTakeService {
    docs: Documents,
    catalog: Arc<CatalogCache>,
    guard_approvals: bool,
}

/// Result of an approval
#[derive(Debug, Serialize)]
pub struct ApprovalOutcome {
    pub submission_id: Uuid,
    pub applied: usize,
    pub report: Option<VarianceReport>,
}

impl StockTakeService {
    pub fn new(docs: Documents, catalog: Arc<CatalogCache>, guard_approvals: bool) -> Self {
        Self {
            docs,
            catalog,
            guard_approvals,
        }
    }

    /// Count sheet grouped by storage area
    pub async fn sheet(&self) -> AppResult<Vec<SheetSection>> {
        let snapshot = self.catalog.snapshot().await;
        Ok(sheet_sections(&snapshot.ingredients, &snapshot.prep_items))
    }

    /// Snapshot a count against the current system stock.
    ///
    /// Every catalog ingredient gets a line, counted or not. Nothing is
    /// written to stock until an admin approves.
    pub async fn submit(&self, entries: &[CountEntry], submitted_by: UserId) -> AppResult<StockCountSubmission> {
        let mut ingredients: Vec<Ingredient> = self.docs.list(Collection::Ingredients).await?;
        ingredients.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        let preps: Vec<PrepItem> = self.docs.list(Collection::PrepItems).await?;

        let sheet = CountSheet::from_entries(entries);
        let items = reconcile(&ingredients, &preps, &sheet)?;
        let submission = StockCountSubmission::new(submitted_by, items, sheet.unparsed);

        self.docs
            .put(Collection::StockCounts, submission.id, &submission)
            .await?;

        tracing::info!(
            submission_id = %submission.id,
            submitted_by = %submission.submitted_by,
            items = submission.items.len(),
            unparsed = submission.unparsed.len(),
            "Stock count submitted"
        );
        Ok(submission)
    }

    /// Submissions, newest first
    pub async fn list(&self, status: Option<SubmissionStatus>) -> AppResult<Vec<StockCountSubmission>> {
        let mut submissions: Vec<StockCountSubmission> = self.docs.list(Collection::StockCounts).await?;
        submissions.retain(|s| status.map_or(true, |wanted| s.status == wanted));
        submissions.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(submissions)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<StockCountSubmission> {
        self.docs.require(Collection::StockCounts, id, "Stock count").await
    }

    /// Overwrite stock with the counted values, flip the submission to
    /// approved and write the variance report, all in one batch. The batch
    /// requires the submission to still be pending when it commits, so a
    /// concurrent second approval fails with a conflict.
    pub async fn approve(&self, id: Uuid, approver: UserId) -> AppResult<ApprovalOutcome> {
        let submission = self.get(id).await?;
        let ingredients: Vec<Ingredient> = self.docs.list(Collection::Ingredients).await?;

        let batch = plan_approval(&submission, &ingredients, approver, self.guard_approvals)?;
        LedgerService::new(self.docs.clone(), self.catalog.clone())
            .commit(&batch)
            .await?;

        Ok(ApprovalOutcome {
            submission_id: id,
            applied: batch.stock.len(),
            report: batch.report,
        })
    }

    /// Discard a pending submission; stock is never touched
    pub async fn reject(&self, id: Uuid, actor: UserId) -> AppResult<()> {
        let submission = self.get(id).await?;
        if !submission.is_pending() {
            return Err(AppError::InvalidStateTransition(format!(
                "Stock count {} is {}",
                id,
                submission.status.as_str()
            )));
        }

        let log = ActivityLogEntry::new(actor, format!("Rejected stock count {}", id));
        self.docs
            .commit(vec![
                // Lost to a concurrent approval or rejection otherwise
                BatchWrite::Expect {
                    collection: Collection::StockCounts,
                    id: id.to_string(),
                    field: "status",
                    value: serde_json::to_value(SubmissionStatus::Pending)?,
                },
                BatchWrite::Delete {
                    collection: Collection::StockCounts,
                    id: id.to_string(),
                },
                BatchWrite::Put {
                    collection: Collection::Logs,
                    id: log.id.to_string(),
                    doc: serde_json::to_value(&log)?,
                },
            ])
            .await?;

        tracing::info!(submission_id = %id, "Stock count rejected");
        Ok(())
    }
}
