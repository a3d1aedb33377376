//! Ledger service
//!
//! Single write path for stock movements: commits a planned `LedgerBatch`
//! atomically and refreshes the shared catalog afterwards.

use std::sync::Arc;

use shared::{plan_reset, ActivityLogEntry, Ingredient, LedgerBatch, UserId};

use crate::catalog::CatalogCache;
use crate::error::AppResult;
use crate::store::{Collection, Documents};

#[derive(Clone)]
pub struct LedgerService {
    docs: Documents,
    catalog: Arc<CatalogCache>,
}

impl LedgerService {
    pub fn new(docs: Documents, catalog: Arc<CatalogCache>) -> Self {
        Self { docs, catalog }
    }

    /// Commit every write of `batch` or none of them
    pub async fn commit(&self, batch: &LedgerBatch) -> AppResult<()> {
        let result = self.docs.commit_ledger(batch).await;

        match &result {
            Ok(()) => tracing::info!(
                reason = batch.reason.as_str(),
                actor = %batch.actor,
                stock_writes = batch.stock.len(),
                sold_counts = batch.sold_counts.len(),
                "Ledger batch committed"
            ),
            Err(err) => tracing::warn!(
                reason = batch.reason.as_str(),
                actor = %batch.actor,
                stock_writes = batch.stock.len(),
                error = %err,
                "Ledger batch rejected, nothing applied"
            ),
        }
        result?;

        self.catalog.refresh_after_write(&self.docs).await;
        Ok(())
    }

    /// Zero every ingredient's stock. The caller has already checked the PIN.
    pub async fn reset(&self, actor: UserId) -> AppResult<LedgerBatch> {
        let ingredients: Vec<Ingredient> = self.docs.list(Collection::Ingredients).await?;
        let batch = plan_reset(&ingredients, actor)?;
        self.commit(&batch).await?;
        Ok(batch)
    }

    /// Write a free-standing activity log entry
    pub async fn log(&self, actor: UserId, message: impl Into<String>) -> AppResult<ActivityLogEntry> {
        let entry = ActivityLogEntry::new(actor, message);
        self.docs.put(Collection::Logs, entry.id, &entry).await?;
        Ok(entry)
    }
}
