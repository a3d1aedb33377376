//! Receiving service: commits a staged delivery list into stock

use std::sync::Arc;

use serde::Serialize;
use shared::{plan_receiving, Ingredient, PendingReceipt, ReceivedTotal, UserId};

use crate::catalog::CatalogCache;
use crate::error::AppResult;
use crate::services::LedgerService;
use crate::store::{Collection, Documents};

#[derive(Clone)]
pub struct ReceivingService {
    docs: Documents,
    catalog: Arc<CatalogCache>,
}

#[derive(Debug, Serialize)]
pub struct ReceivingOutcome {
    pub totals: Vec<ReceivedTotal>,
    pub log_message: String,
}

impl ReceivingService {
    pub fn new(docs: Documents, catalog: Arc<CatalogCache>) -> Self {
        Self { docs, catalog }
    }

    /// Consolidate the staged lines and add them to stock atomically.
    ///
    /// On failure nothing is applied and the caller still holds its staged
    /// list, so the same request can simply be retried.
    pub async fn commit(&self, receipts: &[PendingReceipt], actor: UserId) -> AppResult<ReceivingOutcome> {
        let ingredients: Vec<Ingredient> = self.docs.list(Collection::Ingredients).await?;
        let (batch, totals) = plan_receiving(&ingredients, receipts, actor)?;

        LedgerService::new(self.docs.clone(), self.catalog.clone())
            .commit(&batch)
            .await?;

        Ok(ReceivingOutcome {
            totals,
            log_message: batch.log.map(|l| l.message).unwrap_or_default(),
        })
    }
}
