//! Document store
//!
//! All inventory state lives in tenant-scoped collections of JSON documents.
//! Reads are plain lookups; every stock movement goes through `commit`, which
//! applies a batch of writes all-or-nothing.

mod memory;
mod postgres;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use shared::{LedgerBatch, StockChange, SubmissionStatus};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Named collections under a tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Ingredients,
    MenuItems,
    PrepItems,
    StockCounts,
    VarianceReports,
    Logs,
    Settings,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Ingredients => "ingredients",
            Collection::MenuItems => "menu_items",
            Collection::PrepItems => "prep_items",
            Collection::StockCounts => "stockCounts",
            Collection::VarianceReports => "variance_reports",
            Collection::Logs => "logs",
            Collection::Settings => "app_settings",
        }
    }
}

pub const STOCK_FIELD: &str = "current_stock";
pub const VERSION_FIELD: &str = "version";
pub const UPDATED_AT_FIELD: &str = "updated_at";
pub const SOLD_COUNT_FIELD: &str = "sold_count";

/// Fields only the ledger may write on an ingredient
pub const INGREDIENT_LEDGER_FIELDS: &[&str] = &[STOCK_FIELD, VERSION_FIELD];
/// Fields only the ledger may write on a menu item
pub const MENU_LEDGER_FIELDS: &[&str] = &[SOLD_COUNT_FIELD];

/// One write inside an atomic batch
#[derive(Debug, Clone, PartialEq)]
pub enum BatchWrite {
    /// Create or replace a whole document
    Put {
        collection: Collection,
        id: String,
        doc: Value,
    },
    /// Replace an existing document, carrying `preserve` fields over from
    /// the committed version
    Replace {
        collection: Collection,
        id: String,
        doc: Value,
        preserve: &'static [&'static str],
    },
    Delete {
        collection: Collection,
        id: String,
    },
    /// Add `by` to a numeric field as of commit time
    Increment {
        collection: Collection,
        id: String,
        field: &'static str,
        by: Decimal,
        bump_version: bool,
    },
    /// Overwrite a single field
    Set {
        collection: Collection,
        id: String,
        field: &'static str,
        value: Value,
        /// Fail the batch unless the document's `version` still matches
        expected_version: Option<i64>,
        bump_version: bool,
    },
    /// Fail the batch with a conflict unless `field` still holds `value`.
    /// Writes nothing.
    Expect {
        collection: Collection,
        id: String,
        field: &'static str,
        value: Value,
    },
}

impl BatchWrite {
    pub fn collection(&self) -> Collection {
        match self {
            BatchWrite::Put { collection, .. }
            | BatchWrite::Replace { collection, .. }
            | BatchWrite::Delete { collection, .. }
            | BatchWrite::Increment { collection, .. }
            | BatchWrite::Set { collection, .. }
            | BatchWrite::Expect { collection, .. } => *collection,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            BatchWrite::Put { id, .. }
            | BatchWrite::Replace { id, .. }
            | BatchWrite::Delete { id, .. }
            | BatchWrite::Increment { id, .. }
            | BatchWrite::Set { id, .. }
            | BatchWrite::Expect { id, .. } => id,
        }
    }
}

/// Storage backend for inventory documents
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: Collection, id: &str) -> AppResult<Option<Value>>;

    async fn list(&self, collection: Collection) -> AppResult<Vec<Value>>;

    async fn put(&self, collection: Collection, id: &str, doc: Value) -> AppResult<()>;

    /// Returns false when no document existed
    async fn delete(&self, collection: Collection, id: &str) -> AppResult<bool>;

    /// Apply every write or none of them
    async fn commit(&self, writes: Vec<BatchWrite>) -> AppResult<()>;

    /// Cheap liveness check
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Typed access to a `DocumentStore`
#[derive(Clone)]
pub struct Documents {
    store: Arc<dyn DocumentStore>,
}

impl Documents {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> AppResult<Option<T>> {
        self.get_raw(collection, &id.to_string()).await
    }

    pub async fn get_raw<T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: &str,
    ) -> AppResult<Option<T>> {
        match self.store.get(collection, id).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    /// Fetch a document or fail with `NotFound(label)`
    pub async fn require<T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: Uuid,
        label: &str,
    ) -> AppResult<T> {
        self.get(collection, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} {}", label, id)))
    }

    pub async fn list<T: DeserializeOwned>(&self, collection: Collection) -> AppResult<Vec<T>> {
        self.store
            .list(collection)
            .await?
            .into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(AppError::from))
            .collect()
    }

    pub async fn put<T: Serialize>(&self, collection: Collection, id: Uuid, doc: &T) -> AppResult<()> {
        self.put_raw(collection, &id.to_string(), doc).await
    }

    pub async fn put_raw<T: Serialize>(
        &self,
        collection: Collection,
        id: &str,
        doc: &T,
    ) -> AppResult<()> {
        self.store.put(collection, id, serde_json::to_value(doc)?).await
    }

    pub async fn delete(&self, collection: Collection, id: Uuid) -> AppResult<bool> {
        self.store.delete(collection, &id.to_string()).await
    }

    pub async fn commit(&self, writes: Vec<BatchWrite>) -> AppResult<()> {
        self.store.commit(writes).await
    }

    /// Commit every document change of a ledger movement in one batch
    pub async fn commit_ledger(&self, batch: &LedgerBatch) -> AppResult<()> {
        self.commit(ledger_writes(batch)?).await
    }
}

/// Translate a ledger batch into store writes
pub fn ledger_writes(batch: &LedgerBatch) -> AppResult<Vec<BatchWrite>> {
    let mut writes = Vec::with_capacity(batch.stock.len() + batch.sold_counts.len() + 6);

    // A submission is approved at most once
    if let Some(approval) = &batch.approval {
        writes.push(BatchWrite::Expect {
            collection: Collection::StockCounts,
            id: approval.submission_id.to_string(),
            field: "status",
            value: serde_json::to_value(SubmissionStatus::Pending)?,
        });
    }

    for mutation in &batch.stock {
        let id = mutation.ingredient_id.to_string();
        writes.push(match mutation.change {
            StockChange::Increment(delta) => BatchWrite::Increment {
                collection: Collection::Ingredients,
                id,
                field: STOCK_FIELD,
                by: delta,
                bump_version: true,
            },
            StockChange::Set(value) => BatchWrite::Set {
                collection: Collection::Ingredients,
                id,
                field: STOCK_FIELD,
                value: serde_json::to_value(value)?,
                expected_version: mutation.expected_version,
                bump_version: true,
            },
        });
    }

    for sold in &batch.sold_counts {
        writes.push(BatchWrite::Increment {
            collection: Collection::MenuItems,
            id: sold.menu_item_id.to_string(),
            field: SOLD_COUNT_FIELD,
            by: Decimal::from(sold.quantity),
            bump_version: false,
        });
    }

    if let Some(approval) = &batch.approval {
        let id = approval.submission_id.to_string();
        let fields = [
            ("status", serde_json::to_value(SubmissionStatus::Approved)?),
            ("approved_at", serde_json::to_value(approval.approved_at)?),
            ("approved_by", serde_json::to_value(&approval.approved_by)?),
        ];
        for (field, value) in fields {
            writes.push(BatchWrite::Set {
                collection: Collection::StockCounts,
                id: id.clone(),
                field,
                value,
                expected_version: None,
                bump_version: false,
            });
        }
    }

    if let Some(report) = &batch.report {
        writes.push(BatchWrite::Put {
            collection: Collection::VarianceReports,
            id: report.id.to_string(),
            doc: serde_json::to_value(report)?,
        });
    }

    if let Some(log) = &batch.log {
        writes.push(BatchWrite::Put {
            collection: Collection::Logs,
            id: log.id.to_string(),
            doc: serde_json::to_value(log)?,
        });
    }

    Ok(writes)
}

/// Read a numeric JSON field that may be stored as a string or a number
fn decimal_field(doc: &Value, field: &str) -> AppResult<Decimal> {
    use std::str::FromStr;

    match doc.get(field) {
        None | Some(Value::Null) => Ok(Decimal::ZERO),
        Some(Value::String(s)) => Decimal::from_str(s)
            .map_err(|e| AppError::Internal(format!("Field {} is not numeric: {}", field, e))),
        Some(Value::Number(n)) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .map_err(|e| AppError::Internal(format!("Field {} is not numeric: {}", field, e))),
        Some(other) => Err(AppError::Internal(format!(
            "Field {} is not numeric: {}",
            field, other
        ))),
    }
}

/// Encode an incremented value the way the field was stored
fn encode_like(previous: Option<&Value>, value: Decimal) -> AppResult<Value> {
    match previous {
        Some(Value::Number(_)) if value.fract().is_zero() => {
            let whole = i64::try_from(value).map_err(|e| AppError::Internal(e.to_string()))?;
            Ok(Value::from(whole))
        }
        _ => Ok(serde_json::to_value(value.normalize())?),
    }
}

/// Error for a field write whose document is gone. An `Expect` on a
/// vanished document is a lost race, not a broken batch.
pub(crate) fn missing_document(write: &BatchWrite) -> AppError {
    let (collection, id) = (write.collection(), write.id());
    match write {
        BatchWrite::Expect { .. } => AppError::conflict(
            collection.as_str(),
            format!("{} no longer exists", id),
        ),
        _ => AppError::BatchFailed(format!("{}/{} does not exist", collection.as_str(), id)),
    }
}

/// Apply a `Replace`, `Increment`, `Set` or `Expect` to a document already
/// read inside the batch
pub(crate) fn apply_field_write(doc: &mut Value, write: &BatchWrite) -> AppResult<()> {
    match write {
        BatchWrite::Replace {
            doc: replacement,
            preserve,
            ..
        } => {
            let mut next = replacement.clone();
            for field in preserve.iter() {
                if let Some(value) = doc.get(*field) {
                    set_field(&mut next, field, value.clone())?;
                }
            }
            *doc = next;
        }
        BatchWrite::Increment {
            field,
            by,
            bump_version,
            ..
        } => {
            let current = decimal_field(doc, field)?;
            let next = current
                .checked_add(*by)
                .ok_or_else(|| AppError::validation(*field, "Quantity is too large"))?;
            let encoded = encode_like(doc.get(*field), next)?;
            set_field(doc, field, encoded)?;
            if *bump_version {
                bump_version_of(doc)?;
            }
        }
        BatchWrite::Set {
            collection,
            id,
            field,
            value,
            expected_version,
            bump_version,
        } => {
            if let Some(expected) = expected_version {
                let actual = doc.get(VERSION_FIELD).and_then(Value::as_i64).unwrap_or(0);
                if actual != *expected {
                    return Err(AppError::conflict(
                        collection.as_str(),
                        format!(
                            "{} changed since it was counted (version {} != {})",
                            id, actual, expected
                        ),
                    ));
                }
            }
            set_field(doc, field, value.clone())?;
            if *bump_version {
                bump_version_of(doc)?;
            }
        }
        BatchWrite::Expect {
            collection,
            id,
            field,
            value,
        } => {
            let actual = doc.get(*field).unwrap_or(&Value::Null);
            if actual != value {
                return Err(AppError::conflict(
                    collection.as_str(),
                    format!("{} has {} {}, expected {}", id, field, actual, value),
                ));
            }
        }
        BatchWrite::Put { .. } | BatchWrite::Delete { .. } => {}
    }
    Ok(())
}

fn set_field(doc: &mut Value, field: &str, value: Value) -> AppResult<()> {
    let object = doc
        .as_object_mut()
        .ok_or_else(|| AppError::Internal("Stored document is not an object".to_string()))?;
    object.insert(field.to_string(), value);
    Ok(())
}

fn bump_version_of(doc: &mut Value) -> AppResult<()> {
    let version = doc.get(VERSION_FIELD).and_then(Value::as_i64).unwrap_or(0);
    set_field(doc, VERSION_FIELD, Value::from(version + 1))?;
    set_field(doc, UPDATED_AT_FIELD, serde_json::to_value(chrono::Utc::now())?)
}
