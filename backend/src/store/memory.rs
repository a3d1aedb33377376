//! In-process document store for tests and local demos

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{apply_field_write, missing_document, BatchWrite, Collection, DocumentStore};
use crate::error::{AppError, AppResult};

type Documents = BTreeMap<String, Value>;

/// Collections held behind a single lock; a batch is staged on a copy and
/// swapped in only when every write succeeded.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<Collection, Documents>>,
    /// 1-based index of the write that should fail on the next commit, 0 when disarmed
    fail_at: AtomicUsize,
    /// Number of upcoming `list` calls that should fail
    failing_lists: AtomicUsize,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `commit` fail when it reaches write number `index` (0-based)
    pub fn fail_commit_at(&self, index: usize) {
        self.fail_at.store(index + 1, Ordering::SeqCst);
    }

    /// Make the next `count` calls to `list` fail as if the store were unreachable
    pub fn fail_next_lists(&self, count: usize) {
        self.failing_lists.store(count, Ordering::SeqCst);
    }

    /// Number of documents in a collection
    pub async fn count(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .await
            .get(&collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }
}

fn apply_write(collections: &mut HashMap<Collection, Documents>, write: &BatchWrite) -> AppResult<()> {
    match write {
        BatchWrite::Put { collection, id, doc } => {
            collections
                .entry(*collection)
                .or_default()
                .insert(id.clone(), doc.clone());
            Ok(())
        }
        BatchWrite::Delete { collection, id } => {
            if let Some(docs) = collections.get_mut(collection) {
                docs.remove(id);
            }
            Ok(())
        }
        BatchWrite::Replace { collection, id, .. }
        | BatchWrite::Increment { collection, id, .. }
        | BatchWrite::Set { collection, id, .. }
        | BatchWrite::Expect { collection, id, .. } => {
            let doc = collections
                .get_mut(collection)
                .and_then(|docs| docs.get_mut(id))
                .ok_or_else(|| missing_document(write))?;
            apply_field_write(doc, write)
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: Collection, id: &str) -> AppResult<Option<Value>> {
        Ok(self
            .collections
            .read()
            .await
            .get(&collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn list(&self, collection: Collection) -> AppResult<Vec<Value>> {
        let armed = self
            .failing_lists
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if armed {
            return Err(AppError::Internal(format!(
                "injected failure listing {}",
                collection.as_str()
            )));
        }
        Ok(self
            .collections
            .read()
            .await
            .get(&collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn put(&self, collection: Collection, id: &str, doc: Value) -> AppResult<()> {
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .insert(id.to_string(), doc);
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> AppResult<bool> {
        Ok(self
            .collections
            .write()
            .await
            .get_mut(&collection)
            .and_then(|docs| docs.remove(id))
            .is_some())
    }

    async fn commit(&self, writes: Vec<BatchWrite>) -> AppResult<()> {
        let mut guard = self.collections.write().await;
        let fail_at = self.fail_at.swap(0, Ordering::SeqCst);

        let mut staged = guard.clone();
        for (index, write) in writes.iter().enumerate() {
            if fail_at == index + 1 {
                return Err(AppError::BatchFailed(format!(
                    "injected failure at write {} ({}/{})",
                    index,
                    write.collection().as_str(),
                    write.id()
                )));
            }
            apply_write(&mut staged, write)?;
        }

        *guard = staged;
        Ok(())
    }
}
