//! Read-mostly catalog snapshot
//!
//! Screens read ingredients, menu items and prep items from a shared
//! snapshot instead of hitting the store. Every successful write refreshes
//! the snapshot and broadcasts a `CatalogEvent`; a failed refresh leaves the
//! previous snapshot in place.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared::{Ingredient, MenuItem, PrepItem};
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::AppResult;
use crate::store::{Collection, Documents};

const EVENT_CAPACITY: usize = 64;

/// Point-in-time copy of the catalog collections
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub ingredients: Vec<Ingredient>,
    pub menu_items: Vec<MenuItem>,
    pub prep_items: Vec<PrepItem>,
    pub generation: u64,
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl CatalogSnapshot {
    pub fn low_stock(&self) -> impl Iterator<Item = &Ingredient> {
        self.ingredients.iter().filter(|i| i.is_low_stock())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    Refreshed { generation: u64 },
}

pub struct CatalogCache {
    snapshot: RwLock<Arc<CatalogSnapshot>>,
    events: broadcast::Sender<CatalogEvent>,
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogCache {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            snapshot: RwLock::new(Arc::new(CatalogSnapshot::default())),
            events,
        }
    }

    pub async fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.snapshot.read().await.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    /// Reload every catalog collection from the store
    pub async fn refresh(&self, docs: &Documents) -> AppResult<Arc<CatalogSnapshot>> {
        let mut ingredients: Vec<Ingredient> = docs.list(Collection::Ingredients).await?;
        let mut menu_items: Vec<MenuItem> = docs.list(Collection::MenuItems).await?;
        let mut prep_items: Vec<PrepItem> = docs.list(Collection::PrepItems).await?;
        ingredients.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        menu_items.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        prep_items.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

        let mut guard = self.snapshot.write().await;
        let generation = guard.generation + 1;
        let snapshot = Arc::new(CatalogSnapshot {
            ingredients,
            menu_items,
            prep_items,
            generation,
            refreshed_at: Some(Utc::now()),
        });
        *guard = snapshot.clone();
        drop(guard);

        tracing::debug!(
            generation,
            ingredients = snapshot.ingredients.len(),
            menu_items = snapshot.menu_items.len(),
            prep_items = snapshot.prep_items.len(),
            "Catalog refreshed"
        );
        // No subscribers is fine
        let _ = self.events.send(CatalogEvent::Refreshed { generation });

        Ok(snapshot)
    }

    /// Refresh after a committed write. The write already happened, so a
    /// failed reload is logged and left for the next refresh to catch up.
    pub async fn refresh_after_write(&self, docs: &Documents) {
        if let Err(err) = self.refresh(docs).await {
            tracing::warn!(error = %err, "Catalog refresh after commit failed, snapshot is stale");
        }
    }
}

/// Warn once whenever an ingredient drops below its par level
pub fn spawn_low_stock_watcher(cache: Arc<CatalogCache>) -> JoinHandle<()> {
    let mut events = cache.subscribe();
    tokio::spawn(async move {
        let mut flagged: HashSet<Uuid> = HashSet::new();
        loop {
            match events.recv().await {
                Ok(CatalogEvent::Refreshed { .. }) => {
                    let snapshot = cache.snapshot().await;
                    flagged = check_low_stock(&snapshot, &flagged);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Low stock watcher lagged behind catalog events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// Log newly low ingredients and return the current low set
fn check_low_stock(snapshot: &CatalogSnapshot, previously: &HashSet<Uuid>) -> HashSet<Uuid> {
    let mut now_low = HashSet::new();
    for ingredient in snapshot.low_stock() {
        if !previously.contains(&ingredient.id) {
            tracing::warn!(
                ingredient = %ingredient.name,
                current_stock = %ingredient.current_stock,
                min_stock = %ingredient.min_stock,
                unit = %ingredient.unit,
                "Ingredient below par level"
            );
        }
        now_low.insert(ingredient.id);
    }
    now_low
}
