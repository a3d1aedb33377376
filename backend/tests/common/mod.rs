//! Shared fixtures for backend integration tests

#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use restaurant_inventory_backend::store::Collection;
use restaurant_inventory_backend::{AppState, Config, DocumentStore, MemoryDocumentStore};
use rust_decimal::Decimal;
use shared::{Ingredient, MenuItem, PrepItem};
use uuid::Uuid;

// Helper to create Decimal from string
pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryDocumentStore>,
}

pub async fn test_app() -> TestApp {
    test_app_with(Config::in_memory()).await
}

pub async fn test_app_with(config: Config) -> TestApp {
    let store = Arc::new(MemoryDocumentStore::new());
    let dyn_store: Arc<dyn DocumentStore> = store.clone();
    let state = AppState::new(dyn_store, config).await.unwrap();
    TestApp { state, store }
}

impl TestApp {
    pub async fn seed_ingredient(&self, ingredient: Ingredient) -> Ingredient {
        self.state
            .docs
            .put(Collection::Ingredients, ingredient.id, &ingredient)
            .await
            .unwrap();
        self.refresh().await;
        ingredient
    }

    pub async fn seed_menu_item(&self, item: MenuItem) -> MenuItem {
        self.state
            .docs
            .put(Collection::MenuItems, item.id, &item)
            .await
            .unwrap();
        self.refresh().await;
        item
    }

    pub async fn seed_prep_item(&self, prep: PrepItem) -> PrepItem {
        self.state
            .docs
            .put(Collection::PrepItems, prep.id, &prep)
            .await
            .unwrap();
        self.refresh().await;
        prep
    }

    pub async fn refresh(&self) {
        self.state.catalog.refresh(&self.state.docs).await.unwrap();
    }

    pub async fn ingredient(&self, id: Uuid) -> Ingredient {
        self.state
            .docs
            .require(Collection::Ingredients, id, "Ingredient")
            .await
            .unwrap()
    }

    pub async fn stock_of(&self, id: Uuid) -> Decimal {
        self.ingredient(id).await.current_stock
    }

    pub async fn menu_item(&self, id: Uuid) -> MenuItem {
        self.state
            .docs
            .require(Collection::MenuItems, id, "Menu item")
            .await
            .unwrap()
    }

    pub async fn count(&self, collection: Collection) -> usize {
        self.store.count(collection).await
    }
}
