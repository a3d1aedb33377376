//! Prep item catalog service

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use shared::{validate_composition, CompositionEntry, Ingredient, IngredientIndex, PrepItem, StorageArea};
use uuid::Uuid;
use validator::Validate;

use crate::catalog::CatalogCache;
use crate::error::{AppError, AppResult};
use crate::store::{Collection, Documents};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PrepItemInput {
    #[validate(length(min = 1, max = 120, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    pub storage_area: StorageArea,
    pub composition: Vec<CompositionEntry>,
}

#[derive(Clone)]
pub struct PrepService {
    docs: Documents,
    catalog: Arc<CatalogCache>,
}

impl PrepService {
    pub fn new(docs: Documents, catalog: Arc<CatalogCache>) -> Self {
        Self { docs, catalog }
    }

    pub async fn list(&self) -> AppResult<Vec<PrepItem>> {
        Ok(self.catalog.snapshot().await.prep_items.clone())
    }

    pub async fn create(&self, input: PrepItemInput) -> AppResult<PrepItem> {
        let input = self.prepare(input).await?;
        let mut prep = PrepItem::new(input.name, input.composition);
        prep.storage_area = input.storage_area;

        self.docs.put(Collection::PrepItems, prep.id, &prep).await?;
        tracing::info!(prep_id = %prep.id, name = %prep.name, "Prep item created");

        self.catalog.refresh_after_write(&self.docs).await;
        Ok(prep)
    }

    pub async fn update(&self, id: Uuid, input: PrepItemInput) -> AppResult<PrepItem> {
        let existing: PrepItem = self.docs.require(Collection::PrepItems, id, "Prep item").await?;
        let input = self.prepare(input).await?;

        let updated = PrepItem {
            name: input.name,
            storage_area: input.storage_area,
            composition: input.composition,
            updated_at: Utc::now(),
            ..existing
        };
        self.docs.put(Collection::PrepItems, id, &updated).await?;
        tracing::info!(prep_id = %id, "Prep item updated");

        self.catalog.refresh_after_write(&self.docs).await;
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.docs.delete(Collection::PrepItems, id).await? {
            return Err(AppError::NotFound(format!("Prep item {}", id)));
        }
        tracing::info!(prep_id = %id, "Prep item deleted");
        self.catalog.refresh_after_write(&self.docs).await;
        Ok(())
    }

    async fn prepare(&self, mut input: PrepItemInput) -> AppResult<PrepItemInput> {
        input.name = input.name.trim().to_string();
        input.validate()?;
        validate_composition(&input.composition)
            .map_err(|msg| AppError::validation("composition", msg))?;

        let ingredients: Vec<Ingredient> = self.docs.list(Collection::Ingredients).await?;
        let index = IngredientIndex::new(&ingredients);
        if input
            .composition
            .iter()
            .any(|entry| !index.contains(&entry.ingredient_id))
        {
            return Err(AppError::validation(
                "composition",
                "Composition references an unknown ingredient",
            ));
        }

        Ok(input)
    }
}
