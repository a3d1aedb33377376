//! Ingredient catalog service

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    convert_to_base, stock_valuation, validate_forms, validate_ingredient_numbers,
    ConvertedQuantity, Ingredient, StockValuation, StorageArea, UnitForm, UnitSelection,
    ValuationSort,
};
use uuid::Uuid;
use validator::Validate;

use crate::catalog::CatalogCache;
use crate::error::{AppError, AppResult};
use crate::store::{BatchWrite, Collection, Documents, INGREDIENT_LEDGER_FIELDS};

/// Create/update payload. Stock is not part of it: new ingredients start at
/// zero and only ledger batches move them.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct IngredientInput {
    #[validate(length(min = 1, max = 120, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 20, message = "Unit is required"))]
    pub unit: String,
    pub cost: Decimal,
    #[serde(default)]
    pub min_stock: Decimal,
    #[serde(default)]
    pub moq: Decimal,
    #[serde(default)]
    pub storage_area: StorageArea,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub forms: Vec<UnitForm>,
}

impl IngredientInput {
    fn normalized(mut self) -> AppResult<Self> {
        self.name = self.name.trim().to_string();
        self.unit = self.unit.trim().to_string();
        self.supplier = self
            .supplier
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        for form in &mut self.forms {
            form.name = form.name.trim().to_string();
        }

        self.validate()?;
        validate_ingredient_numbers(self.cost, self.min_stock, self.moq)
            .map_err(|msg| AppError::validation("ingredient", msg))?;
        validate_forms(&self.forms).map_err(|msg| AppError::validation("forms", msg))?;
        Ok(self)
    }
}

#[derive(Clone)]
pub struct IngredientService {
    docs: Documents,
    catalog: Arc<CatalogCache>,
}

impl IngredientService {
    pub fn new(docs: Documents, catalog: Arc<CatalogCache>) -> Self {
        Self { docs, catalog }
    }

    /// Catalog ingredients, optionally filtered by name/supplier substring
    pub async fn list(&self, search: Option<&str>) -> AppResult<Vec<Ingredient>> {
        let snapshot = self.catalog.snapshot().await;
        Ok(snapshot
            .ingredients
            .iter()
            .filter(|i| search.map_or(true, |needle| i.matches_search(needle)))
            .cloned()
            .collect())
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Ingredient> {
        self.docs.require(Collection::Ingredients, id, "Ingredient").await
    }

    pub async fn create(&self, input: IngredientInput) -> AppResult<Ingredient> {
        let input = input.normalized()?;
        self.ensure_unique_name(&input.name, None).await?;

        let mut ingredient = Ingredient::new(input.name, input.unit, input.cost)
            .with_forms(input.forms)
            .in_area(input.storage_area);
        ingredient.min_stock = input.min_stock;
        ingredient.moq = input.moq;
        ingredient.supplier = input.supplier;

        self.docs
            .put(Collection::Ingredients, ingredient.id, &ingredient)
            .await?;
        tracing::info!(ingredient_id = %ingredient.id, name = %ingredient.name, "Ingredient created");

        self.catalog.refresh_after_write(&self.docs).await;
        Ok(ingredient)
    }

    /// Update catalog attributes; stock and version are left to the ledger
    pub async fn update(&self, id: Uuid, input: IngredientInput) -> AppResult<Ingredient> {
        let input = input.normalized()?;
        let existing = self.get(id).await?;
        self.ensure_unique_name(&input.name, Some(id)).await?;

        let updated = Ingredient {
            name: input.name,
            unit: input.unit,
            cost: input.cost,
            min_stock: input.min_stock,
            moq: input.moq,
            storage_area: input.storage_area,
            supplier: input.supplier,
            forms: input.forms,
            updated_at: Utc::now(),
            ..existing
        };

        self.docs
            .commit(vec![BatchWrite::Replace {
                collection: Collection::Ingredients,
                id: id.to_string(),
                doc: serde_json::to_value(&updated)?,
                preserve: INGREDIENT_LEDGER_FIELDS,
            }])
            .await?;
        tracing::info!(ingredient_id = %id, "Ingredient updated");

        self.catalog.refresh_after_write(&self.docs).await;
        self.get(id).await
    }

    /// Remove an ingredient. Recipes and preps that still point at it
    /// degrade to zero cost and zero contribution.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.docs.delete(Collection::Ingredients, id).await? {
            return Err(AppError::NotFound(format!("Ingredient {}", id)));
        }
        tracing::info!(ingredient_id = %id, "Ingredient deleted");
        self.catalog.refresh_after_write(&self.docs).await;
        Ok(())
    }

    /// Preview a quantity in base units
    pub async fn convert(
        &self,
        id: Uuid,
        unit: UnitSelection,
        quantity: Decimal,
    ) -> AppResult<ConvertedQuantity> {
        let ingredient = self.get(id).await?;
        Ok(convert_to_base(&ingredient, unit, quantity)?)
    }

    /// Stock value report
    pub async fn valuation(&self, sort: ValuationSort) -> AppResult<StockValuation> {
        let snapshot = self.catalog.snapshot().await;
        Ok(stock_valuation(&snapshot.ingredients, sort))
    }

    async fn ensure_unique_name(&self, name: &str, except: Option<Uuid>) -> AppResult<()> {
        let ingredients: Vec<Ingredient> = self.docs.list(Collection::Ingredients).await?;
        if ingredients
            .iter()
            .any(|i| Some(i.id) != except && i.has_name(name))
        {
            return Err(AppError::conflict(
                "name",
                format!("An ingredient named {} already exists", name),
            ));
        }
        Ok(())
    }
}
