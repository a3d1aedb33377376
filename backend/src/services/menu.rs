//! Menu item catalog service

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use shared::{
    cost_menu, validate_menu_kind, CostedMenuItem, Ingredient, IngredientIndex, MenuItem,
    MenuItemKind,
};
use uuid::Uuid;
use validator::Validate;

use crate::catalog::CatalogCache;
use crate::error::{AppError, AppResult};
use crate::store::{BatchWrite, Collection, Documents, MENU_LEDGER_FIELDS};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MenuItemInput {
    #[validate(length(min = 1, max = 120, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 60, message = "Category is too long"))]
    pub category: String,
    #[serde(flatten)]
    pub kind: MenuItemKind,
}

#[derive(Clone)]
pub struct MenuService {
    docs: Documents,
    catalog: Arc<CatalogCache>,
}

impl MenuService {
    pub fn new(docs: Documents, catalog: Arc<CatalogCache>) -> Self {
        Self { docs, catalog }
    }

    /// Menu items with their current unit cost
    pub async fn list(&self) -> AppResult<Vec<CostedMenuItem>> {
        let snapshot = self.catalog.snapshot().await;
        Ok(cost_menu(&snapshot.menu_items, &snapshot.ingredients))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<CostedMenuItem> {
        let item: MenuItem = self.docs.require(Collection::MenuItems, id, "Menu item").await?;
        let snapshot = self.catalog.snapshot().await;
        let total_cost = item.total_cost(&IngredientIndex::new(&snapshot.ingredients));
        Ok(CostedMenuItem { item, total_cost })
    }

    pub async fn create(&self, input: MenuItemInput) -> AppResult<CostedMenuItem> {
        let input = self.prepare(input, None).await?;
        let item = MenuItem::new(input.name, input.category, input.kind);

        self.docs.put(Collection::MenuItems, item.id, &item).await?;
        tracing::info!(menu_item_id = %item.id, name = %item.name, kind = item.kind.as_str(), "Menu item created");

        self.catalog.refresh_after_write(&self.docs).await;
        self.get(item.id).await
    }

    /// Update the definition; the sold count is left to the ledger
    pub async fn update(&self, id: Uuid, input: MenuItemInput) -> AppResult<CostedMenuItem> {
        let existing: MenuItem = self.docs.require(Collection::MenuItems, id, "Menu item").await?;
        let input = self.prepare(input, Some(id)).await?;

        let updated = MenuItem {
            name: input.name,
            category: input.category,
            kind: input.kind,
            updated_at: Utc::now(),
            ..existing
        };

        self.docs
            .commit(vec![BatchWrite::Replace {
                collection: Collection::MenuItems,
                id: id.to_string(),
                doc: serde_json::to_value(&updated)?,
                preserve: MENU_LEDGER_FIELDS,
            }])
            .await?;
        tracing::info!(menu_item_id = %id, "Menu item updated");

        self.catalog.refresh_after_write(&self.docs).await;
        self.get(id).await
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.docs.delete(Collection::MenuItems, id).await? {
            return Err(AppError::NotFound(format!("Menu item {}", id)));
        }
        tracing::info!(menu_item_id = %id, "Menu item deleted");
        self.catalog.refresh_after_write(&self.docs).await;
        Ok(())
    }

    /// Validate the payload, check references and fill recipe display names
    async fn prepare(&self, mut input: MenuItemInput, except: Option<Uuid>) -> AppResult<MenuItemInput> {
        input.name = input.name.trim().to_string();
        input.category = input.category.trim().to_string();
        input.validate()?;
        validate_menu_kind(&input.kind).map_err(|msg| AppError::validation("kind", msg))?;

        let items: Vec<MenuItem> = self.docs.list(Collection::MenuItems).await?;
        if items.iter().any(|m| Some(m.id) != except && m.has_name(&input.name)) {
            // Sales rows are matched by name, so names must stay unique
            return Err(AppError::conflict(
                "name",
                format!("A menu item named {} already exists", input.name),
            ));
        }

        let ingredients: Vec<Ingredient> = self.docs.list(Collection::Ingredients).await?;
        let index = IngredientIndex::new(&ingredients);
        match &mut input.kind {
            MenuItemKind::Recipe { recipe, .. } => {
                for line in recipe.iter_mut() {
                    let ingredient = index.get(&line.ingredient_id).ok_or_else(|| {
                        AppError::validation("recipe", "Recipe references an unknown ingredient")
                    })?;
                    line.ingredient_name = ingredient.name.clone();
                }
            }
            MenuItemKind::StockItem {
                linked_ingredient_id,
                ..
            } => {
                if !index.contains(linked_ingredient_id) {
                    return Err(AppError::validation(
                        "linked_ingredient_id",
                        "Linked ingredient does not exist",
                    ));
                }
            }
            MenuItemKind::NonStock => {}
        }

        Ok(input)
    }
}
