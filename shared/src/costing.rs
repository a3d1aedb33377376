//! Menu costing and stock valuation

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Ingredient, IngredientIndex, MenuItem};
use crate::types::{StorageArea, ValuationSort};

/// A menu item with its computed unit cost
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostedMenuItem {
    #[serde(flatten)]
    pub item: MenuItem,
    pub total_cost: Decimal,
}

/// Attach the current unit cost to every menu item
pub fn cost_menu(menu: &[MenuItem], ingredients: &[Ingredient]) -> Vec<CostedMenuItem> {
    let index = IngredientIndex::new(ingredients);
    menu.iter()
        .map(|item| CostedMenuItem {
            total_cost: item.total_cost(&index),
            item: item.clone(),
        })
        .collect()
}

/// Value of one ingredient's stock on hand
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValuationLine {
    pub ingredient_id: Uuid,
    pub name: String,
    pub storage_area: StorageArea,
    pub current_stock: Decimal,
    pub unit: String,
    pub cost: Decimal,
    pub total_value: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockValuation {
    pub lines: Vec<ValuationLine>,
    pub grand_total: Decimal,
}

pub fn stock_valuation(ingredients: &[Ingredient], sort: ValuationSort) -> StockValuation {
    let mut lines: Vec<ValuationLine> = ingredients
        .iter()
        .map(|ing| ValuationLine {
            ingredient_id: ing.id,
            name: ing.name.clone(),
            storage_area: ing.storage_area,
            current_stock: ing.current_stock,
            unit: ing.unit.clone(),
            cost: ing.cost,
            total_value: ing.stock_value(),
        })
        .collect();

    match sort {
        ValuationSort::Value => lines.sort_by(|a, b| b.total_value.cmp(&a.total_value)),
        ValuationSort::Name => lines.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
    }

    let grand_total = lines
        .iter()
        .map(|l| l.total_value)
        .fold(Decimal::ZERO, Decimal::saturating_add);
    StockValuation { lines, grand_total }
}
