//! Menu item models and costing

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::IngredientIndex;
use crate::error::DomainError;

/// One ingredient line of a recipe, quantity in the ingredient's base unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeLine {
    pub ingredient_id: Uuid,
    /// Display copy taken when the line was added
    #[serde(default)]
    pub ingredient_name: String,
    pub qty: Decimal,
}

/// What a menu item is made of
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MenuItemKind {
    /// Built from several ingredients
    Recipe {
        #[serde(default)]
        recipe: Vec<RecipeLine>,
        #[serde(default)]
        other_cost: Decimal,
    },
    /// Sold as one unit of a single ingredient (a bottle, a can)
    StockItem {
        linked_ingredient_id: Uuid,
        #[serde(default)]
        other_cost: Decimal,
    },
    /// No cost, no stock movement
    NonStock,
}

impl MenuItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MenuItemKind::Recipe { .. } => "recipe",
            MenuItemKind::StockItem { .. } => "stock_item",
            MenuItemKind::NonStock => "non_stock",
        }
    }
}

/// A sellable catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuItem {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(flatten)]
    pub kind: MenuItemKind,
    /// Cumulative units sold
    #[serde(default)]
    pub sold_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stock to take out of one ingredient
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockDeduction {
    pub ingredient_id: Uuid,
    pub quantity: Decimal,
}

impl MenuItem {
    pub fn new(name: impl Into<String>, category: impl Into<String>, kind: MenuItemKind) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category: category.into(),
            kind,
            sold_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Total cost of one unit.
    ///
    /// Recipe lines and links that point at a deleted ingredient contribute
    /// nothing instead of failing. Saturates rather than overflowing.
    pub fn total_cost(&self, ingredients: &IngredientIndex<'_>) -> Decimal {
        match &self.kind {
            MenuItemKind::Recipe { recipe, other_cost } => recipe
                .iter()
                .map(|line| ingredients.cost_of(&line.ingredient_id).saturating_mul(line.qty))
                .fold(*other_cost, Decimal::saturating_add),
            MenuItemKind::StockItem {
                linked_ingredient_id,
                other_cost,
            } => ingredients.cost_of(linked_ingredient_id).saturating_add(*other_cost),
            MenuItemKind::NonStock => Decimal::ZERO,
        }
    }

    /// Ingredient quantities consumed by selling `sold` units
    pub fn deductions(&self, sold: i64) -> Result<Vec<StockDeduction>, DomainError> {
        let sold = Decimal::from(sold);
        match &self.kind {
            MenuItemKind::Recipe { recipe, .. } => recipe
                .iter()
                .map(|line| {
                    Ok(StockDeduction {
                        ingredient_id: line.ingredient_id,
                        quantity: line.qty.checked_mul(sold).ok_or_else(DomainError::too_large)?,
                    })
                })
                .collect(),
            MenuItemKind::StockItem {
                linked_ingredient_id,
                ..
            } => Ok(vec![StockDeduction {
                ingredient_id: *linked_ingredient_id,
                quantity: sold,
            }]),
            MenuItemKind::NonStock => Ok(Vec::new()),
        }
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.name.trim().to_lowercase() == name.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Ingredient;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn recipe_cost_adds_other_cost() {
        let a = Ingredient::new("Tomato", "pcs", dec("0.50"));
        let b = Ingredient::new("Basil", "bunch", dec("1.20"));
        let item = MenuItem::new(
            "Bruschetta",
            "Starters",
            MenuItemKind::Recipe {
                recipe: vec![
                    RecipeLine { ingredient_id: a.id, ingredient_name: a.name.clone(), qty: dec("4") },
                    RecipeLine { ingredient_id: b.id, ingredient_name: b.name.clone(), qty: dec("2") },
                ],
                other_cost: dec("0.75"),
            },
        );
        let ings = vec![a, b];
        let index = IngredientIndex::new(&ings);
        assert_eq!(item.total_cost(&index), dec("4.15"));
    }

    #[test]
    fn non_stock_is_free_and_untracked() {
        let item = MenuItem::new("Tap Water", "Drinks", MenuItemKind::NonStock);
        let index = IngredientIndex::default();
        assert_eq!(item.total_cost(&index), Decimal::ZERO);
        assert!(item.deductions(12).unwrap().is_empty());
    }

    #[test]
    fn stock_item_deducts_sold_quantity() {
        let cola = Ingredient::new("Cola Can", "can", dec("0.80"));
        let item = MenuItem::new(
            "Cola",
            "Drinks",
            MenuItemKind::StockItem { linked_ingredient_id: cola.id, other_cost: dec("0.10") },
        );
        let ings = vec![cola.clone()];
        assert_eq!(item.total_cost(&IngredientIndex::new(&ings)), dec("0.90"));
        assert_eq!(
            item.deductions(3).unwrap(),
            vec![StockDeduction { ingredient_id: cola.id, quantity: dec("3") }]
        );
    }

    #[test]
    fn oversized_recipe_deduction_is_an_error() {
        let item = MenuItem::new(
            "Party Tray",
            "Catering",
            MenuItemKind::Recipe {
                recipe: vec![RecipeLine {
                    ingredient_id: Uuid::new_v4(),
                    ingredient_name: "Cheese".into(),
                    qty: Decimal::MAX,
                }],
                other_cost: Decimal::ZERO,
            },
        );
        assert_eq!(item.deductions(2), Err(DomainError::too_large()));
        assert_eq!(item.deductions(1).unwrap()[0].quantity, Decimal::MAX);
    }

    #[test]
    fn dangling_recipe_line_costs_nothing() {
        let item = MenuItem::new(
            "Ghost Soup",
            "Mains",
            MenuItemKind::Recipe {
                recipe: vec![RecipeLine {
                    ingredient_id: Uuid::new_v4(),
                    ingredient_name: "Deleted".into(),
                    qty: dec("10"),
                }],
                other_cost: dec("1"),
            },
        );
        assert_eq!(item.total_cost(&IngredientIndex::default()), dec("1"));
    }

    #[test]
    fn kind_is_tagged_by_type() {
        let item = MenuItem::new("Tap Water", "Drinks", MenuItemKind::NonStock);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "non_stock");
        let back: MenuItem = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind, MenuItemKind::NonStock);
    }
}
