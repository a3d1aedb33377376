//! Ingredient (raw stock-keeping unit) models

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::StorageArea;

/// A named pack or portion size, e.g. "2kg Pack" = 2000 g
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnitForm {
    pub name: String,
    /// Base units in one form unit
    pub ratio: Decimal,
}

impl UnitForm {
    pub fn new(name: impl Into<String>, ratio: Decimal) -> Self {
        Self {
            name: name.into(),
            ratio,
        }
    }
}

/// A raw ingredient tracked in base units
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ingredient {
    pub id: Uuid,
    pub name: String,
    /// Base unit of measure, free text ("g", "ml", "pcs")
    pub unit: String,
    /// Cost per one base unit
    pub cost: Decimal,
    pub current_stock: Decimal,
    /// Par level
    pub min_stock: Decimal,
    /// Minimum order quantity
    #[serde(default)]
    pub moq: Decimal,
    #[serde(default)]
    pub storage_area: StorageArea,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub forms: Vec<UnitForm>,
    /// Bumped on every stock write
    #[serde(default)]
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ingredient {
    /// New ingredient with zero stock
    pub fn new(name: impl Into<String>, unit: impl Into<String>, cost: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            unit: unit.into(),
            cost,
            current_stock: Decimal::ZERO,
            min_stock: Decimal::ZERO,
            moq: Decimal::ZERO,
            storage_area: StorageArea::default(),
            supplier: None,
            forms: Vec::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_forms(mut self, forms: Vec<UnitForm>) -> Self {
        self.forms = forms;
        self
    }

    pub fn with_stock(mut self, stock: Decimal) -> Self {
        self.current_stock = stock;
        self
    }

    pub fn in_area(mut self, area: StorageArea) -> Self {
        self.storage_area = area;
        self
    }

    /// Below par level
    pub fn is_low_stock(&self) -> bool {
        self.current_stock < self.min_stock
    }

    /// Value of stock on hand, saturating at the bounds of `Decimal`
    pub fn stock_value(&self) -> Decimal {
        self.current_stock.saturating_mul(self.cost)
    }

    /// Case-insensitive match on name or supplier
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self
                .supplier
                .as_deref()
                .is_some_and(|s| s.to_lowercase().contains(&needle))
    }

    /// Case-insensitive name equality
    pub fn has_name(&self, name: &str) -> bool {
        self.name.trim().to_lowercase() == name.trim().to_lowercase()
    }
}

/// Id lookup over a borrowed ingredient catalog
#[derive(Debug, Default)]
pub struct IngredientIndex<'a> {
    by_id: HashMap<Uuid, &'a Ingredient>,
}

impl<'a> IngredientIndex<'a> {
    pub fn new(ingredients: &'a [Ingredient]) -> Self {
        Self {
            by_id: ingredients.iter().map(|i| (i.id, i)).collect(),
        }
    }

    pub fn get(&self, id: &Uuid) -> Option<&'a Ingredient> {
        self.by_id.get(id).copied()
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.by_id.contains_key(id)
    }

    /// Cost per base unit, zero for unknown ids
    pub fn cost_of(&self, id: &Uuid) -> Decimal {
        self.get(id).map(|i| i.cost).unwrap_or(Decimal::ZERO)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
