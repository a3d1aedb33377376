//! Prep (composite) items counted as whole portions at stock-take

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::StorageArea;

/// Raw ingredient quantity inside one portion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompositionEntry {
    pub ingredient_id: Uuid,
    /// Base units of the ingredient per portion
    pub qty: Decimal,
}

/// A prepared item (dough ball, sauce tub) whose portions stand for raw ingredients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrepItem {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub storage_area: StorageArea,
    #[serde(default)]
    pub composition: Vec<CompositionEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PrepItem {
    pub fn new(name: impl Into<String>, composition: Vec<CompositionEntry>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            storage_area: StorageArea::default(),
            composition,
            created_at: now,
            updated_at: now,
        }
    }
}
