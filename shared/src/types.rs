//! Common types used across the platform

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Variance below or equal to this (in base units) is treated as an exact match
pub const VARIANCE_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Admin PIN used when no settings document exists yet
pub const DEFAULT_ADMIN_PIN: &str = "1234";

/// Opaque identifier handed out by the identity provider
pub type UserId = String;

/// Fixed storage areas of the kitchen
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum StorageArea {
    #[default]
    #[serde(rename = "Dry Storage")]
    DryStorage,
    #[serde(rename = "Front Fridge")]
    FrontFridge,
    #[serde(rename = "Back Fridge")]
    BackFridge,
    #[serde(rename = "Freezer 1")]
    Freezer1,
    #[serde(rename = "Freezer 2")]
    Freezer2,
    #[serde(rename = "Almari")]
    Almari,
    #[serde(rename = "Veg and Fruits")]
    VegAndFruits,
    #[serde(rename = "Bar")]
    Bar,
}

impl StorageArea {
    pub const ALL: [StorageArea; 8] = [
        StorageArea::DryStorage,
        StorageArea::FrontFridge,
        StorageArea::BackFridge,
        StorageArea::Freezer1,
        StorageArea::Freezer2,
        StorageArea::Almari,
        StorageArea::VegAndFruits,
        StorageArea::Bar,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            StorageArea::DryStorage => "Dry Storage",
            StorageArea::FrontFridge => "Front Fridge",
            StorageArea::BackFridge => "Back Fridge",
            StorageArea::Freezer1 => "Freezer 1",
            StorageArea::Freezer2 => "Freezer 2",
            StorageArea::Almari => "Almari",
            StorageArea::VegAndFruits => "Veg and Fruits",
            StorageArea::Bar => "Bar",
        }
    }
}

impl std::fmt::Display for StorageArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Session role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Staff,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Staff => "staff",
            Role::Admin => "admin",
        }
    }
}

/// Sort order for the stock value report
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValuationSort {
    #[default]
    Value,
    Name,
}
