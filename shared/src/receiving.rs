//! Receiving deliveries into stock

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::conversion::{convert_to_base, UnitSelection};
use crate::error::DomainError;
use crate::ledger::{LedgerBatch, LedgerReason};
use crate::models::{Ingredient, IngredientIndex};
use crate::types::UserId;

/// One staged delivery line, still client-side until committed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingReceipt {
    pub ingredient_id: Uuid,
    pub quantity: Decimal,
    #[serde(default)]
    pub unit: UnitSelection,
}

/// Received total for one ingredient after consolidation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReceivedTotal {
    pub ingredient_id: Uuid,
    pub name: String,
    pub base_quantity: Decimal,
    pub unit: String,
}

/// Consolidate staged lines by ingredient into one increment each.
///
/// Fails on an unknown ingredient rather than dropping a delivery, and on
/// a total too large to represent.
pub fn plan_receiving(
    ingredients: &[Ingredient],
    receipts: &[PendingReceipt],
    actor: UserId,
) -> Result<(LedgerBatch, Vec<ReceivedTotal>), DomainError> {
    if receipts.is_empty() {
        return Err(DomainError::EmptyBatch);
    }

    let index = IngredientIndex::new(ingredients);
    let mut batch = LedgerBatch::new(LedgerReason::Receiving, actor);
    let mut totals: Vec<ReceivedTotal> = Vec::new();
    let mut message = String::from("Received:\n");

    for receipt in receipts {
        let ingredient = index
            .get(&receipt.ingredient_id)
            .ok_or(DomainError::UnknownIngredient(receipt.ingredient_id))?;
        let converted = convert_to_base(ingredient, receipt.unit, receipt.quantity)?;

        batch.increment(ingredient.id, converted.base_quantity)?;
        match totals.iter_mut().find(|t| t.ingredient_id == ingredient.id) {
            Some(total) => {
                total.base_quantity = total
                    .base_quantity
                    .checked_add(converted.base_quantity)
                    .ok_or_else(DomainError::too_large)?;
            }
            None => totals.push(ReceivedTotal {
                ingredient_id: ingredient.id,
                name: ingredient.name.clone(),
                base_quantity: converted.base_quantity,
                unit: ingredient.unit.clone(),
            }),
        }
        message.push_str(&format!(
            "- {} {} {}\n",
            receipt.quantity, converted.label, ingredient.name
        ));
    }

    Ok((batch.with_log(message.trim_end().to_string()), totals))
}
