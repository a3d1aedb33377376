//! Sales-driven stock deduction

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::ledger::{LedgerBatch, LedgerReason};
use crate::models::{Ingredient, IngredientIndex, MenuItem, ReportKind, ReportLine, VarianceReport};
use crate::types::UserId;

/// A quantity/name pair read from a sales export
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SalesRow {
    pub qty: i64,
    pub name: String,
}

/// A sales row after matching against the menu
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchedSalesRow {
    pub qty: i64,
    pub name: String,
    /// `None` for rows the approver sees as unknown
    pub menu_item_id: Option<Uuid>,
    pub item_type: Option<String>,
}

impl MatchedSalesRow {
    pub fn is_found(&self) -> bool {
        self.menu_item_id.is_some()
    }
}

/// Match rows to menu items by case-insensitive name
pub fn match_sales_rows(rows: &[SalesRow], menu: &[MenuItem]) -> Vec<MatchedSalesRow> {
    rows.iter()
        .map(|row| {
            let item = menu.iter().find(|m| m.has_name(&row.name));
            MatchedSalesRow {
                qty: row.qty,
                name: row.name.clone(),
                menu_item_id: item.map(|m| m.id),
                item_type: item.map(|m| m.kind.as_str().to_string()),
            }
        })
        .collect()
}

/// Deduct stock for every matched row and bump sold counts.
///
/// Unknown rows are skipped. Deductions against ingredients that no longer
/// exist are dropped from both the batch and the report.
pub fn plan_sales_import(
    rows: &[MatchedSalesRow],
    menu: &[MenuItem],
    ingredients: &[Ingredient],
    actor: UserId,
) -> Result<LedgerBatch, DomainError> {
    let index = IngredientIndex::new(ingredients);
    let mut batch = LedgerBatch::new(LedgerReason::SalesImport, actor.clone());
    let mut lines = Vec::new();
    let mut message = String::from("CSV Import:\n");
    let mut matched = 0usize;

    for row in rows {
        let Some(item) = row
            .menu_item_id
            .and_then(|id| menu.iter().find(|m| m.id == id))
        else {
            continue;
        };
        matched += 1;
        batch.bump_sold(item.id, row.qty)?;

        for deduction in item.deductions(row.qty)? {
            let Some(ingredient) = index.get(&deduction.ingredient_id) else {
                continue;
            };
            batch.increment(ingredient.id, -deduction.quantity)?;
            lines.push(ReportLine::Change {
                name: format!("{} - {}", item.name, ingredient.name),
                change: -deduction.quantity,
                unit: ingredient.unit.clone(),
            });
        }
        message.push_str(&format!("- Sold {}x {}\n", row.qty, item.name));
    }

    if matched == 0 {
        return Err(DomainError::EmptyBatch);
    }

    batch.report = Some(VarianceReport::new(
        ReportKind::SalesUpload,
        format!("Sales Upload ({} items)", matched),
        actor,
        lines,
    ));
    Ok(batch.with_log(message.trim_end().to_string()))
}
