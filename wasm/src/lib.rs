//! WebAssembly module for the Restaurant Inventory platform
//!
//! Lets the browser preview what the server will compute before anything
//! is committed:
//! - Unit conversion for receiving lines
//! - Menu item costing
//! - Count sheet reconciliation and its variance lines
//!
//! Everything crosses the boundary as JSON text.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use shared::{
    convert_to_base, cost_menu, parse_quantity, reconcile, validate_pin, variance_lines, CountEntry,
    CountLine, CountSheet, DomainError, Ingredient, MenuItem, PrepItem, ReportLine, UnitSelection, UnparsedEntry,
};
use wasm_bindgen::prelude::*;

fn from_json<T: serde::de::DeserializeOwned>(what: &str, json: &str) -> Result<T, JsValue> {
    serde_json::from_str(json).map_err(|e| JsValue::from_str(&format!("Invalid {} JSON: {}", what, e)))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn rule_error(err: DomainError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Base-unit quantity for a typed amount; `unit` is "base" or a form index
#[wasm_bindgen]
pub fn convert_quantity(ingredient_json: &str, unit: &str, quantity: &str) -> Result<String, JsValue> {
    let ingredient: Ingredient = from_json("ingredient", ingredient_json)?;
    let selection = UnitSelection::from_str(unit).unwrap_or_default();
    let converted = convert_to_base(&ingredient, selection, parse_quantity(quantity).value())
        .map_err(rule_error)?;
    to_json(&converted)
}

/// True when the text would be counted as zero because it is not a number
#[wasm_bindgen]
pub fn is_unreadable_quantity(raw: &str) -> bool {
    parse_quantity(raw).is_unparsed()
}

/// Cost of one menu item against the given ingredient list, as a decimal string
#[wasm_bindgen]
pub fn menu_item_cost(item_json: &str, ingredients_json: &str) -> Result<String, JsValue> {
    let item: MenuItem = from_json("menu item", item_json)?;
    let ingredients: Vec<Ingredient> = from_json("ingredients", ingredients_json)?;
    let costed = cost_menu(std::slice::from_ref(&item), &ingredients);
    Ok(costed
        .first()
        .map(|c| c.total_cost)
        .unwrap_or(Decimal::ZERO)
        .to_string())
}

#[derive(Serialize)]
struct CountPreview {
    items: Vec<CountLine>,
    variances: Vec<ReportLine>,
    unparsed: Vec<UnparsedEntry>,
}

/// Reconcile sheet entries the way a submission would, without submitting
#[wasm_bindgen]
pub fn preview_count(ingredients_json: &str, preps_json: &str, entries_json: &str) -> Result<String, JsValue> {
    let ingredients: Vec<Ingredient> = from_json("ingredients", ingredients_json)?;
    let preps: Vec<PrepItem> = from_json("prep items", preps_json)?;
    let entries: Vec<CountEntry> = from_json("count entries", entries_json)?;

    let sheet = CountSheet::from_entries(&entries);
    let items = reconcile(&ingredients, &preps, &sheet).map_err(rule_error)?;
    to_json(&CountPreview {
        variances: variance_lines(&items),
        items,
        unparsed: sheet.unparsed,
    })
}

/// Check the admin PIN format before sending it
#[wasm_bindgen]
pub fn is_valid_pin(pin: &str) -> bool {
    validate_pin(pin).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use shared::{MenuItemKind, RecipeLine, UnitForm};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn flour() -> Ingredient {
        Ingredient::new("Flour", "g", dec("0.002"))
            .with_stock(dec("5000"))
            .with_forms(vec![UnitForm::new("2kg Pack", dec("2000"))])
    }

    #[test]
    fn converts_pack_quantities() {
        let ingredient = serde_json::to_string(&flour()).unwrap();
        let out: Value = serde_json::from_str(&convert_quantity(&ingredient, "0", "3").unwrap()).unwrap();
        assert_eq!(out["label"], "2kg Pack");
        assert_eq!(Decimal::from_str(out["base_quantity"].as_str().unwrap()).unwrap(), dec("6000"));

        let out: Value = serde_json::from_str(&convert_quantity(&ingredient, "base", "12kg").unwrap()).unwrap();
        assert_eq!(Decimal::from_str(out["base_quantity"].as_str().unwrap()).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn flags_unreadable_text() {
        assert!(is_unreadable_quantity("abc"));
        assert!(!is_unreadable_quantity(""));
        assert!(!is_unreadable_quantity(" 2.5 "));
    }

    #[test]
    fn costs_a_recipe() {
        let flour = flour();
        let pizza = MenuItem::new(
            "Margarita Pizza",
            "Pizza",
            MenuItemKind::Recipe {
                recipe: vec![RecipeLine {
                    ingredient_id: flour.id,
                    ingredient_name: flour.name.clone(),
                    qty: dec("200"),
                }],
                other_cost: dec("1.5"),
            },
        );
        let cost = menu_item_cost(
            &serde_json::to_string(&pizza).unwrap(),
            &serde_json::to_string(&vec![flour]).unwrap(),
        )
        .unwrap();
        assert_eq!(dec(&cost), dec("1.9"));
    }

    #[test]
    fn preview_reports_variances_and_typos() {
        let flour = flour();
        let entries = json!([
            { "field": "form", "ingredient_id": flour.id, "form_index": 0, "value": 2 },
            { "field": "loose", "ingredient_id": flour.id, "value": "5oo" }
        ]);
        let out = preview_count(
            &serde_json::to_string(&vec![flour]).unwrap(),
            "[]",
            &entries.to_string(),
        )
        .unwrap();
        let out: Value = serde_json::from_str(&out).unwrap();

        assert_eq!(out["items"].as_array().unwrap().len(), 1);
        assert_eq!(out["variances"].as_array().unwrap().len(), 1);
        assert_eq!(out["unparsed"][0]["raw"], "5oo");
    }

    #[test]
    fn pin_format() {
        assert!(is_valid_pin("1234"));
        assert!(!is_valid_pin("12"));
        assert!(!is_valid_pin("12ab"));
    }
}
