//! Validation utilities for the Restaurant Inventory platform

use rust_decimal::Decimal;

use crate::models::{CompositionEntry, MenuItemKind, RecipeLine, UnitForm};

// ============================================================================
// Catalog Validations
// ============================================================================

/// Validate a pack/portion form: non-empty name, strictly positive ratio
pub fn validate_form(form: &UnitForm) -> Result<(), &'static str> {
    if form.name.trim().is_empty() {
        return Err("Form name cannot be empty");
    }
    if form.ratio <= Decimal::ZERO {
        return Err("Form ratio must be positive");
    }
    Ok(())
}

pub fn validate_forms(forms: &[UnitForm]) -> Result<(), &'static str> {
    forms.iter().try_for_each(validate_form)
}

/// Validate the numeric attributes of an ingredient
pub fn validate_ingredient_numbers(cost: Decimal, min_stock: Decimal, moq: Decimal) -> Result<(), &'static str> {
    if cost < Decimal::ZERO {
        return Err("Cost cannot be negative");
    }
    if min_stock < Decimal::ZERO {
        return Err("Minimum stock cannot be negative");
    }
    if moq < Decimal::ZERO {
        return Err("Minimum order quantity cannot be negative");
    }
    Ok(())
}

/// Validate recipe lines (quantities must be positive)
pub fn validate_recipe(lines: &[RecipeLine]) -> Result<(), &'static str> {
    if lines.iter().any(|l| l.qty <= Decimal::ZERO) {
        return Err("Recipe quantities must be positive");
    }
    Ok(())
}

pub fn validate_menu_kind(kind: &MenuItemKind) -> Result<(), &'static str> {
    match kind {
        MenuItemKind::Recipe { recipe, other_cost } => {
            validate_recipe(recipe)?;
            if *other_cost < Decimal::ZERO {
                return Err("Other cost cannot be negative");
            }
            Ok(())
        }
        MenuItemKind::StockItem { other_cost, .. } => {
            if *other_cost < Decimal::ZERO {
                return Err("Other cost cannot be negative");
            }
            Ok(())
        }
        MenuItemKind::NonStock => Ok(()),
    }
}

/// Validate prep composition (per-portion quantities must be positive)
pub fn validate_composition(entries: &[CompositionEntry]) -> Result<(), &'static str> {
    if entries.is_empty() {
        return Err("Composition must list at least one ingredient");
    }
    if entries.iter().any(|e| e.qty <= Decimal::ZERO) {
        return Err("Composition quantities must be positive");
    }
    Ok(())
}

// ============================================================================
// Security Validations
// ============================================================================

/// Validate admin PIN format (4-8 digits)
pub fn validate_pin(pin: &str) -> Result<(), &'static str> {
    if pin.len() < 4 || pin.len() > 8 {
        return Err("PIN must be 4 to 8 digits");
    }
    if !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err("PIN must contain digits only");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_validate_form() {
        assert!(validate_form(&UnitForm::new("Case", Decimal::from(24))).is_ok());
        assert!(validate_form(&UnitForm::new("  ", Decimal::from(24))).is_err());
        assert!(validate_form(&UnitForm::new("Case", Decimal::ZERO)).is_err());
        assert!(validate_form(&UnitForm::new("Case", Decimal::from(-1))).is_err());
    }

    #[test]
    fn test_validate_recipe() {
        let ok = RecipeLine { ingredient_id: Uuid::new_v4(), ingredient_name: "A".into(), qty: Decimal::ONE };
        let bad = RecipeLine { qty: Decimal::ZERO, ..ok.clone() };
        assert!(validate_recipe(&[ok.clone()]).is_ok());
        assert!(validate_recipe(&[ok, bad]).is_err());
    }

    #[test]
    fn test_validate_composition() {
        assert!(validate_composition(&[]).is_err());
        let entry = CompositionEntry { ingredient_id: Uuid::new_v4(), qty: Decimal::new(5, 1) };
        assert!(validate_composition(&[entry]).is_ok());
    }

    #[test]
    fn test_validate_pin() {
        assert!(validate_pin("1234").is_ok());
        assert!(validate_pin("12345678").is_ok());
        assert!(validate_pin("123").is_err());
        assert!(validate_pin("12a4").is_err());
    }

    #[test]
    fn test_validate_ingredient_numbers() {
        assert!(validate_ingredient_numbers(Decimal::ONE, Decimal::ZERO, Decimal::ZERO).is_ok());
        assert!(validate_ingredient_numbers(Decimal::from(-1), Decimal::ZERO, Decimal::ZERO).is_err());
    }
}
