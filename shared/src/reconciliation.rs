//! Stock-take reconciliation
//!
//! Turns what staff typed on the count sheet (loose units, pack counts and
//! prep portions) into one counted quantity per catalog ingredient, and
//! picks out the lines whose variance is worth auditing.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::conversion::{parse_quantity, ParsedQuantity};
use crate::error::DomainError;
use crate::models::{
    CountField, CountLine, Ingredient, PrepItem, ReportLine, UnparsedEntry,
};
use crate::types::{StorageArea, VARIANCE_EPSILON};

/// Direct count for one ingredient
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DirectCount {
    /// Loose base units
    #[serde(default)]
    pub loose: Decimal,
    /// Form index -> number of form units
    #[serde(default)]
    pub forms: BTreeMap<usize, Decimal>,
}

/// One typed entry on the count sheet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountEntry {
    #[serde(flatten)]
    pub field: CountField,
    #[serde(default, deserialize_with = "crate::conversion::lenient_text")]
    pub value: String,
}

/// Everything counted in one stock-take session
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CountSheet {
    #[serde(default)]
    pub direct: HashMap<Uuid, DirectCount>,
    /// Prep item id -> portions counted
    #[serde(default)]
    pub prep: HashMap<Uuid, Decimal>,
    #[serde(default)]
    pub unparsed: Vec<UnparsedEntry>,
}

impl CountSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a sheet from raw entries; later entries overwrite earlier ones
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a CountEntry>) -> Self {
        let mut sheet = Self::new();
        for entry in entries {
            sheet.record(entry.field.clone(), &entry.value);
        }
        sheet
    }

    /// Record a typed value, coercing anything unreadable or negative to
    /// zero and keeping the raw text
    pub fn record(&mut self, field: CountField, raw: &str) {
        let parsed = parse_quantity(raw);
        self.unparsed.retain(|u| u.field != field);
        let rejected = match &parsed {
            ParsedQuantity::Unparsed(text) => Some(text.clone()),
            ParsedQuantity::Value(v) if v.is_sign_negative() && !v.is_zero() => {
                Some(raw.trim().to_string())
            }
            _ => None,
        };
        if let Some(raw) = rejected {
            self.unparsed.push(UnparsedEntry {
                field: field.clone(),
                raw,
            });
        }
        self.set(field, parsed.value());
    }

    /// Store a count; negative counts are clamped to zero
    pub fn set(&mut self, field: CountField, value: Decimal) {
        let value = value.max(Decimal::ZERO);
        match field {
            CountField::Loose { ingredient_id } => {
                self.direct.entry(ingredient_id).or_default().loose = value;
            }
            CountField::Form {
                ingredient_id,
                form_index,
            } => {
                self.direct
                    .entry(ingredient_id)
                    .or_default()
                    .forms
                    .insert(form_index, value);
            }
            CountField::Prep { prep_id } => {
                self.prep.insert(prep_id, value);
            }
        }
    }
}

/// Loose count plus every form count times its ratio.
///
/// Counts against form indices the ingredient no longer has are ignored.
pub fn direct_total(
    ingredient: &Ingredient,
    count: Option<&DirectCount>,
) -> Result<Decimal, DomainError> {
    let Some(count) = count else {
        return Ok(Decimal::ZERO);
    };
    ingredient
        .forms
        .iter()
        .enumerate()
        .filter_map(|(index, form)| count.forms.get(&index).map(|n| (*n, form.ratio)))
        .try_fold(count.loose, |total, (n, ratio)| {
            n.checked_mul(ratio).and_then(|packed| total.checked_add(packed))
        })
        .ok_or_else(DomainError::too_large)
}

/// Raw ingredient contributions of `portions` of a prep item.
///
/// Zero portions yield no entries at all.
pub fn expand_composite(
    prep: &PrepItem,
    portions: Decimal,
) -> Result<Vec<(Uuid, Decimal)>, DomainError> {
    if portions.is_zero() {
        return Ok(Vec::new());
    }
    prep.composition
        .iter()
        .map(|entry| {
            portions
                .checked_mul(entry.qty)
                .map(|qty| (entry.ingredient_id, qty))
                .ok_or_else(DomainError::too_large)
        })
        .collect()
}

/// One count line per catalog ingredient, in catalog order.
///
/// Prep contributions for ingredients missing from the catalog are
/// accumulated but have no line to land on, so they drop out. A total
/// too large for `Decimal` fails the whole sheet.
pub fn reconcile(
    ingredients: &[Ingredient],
    preps: &[PrepItem],
    sheet: &CountSheet,
) -> Result<Vec<CountLine>, DomainError> {
    let mut totals: HashMap<Uuid, Decimal> = ingredients
        .iter()
        .map(|ing| Ok((ing.id, direct_total(ing, sheet.direct.get(&ing.id))?)))
        .collect::<Result<_, DomainError>>()?;

    for prep in preps {
        let Some(portions) = sheet.prep.get(&prep.id) else {
            continue;
        };
        for (ingredient_id, contribution) in expand_composite(prep, *portions)? {
            let total = totals.entry(ingredient_id).or_insert(Decimal::ZERO);
            *total = total
                .checked_add(contribution)
                .ok_or_else(DomainError::too_large)?;
        }
    }

    Ok(ingredients
        .iter()
        .map(|ing| CountLine {
            ingredient_id: ing.id,
            name: ing.name.clone(),
            system_stock: ing.current_stock,
            counted_stock: totals.get(&ing.id).copied().unwrap_or_default(),
            unit: ing.unit.clone(),
            system_version: ing.version,
        })
        .collect())
}

/// Variance lines whose magnitude exceeds the epsilon, sign preserved
pub fn variance_lines(items: &[CountLine]) -> Vec<ReportLine> {
    items
        .iter()
        .filter(|item| item.variance().abs() > VARIANCE_EPSILON)
        .map(|item| ReportLine::Variance {
            name: item.name.clone(),
            system: item.system_stock,
            counted: item.counted_stock,
            variance: item.variance(),
            unit: item.unit.clone(),
        })
        .collect()
}

/// Count sheet section for one storage area
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SheetSection {
    pub area: StorageArea,
    pub ingredients: Vec<Ingredient>,
    pub prep_items: Vec<PrepItem>,
}

/// Group the catalog by storage area, skipping empty areas
pub fn sheet_sections(ingredients: &[Ingredient], preps: &[PrepItem]) -> Vec<SheetSection> {
    StorageArea::ALL
        .iter()
        .map(|area| SheetSection {
            area: *area,
            ingredients: ingredients
                .iter()
                .filter(|i| i.storage_area == *area)
                .cloned()
                .collect(),
            prep_items: preps
                .iter()
                .filter(|p| p.storage_area == *area)
                .cloned()
                .collect(),
        })
        .filter(|s| !s.ingredients.is_empty() || !s.prep_items.is_empty())
        .collect()
}
