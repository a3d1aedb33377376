//! Unit conversion and lenient quantity parsing
//!
//! Quantities typed by staff are never rejected: anything that does not
//! read as a number counts as zero. The parse result still remembers the
//! raw text so a typo can be told apart from a real zero later.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DomainError;
use crate::models::Ingredient;

/// Unit a quantity was entered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitSelection {
    #[default]
    Base,
    /// Index into the ingredient's `forms`
    Form(usize),
}

impl FromStr for UnitSelection {
    type Err = std::convert::Infallible;

    /// `"base"` or a form index; anything else falls back to base
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("base") {
            return Ok(UnitSelection::Base);
        }
        Ok(s.parse::<usize>()
            .map(UnitSelection::Form)
            .unwrap_or(UnitSelection::Base))
    }
}

impl Serialize for UnitSelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            UnitSelection::Base => serializer.serialize_str("base"),
            UnitSelection::Form(index) => serializer.serialize_u64(*index as u64),
        }
    }
}

impl<'de> Deserialize<'de> for UnitSelection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Index(u64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Index(index) => UnitSelection::Form(index as usize),
            Raw::Text(text) => text.parse().unwrap_or_default(),
        })
    }
}

/// Result of converting a quantity into base units
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConvertedQuantity {
    pub base_quantity: Decimal,
    /// Form name, or the base unit when no form applied
    pub label: String,
}

/// Convert `quantity` entered in `selection` into the ingredient's base unit.
///
/// A form index that no longer exists is treated as base so a stale
/// selection never blocks entry. Fails only when the product overflows.
pub fn convert_to_base(
    ingredient: &Ingredient,
    selection: UnitSelection,
    quantity: Decimal,
) -> Result<ConvertedQuantity, DomainError> {
    match selection {
        UnitSelection::Form(index) => match ingredient.forms.get(index) {
            Some(form) => Ok(ConvertedQuantity {
                base_quantity: quantity
                    .checked_mul(form.ratio)
                    .ok_or_else(DomainError::too_large)?,
                label: form.name.clone(),
            }),
            None => Ok(base(ingredient, quantity)),
        },
        UnitSelection::Base => Ok(base(ingredient, quantity)),
    }
}

fn base(ingredient: &Ingredient, quantity: Decimal) -> ConvertedQuantity {
    ConvertedQuantity {
        base_quantity: quantity,
        label: ingredient.unit.clone(),
    }
}

/// A user-entered number
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedQuantity {
    Value(Decimal),
    Empty,
    Unparsed(String),
}

impl ParsedQuantity {
    /// The number to use in stock math; zero when nothing usable was typed
    pub fn value(&self) -> Decimal {
        match self {
            ParsedQuantity::Value(v) => *v,
            ParsedQuantity::Empty | ParsedQuantity::Unparsed(_) => Decimal::ZERO,
        }
    }

    pub fn is_unparsed(&self) -> bool {
        matches!(self, ParsedQuantity::Unparsed(_))
    }
}

/// Parse a typed quantity without ever failing.
///
/// Accepts plain and scientific decimals; anything else ("12kg", "abc")
/// is kept as `Unparsed` and counts as zero.
pub fn parse_quantity(raw: &str) -> ParsedQuantity {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return ParsedQuantity::Empty;
    }
    if let Ok(value) = Decimal::from_str(trimmed).or_else(|_| Decimal::from_scientific(trimmed)) {
        return ParsedQuantity::Value(value);
    }
    ParsedQuantity::Unparsed(trimmed.to_string())
}

/// Accept a JSON string or number as raw quantity text
pub fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Ok(other.to_string()),
    }
}

/// Leading numeric prefix of `raw`, if it starts with one
pub fn numeric_prefix(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    let end = trimmed
        .char_indices()
        .take_while(|(i, c)| c.is_ascii_digit() || *c == '.' || (*i == 0 && (*c == '-' || *c == '+')))
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0);
    Decimal::from_str(&trimmed[..end]).ok()
}
