//! Quantity string parsing - "5 km", "12.5kg", "km->mi"

use std::fmt;
use gauge_core::number::{format_number, parse_number};
use crate::category::UnitCategory;
use crate::unit::{ConversionError, UnitDefinition};
use crate::units::{UnitRegistry, UNITS};

/// A number paired with a unit of a specific category
#[derive(Debug, Clone, Copy)]
pub struct Quantity<'r> {
    pub value: f64,
    pub category: &'r UnitCategory,
    pub unit: &'r UnitDefinition,
}

impl<'r> Quantity<'r> {
    /// Convert to another unit of the same category
    pub fn convert_to(&self, target: &str) -> Result<Quantity<'r>, ConversionError> {
        let value = self.category.convert(&self.unit.symbol, target, self.value)?;
        Ok(Quantity {
            value,
            category: self.category,
            unit: self.category.unit(target)?,
        })
    }

    /// The value expressed in the category's base unit
    pub fn to_base(&self) -> Result<Quantity<'r>, ConversionError> {
        let base = &self.category.base_unit().symbol;
        self.convert_to(base)
    }
}

impl fmt::Display for Quantity<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", format_number(self.value, 10), self.unit.symbol)
    }
}

/// Resolve a unit spelling across every category of `registry`
pub fn find_unit<'r>(registry: &'r UnitRegistry, unit: &str) -> Result<(&'r UnitCategory, &'r UnitDefinition), ConversionError> {
    registry.find_unit(unit).ok_or_else(|| ConversionError::UnknownUnit {
        category: "any".to_string(),
        unit: unit.trim().to_string(),
    })
}

/// Parse "5 km" or "5km" against the built-in registry
pub fn parse_quantity(s: &str) -> Result<Quantity<'static>, ConversionError> {
    parse_quantity_in(&UNITS, s)
}

pub fn parse_quantity_in<'r>(registry: &'r UnitRegistry, s: &str) -> Result<Quantity<'r>, ConversionError> {
    let s = s.trim();
    let (number, unit) = split_quantity(s)
        .ok_or_else(|| ConversionError::Parse(format!("expected '<number> <unit>', got '{}'", s)))?;

    let value = parse_number(number).map_err(|e| ConversionError::Parse(e.to_string()))?;
    let (category, unit) = find_unit(registry, unit)?;
    Ok(Quantity { value, category, unit })
}

/// Split into number and unit parts. Whitespace separates them when
/// present, otherwise the unit starts at the first character that cannot
/// belong to a number.
fn split_quantity(s: &str) -> Option<(&str, &str)> {
    if let Some((number, unit)) = s.split_once(char::is_whitespace) {
        let unit = unit.trim();
        return (!number.is_empty() && !unit.is_empty()).then_some((number, unit));
    }

    let mut seen_digit = false;
    let split = s.char_indices().find(|&(i, c)| {
        if c.is_ascii_digit() {
            seen_digit = true;
            return false;
        }
        let sign = (c == '-' || c == '+') && i == 0;
        // An 'e' is an exponent only when a digit follows
        let exponent = (c == 'e' || c == 'E')
            && seen_digit
            && s[i + 1..].starts_with(|n: char| n.is_ascii_digit() || n == '-' || n == '+');
        !(sign || exponent || c == '.' || c == '_')
    })?;

    let (number, unit) = s.split_at(split.0);
    (seen_digit && !unit.is_empty()).then_some((number, unit))
}

/// A parsed "from->to" conversion within one category
#[derive(Debug, Clone, Copy)]
pub struct ConversionSpec<'r> {
    pub category: &'r UnitCategory,
    pub from: &'r UnitDefinition,
    pub to: &'r UnitDefinition,
}

impl<'r> ConversionSpec<'r> {
    /// Pair two unit spellings. The target is looked up in the source
    /// unit's category first, so spellings shared by several categories
    /// resolve consistently.
    pub fn resolve(registry: &'r UnitRegistry, from: &str, to: &str) -> Result<Self, ConversionError> {
        let (from_category, from_unit) = find_unit(registry, from)?;
        if let Some(to_unit) = from_category.get(to) {
            return Ok(ConversionSpec {
                category: from_category,
                from: from_unit,
                to: to_unit,
            });
        }

        let (to_category, to_unit) = find_unit(registry, to)?;
        Err(ConversionError::IncompatibleUnits {
            from: from_unit.symbol.clone(),
            from_category: from_category.name().to_string(),
            to: to_unit.symbol.clone(),
            to_category: to_category.name().to_string(),
        })
    }

    pub fn apply(&self, value: f64) -> Result<f64, ConversionError> {
        self.category.convert(&self.from.symbol, &self.to.symbol, value)
    }
}

const SEPARATORS: [&str; 4] = ["->", "→", " to ", " in "];

/// Parse "km->mi", "km → mi", "km to mi" or "km in mi"
pub fn parse_conversion(s: &str) -> Result<ConversionSpec<'static>, ConversionError> {
    parse_conversion_in(&UNITS, s)
}

pub fn parse_conversion_in<'r>(registry: &'r UnitRegistry, s: &str) -> Result<ConversionSpec<'r>, ConversionError> {
    let (from, to) = SEPARATORS
        .iter()
        .find_map(|sep| s.split_once(sep))
        .ok_or_else(|| ConversionError::Parse(format!("expected 'from->to', got '{}'", s.trim())))?;

    ConversionSpec::resolve(registry, from, to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quantity_with_space() {
        let q = parse_quantity("5 km").unwrap();
        assert_eq!(q.value, 5.0);
        assert_eq!(q.unit.symbol, "km");
        assert_eq!(q.category.name(), "length");
    }

    #[test]
    fn test_parse_quantity_without_space() {
        let q = parse_quantity("12.5kg").unwrap();
        assert_eq!(q.value, 12.5);
        assert_eq!(q.unit.symbol, "kg");

        let q = parse_quantity("-40F").unwrap();
        assert_eq!(q.value, -40.0);
        assert_eq!(q.category.name(), "temperature");

        let q = parse_quantity("1.5e3m").unwrap();
        assert_eq!(q.value, 1500.0);
    }

    #[test]
    fn test_parse_quantity_multiword_unit() {
        let q = parse_quantity("3 cubic yards").unwrap();
        assert_eq!(q.unit.symbol, "yd3");
        let q = parse_quantity("8 fl oz").unwrap();
        assert_eq!(q.unit.symbol, "floz");
    }

    #[test]
    fn test_parse_quantity_errors() {
        assert!(matches!(parse_quantity("km"), Err(ConversionError::Parse(_))));
        assert!(matches!(parse_quantity("5"), Err(ConversionError::Parse(_))));
        assert!(matches!(parse_quantity("5 parsecs"), Err(ConversionError::UnknownUnit { .. })));
        assert!(matches!(parse_quantity("five km"), Err(ConversionError::Parse(_))));
    }

    #[test]
    fn test_quantity_convert_and_display() {
        let q = parse_quantity("5 km").unwrap();
        let m = q.convert_to("m").unwrap();
        assert_eq!(m.value, 5000.0);
        assert_eq!(m.to_string(), "5000 m");
        assert_eq!(q.to_base().unwrap().unit.symbol, "m");
        assert!(matches!(q.convert_to("kg"), Err(ConversionError::UnknownUnit { .. })));
    }

    #[test]
    fn test_parse_conversion_separators() {
        for s in ["km->mi", "km → mi", "km to mi", "km in mi"] {
            let spec = parse_conversion(s).unwrap();
            assert_eq!(spec.from.symbol, "km");
            assert_eq!(spec.to.symbol, "mi");
            assert_eq!(spec.category.name(), "length");
        }
    }

    #[test]
    fn test_parse_conversion_apply() {
        let spec = parse_conversion("MB->Mb").unwrap();
        assert_eq!(spec.apply(1.0).unwrap(), 8.0);
    }

    #[test]
    fn test_parse_conversion_incompatible() {
        let err = parse_conversion("kg->m").unwrap_err();
        assert_eq!(err, ConversionError::IncompatibleUnits {
            from: "kg".to_string(),
            from_category: "weight".to_string(),
            to: "m".to_string(),
            to_category: "length".to_string(),
        });
        assert!(matches!(parse_conversion("kg"), Err(ConversionError::Parse(_))));
    }
}
