//! Unit categories
//!
//! A category groups mutually convertible units around one base unit.
//! Construction validates every unit, so a built category can convert
//! between any two of its members without further checks.

use std::collections::HashMap;
use std::fmt;
use serde::{Deserialize, Serialize};
use crate::unit::{ConversionError, Rule, UnitDefinition};

/// Conversion capability shared by every unit in a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    /// Pure scaling against the base unit
    Linear,
    /// Scaling plus offset (temperature)
    Affine,
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryKind::Linear => write!(f, "linear"),
            CategoryKind::Affine => write!(f, "affine"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UnitCategory {
    name: String,
    aliases: Vec<String>,
    kind: CategoryKind,
    case_sensitive: bool,
    units: Vec<UnitDefinition>,
    /// Exact symbols and aliases
    exact: HashMap<String, usize>,
    /// Lower-cased spellings; `None` marks an ambiguous spelling
    folded: HashMap<String, Option<usize>>,
}

impl UnitCategory {
    /// Start a category from its base unit. The base unit must map values
    /// to themselves (factor 1, or identity functions).
    pub fn new(name: &str, kind: CategoryKind, base: UnitDefinition) -> Result<Self, ConversionError> {
        let mut category = UnitCategory {
            name: name.to_string(),
            aliases: Vec::new(),
            kind,
            case_sensitive: false,
            units: Vec::new(),
            exact: HashMap::new(),
            folded: HashMap::new(),
        };
        category.check_rule(&base)?;
        if !base.is_identity() {
            return Err(ConversionError::InvalidBase {
                category: category.name.clone(),
                unit: base.symbol,
            });
        }
        category.insert(base)?;
        Ok(category)
    }

    pub fn linear(name: &str, base: UnitDefinition) -> Result<Self, ConversionError> {
        Self::new(name, CategoryKind::Linear, base)
    }

    pub fn affine(name: &str, base: UnitDefinition) -> Result<Self, ConversionError> {
        Self::new(name, CategoryKind::Affine, base)
    }

    /// Builder: add a unit
    pub fn with_unit(mut self, unit: UnitDefinition) -> Result<Self, ConversionError> {
        self.check_rule(&unit)?;
        self.insert(unit)?;
        Ok(self)
    }

    /// Builder: alternative category names
    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases.extend(aliases.iter().map(|a| a.to_lowercase()));
        self
    }

    /// Builder: disable case-insensitive lookup, for symbol sets such as
    /// `Mb`/`MB` where case carries meaning.
    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    fn check_rule(&self, unit: &UnitDefinition) -> Result<(), ConversionError> {
        if unit.rule.kind() != self.kind {
            return Err(ConversionError::RuleMismatch {
                category: self.name.clone(),
                unit: unit.symbol.clone(),
                kind: self.kind,
            });
        }
        if let Rule::Linear { factor } = unit.rule {
            if !factor.is_finite() || factor <= 0.0 {
                return Err(ConversionError::InvalidFactor {
                    unit: unit.symbol.clone(),
                    factor,
                });
            }
        }
        Ok(())
    }

    fn insert(&mut self, unit: UnitDefinition) -> Result<(), ConversionError> {
        if self.exact.contains_key(&unit.symbol) {
            return Err(ConversionError::DuplicateUnit {
                category: self.name.clone(),
                unit: unit.symbol,
            });
        }
        let index = self.units.len();
        self.exact.insert(unit.symbol.clone(), index);
        for alias in &unit.aliases {
            self.exact.entry(alias.clone()).or_insert(index);
        }
        for spelling in std::iter::once(&unit.symbol).chain(unit.aliases.iter()) {
            self.folded
                .entry(spelling.to_lowercase())
                .and_modify(|slot| {
                    if *slot != Some(index) {
                        *slot = None;
                    }
                })
                .or_insert(Some(index));
        }
        self.units.push(unit);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn kind(&self) -> CategoryKind {
        self.kind
    }

    pub fn is_linear(&self) -> bool {
        self.kind == CategoryKind::Linear
    }

    /// The base unit (always the first unit registered)
    pub fn base_unit(&self) -> &UnitDefinition {
        &self.units[0]
    }

    /// Units in registration order
    pub fn units(&self) -> &[UnitDefinition] {
        &self.units
    }

    /// Look up a unit by symbol, alias, or (unless case-sensitive) a
    /// case-folded spelling that is unambiguous within the category.
    pub fn get(&self, unit: &str) -> Option<&UnitDefinition> {
        let unit = unit.trim();
        if let Some(&index) = self.exact.get(unit) {
            return Some(&self.units[index]);
        }
        if self.case_sensitive {
            return None;
        }
        match self.folded.get(&unit.to_lowercase()) {
            Some(Some(index)) => Some(&self.units[*index]),
            _ => None,
        }
    }

    /// Like [`get`](Self::get), but signals `UnknownUnit`
    pub fn unit(&self, unit: &str) -> Result<&UnitDefinition, ConversionError> {
        self.get(unit).ok_or_else(|| ConversionError::UnknownUnit {
            category: self.name.clone(),
            unit: unit.to_string(),
        })
    }

    /// Base units per one `unit`; `None` for affine categories
    pub fn factor_to_base(&self, unit: &str) -> Result<Option<f64>, ConversionError> {
        Ok(self.unit(unit)?.factor_to_base())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn length() -> UnitCategory {
        UnitCategory::linear("length", UnitDefinition::linear("m", "meter", 1.0).with_aliases(&["meters"]))
            .and_then(|c| c.with_unit(UnitDefinition::linear("km", "kilometer", 1000.0)))
            .unwrap()
    }

    #[test]
    fn test_lookup_by_symbol_alias_and_case() {
        let cat = length();
        assert_eq!(cat.get("m").unwrap().symbol, "m");
        assert_eq!(cat.get("meters").unwrap().symbol, "m");
        assert_eq!(cat.get("KM").unwrap().symbol, "km");
        assert_eq!(cat.get(" Meters ").unwrap().symbol, "m");
        assert!(cat.get("parsec").is_none());
    }

    #[test]
    fn test_unknown_unit_error() {
        let err = length().unit("parsecs").unwrap_err();
        assert_eq!(err, ConversionError::UnknownUnit {
            category: "length".to_string(),
            unit: "parsecs".to_string(),
        });
    }

    #[test]
    fn test_rejects_zero_and_negative_factors() {
        let err = length().with_unit(UnitDefinition::linear("z", "zero", 0.0)).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidFactor { .. }));

        let err = length().with_unit(UnitDefinition::linear("n", "negative", -3.0)).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidFactor { .. }));

        let err = length().with_unit(UnitDefinition::linear("i", "infinite", f64::INFINITY)).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidFactor { .. }));
    }

    #[test]
    fn test_rejects_duplicate_symbol() {
        let err = length().with_unit(UnitDefinition::linear("km", "again", 1000.0)).unwrap_err();
        assert!(matches!(err, ConversionError::DuplicateUnit { .. }));
    }

    #[test]
    fn test_rejects_non_identity_base() {
        let err = UnitCategory::linear("length", UnitDefinition::linear("km", "kilometer", 1000.0)).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidBase { .. }));
    }

    #[test]
    fn test_rejects_mixed_rules() {
        let affine = UnitDefinition::affine("F", "fahrenheit", |f| (f - 32.0) * 5.0 / 9.0, |c| c * 9.0 / 5.0 + 32.0);
        let err = length().with_unit(affine).unwrap_err();
        assert!(matches!(err, ConversionError::RuleMismatch { kind: CategoryKind::Linear, .. }));
    }

    #[test]
    fn test_case_sensitive_category() {
        let data = UnitCategory::linear("data-size", UnitDefinition::linear("bit", "bit", 1.0))
            .and_then(|c| c.with_unit(UnitDefinition::linear("Mb", "megabit", 1048576.0)))
            .and_then(|c| c.with_unit(UnitDefinition::linear("MB", "megabyte", 8388608.0)))
            .unwrap()
            .case_sensitive();
        assert_eq!(data.get("Mb").unwrap().name, "megabit");
        assert_eq!(data.get("MB").unwrap().name, "megabyte");
        assert!(data.get("mb").is_none());
    }

    #[test]
    fn test_ambiguous_folded_spelling() {
        let data = UnitCategory::linear("data-size", UnitDefinition::linear("bit", "bit", 1.0))
            .and_then(|c| c.with_unit(UnitDefinition::linear("Mb", "megabit", 1048576.0)))
            .and_then(|c| c.with_unit(UnitDefinition::linear("MB", "megabyte", 8388608.0)))
            .unwrap();
        // Exact spellings resolve, the folded one is ambiguous
        assert!(data.get("Mb").is_some());
        assert!(data.get("mb").is_none());
    }
}
