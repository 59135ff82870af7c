//! Conversion between two units of the same category

use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::category::UnitCategory;
use crate::unit::{ConversionError, Rule};
use crate::units::{UnitRegistry, UNITS};

impl UnitCategory {
    /// Convert `value` from `source` to `target`.
    ///
    /// Both units are resolved before anything else, so an unknown unit is
    /// reported even when the spellings are equal.
    pub fn convert(&self, source: &str, target: &str, value: f64) -> Result<f64, ConversionError> {
        let from = self.unit(source)?;
        let to = self.unit(target)?;

        if !value.is_finite() {
            return Err(ConversionError::InvalidNumericInput(value));
        }
        if std::ptr::eq(from, to) {
            return Ok(value);
        }

        let result = match (&from.rule, &to.rule) {
            (Rule::Linear { factor: a }, Rule::Linear { factor: b }) => value * a / b,
            (Rule::Affine(a), Rule::Affine(b)) => (b.from_base)((a.to_base)(value)),
            // Categories are homogeneous, so this only guards hand-built units
            (_, _) => {
                return Err(ConversionError::RuleMismatch {
                    category: self.name().to_string(),
                    unit: to.symbol.clone(),
                    kind: self.kind(),
                });
            }
        };

        if !result.is_finite() {
            return Err(ConversionError::NumericOverflow {
                value,
                from: from.symbol.clone(),
                to: to.symbol.clone(),
            });
        }

        debug!(category = self.name(), from = %from, to = %to, value, result, "converted");
        Ok(result)
    }

    /// Value of `value` `unit` expressed in the base unit
    pub fn to_base(&self, unit: &str, value: f64) -> Result<f64, ConversionError> {
        let base = self.base_unit().symbol.clone();
        self.convert(unit, &base, value)
    }

    /// Value of `value` base units expressed in `unit`
    pub fn from_base(&self, unit: &str, value: f64) -> Result<f64, ConversionError> {
        let base = self.base_unit().symbol.clone();
        self.convert(&base, unit, value)
    }
}

impl UnitRegistry {
    pub fn convert(&self, category: &str, source: &str, target: &str, value: f64) -> Result<f64, ConversionError> {
        self.category(category)?.convert(source, target, value)
    }
}

/// Convert `value` between two units of `category` using the built-in registry
///
/// ```
/// let feet = gauge_units::convert("length", "m", "ft", 1.0).unwrap();
/// assert!((feet - 3.28084).abs() < 1e-5);
/// ```
pub fn convert(category: &str, source: &str, target: &str, value: f64) -> Result<f64, ConversionError> {
    UNITS.convert(category, source, target, value)
}

pub fn to_base(category: &str, unit: &str, value: f64) -> Result<f64, ConversionError> {
    UNITS.category(category)?.to_base(unit, value)
}

pub fn from_base(category: &str, unit: &str, value: f64) -> Result<f64, ConversionError> {
    UNITS.category(category)?.from_base(unit, value)
}

/// A conversion as a value object, as received over the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub category: String,
    #[serde(alias = "from")]
    pub source_unit: String,
    #[serde(alias = "to")]
    pub target_unit: String,
    pub value: f64,
}

impl ConversionRequest {
    pub fn new(category: &str, source_unit: &str, target_unit: &str, value: f64) -> Self {
        ConversionRequest {
            category: category.to_string(),
            source_unit: source_unit.to_string(),
            target_unit: target_unit.to_string(),
            value,
        }
    }

    pub fn resolve(&self, registry: &UnitRegistry) -> Result<f64, ConversionError> {
        registry.convert(&self.category, &self.source_unit, &self.target_unit, self.value)
    }
}
