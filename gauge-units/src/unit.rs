//! Unit representation with conversion rules

use std::fmt;
use thiserror::Error;
use gauge_core::GaugeError;
use crate::CategoryKind;

/// Affine conversion expressed as an explicit pair of functions.
///
/// Used for temperature, where scales differ by an offset as well as a
/// factor. Keeping both directions explicit avoids the rounding drift of
/// inverting a stored scale/offset pair.
#[derive(Clone, Copy)]
pub struct AffineRule {
    pub to_base: fn(f64) -> f64,
    pub from_base: fn(f64) -> f64,
}

impl fmt::Debug for AffineRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AffineRule")
    }
}

/// How a unit relates to its category's base unit
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// `value_in_base = value * factor`
    Linear { factor: f64 },
    Affine(AffineRule),
}

impl Rule {
    pub fn kind(&self) -> CategoryKind {
        match self {
            Rule::Linear { .. } => CategoryKind::Linear,
            Rule::Affine(_) => CategoryKind::Affine,
        }
    }
}

/// A unit within exactly one category
#[derive(Debug, Clone)]
pub struct UnitDefinition {
    /// The unit symbol (e.g., "m", "kg", "MB")
    pub symbol: String,
    /// The unit name (e.g., "meter", "kilogram", "megabyte")
    pub name: String,
    /// Alternative spellings accepted on lookup
    pub aliases: Vec<String>,
    pub rule: Rule,
}

impl UnitDefinition {
    /// Create a unit with a proportional conversion
    pub fn linear(symbol: &str, name: &str, factor: f64) -> Self {
        UnitDefinition {
            symbol: symbol.to_string(),
            name: name.to_string(),
            aliases: Vec::new(),
            rule: Rule::Linear { factor },
        }
    }

    /// Create a unit converted through explicit to/from-base functions
    pub fn affine(symbol: &str, name: &str, to_base: fn(f64) -> f64, from_base: fn(f64) -> f64) -> Self {
        UnitDefinition {
            symbol: symbol.to_string(),
            name: name.to_string(),
            aliases: Vec::new(),
            rule: Rule::Affine(AffineRule { to_base, from_base }),
        }
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases.extend(aliases.iter().map(|a| a.to_string()));
        self
    }

    /// Base units per one of this unit; `None` for affine units
    pub fn factor_to_base(&self) -> Option<f64> {
        match self.rule {
            Rule::Linear { factor } => Some(factor),
            Rule::Affine(_) => None,
        }
    }

    /// Convert a value in this unit to the category's base unit
    pub fn to_base(&self, value: f64) -> f64 {
        match self.rule {
            Rule::Linear { factor } => value * factor,
            Rule::Affine(rule) => (rule.to_base)(value),
        }
    }

    /// Convert a value in the category's base unit to this unit
    pub fn from_base(&self, value: f64) -> f64 {
        match self.rule {
            Rule::Linear { factor } => value / factor,
            Rule::Affine(rule) => (rule.from_base)(value),
        }
    }

    /// True when this unit maps values to themselves
    pub fn is_identity(&self) -> bool {
        match self.rule {
            Rule::Linear { factor } => factor == 1.0,
            Rule::Affine(rule) => [0.0, 1.0, -40.0, 100.0]
                .iter()
                .all(|&v| (rule.to_base)(v) == v && (rule.from_base)(v) == v),
        }
    }
}

impl fmt::Display for UnitDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

/// Errors that can occur while building a registry or converting
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("unknown unit category: {0}")]
    UnknownCategory(String),

    #[error("unknown unit '{unit}' in category '{category}'")]
    UnknownUnit { category: String, unit: String },

    #[error("invalid numeric input: {0}")]
    InvalidNumericInput(f64),

    #[error("converting {value} {from} to {to} does not give a finite number")]
    NumericOverflow { value: f64, from: String, to: String },

    #[error("cannot convert {from} ({from_category}) to {to} ({to_category}): incompatible units")]
    IncompatibleUnits {
        from: String,
        from_category: String,
        to: String,
        to_category: String,
    },

    #[error("unit '{unit}' has factor {factor}: factors must be finite and positive")]
    InvalidFactor { unit: String, factor: f64 },

    #[error("base unit '{unit}' of category '{category}' must map values to themselves")]
    InvalidBase { category: String, unit: String },

    #[error("unit '{unit}' is not a {kind} unit as required by category '{category}'")]
    RuleMismatch { category: String, unit: String, kind: CategoryKind },

    #[error("duplicate unit '{unit}' in category '{category}'")]
    DuplicateUnit { category: String, unit: String },

    #[error("duplicate category '{0}'")]
    DuplicateCategory(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl From<ConversionError> for GaugeError {
    fn from(err: ConversionError) -> Self {
        match &err {
            ConversionError::UnknownCategory(name) => GaugeError::unknown_category(name),
            ConversionError::UnknownUnit { category, unit } => GaugeError::unknown_unit(category, unit),
            ConversionError::InvalidNumericInput(v) => GaugeError::invalid_number(v.to_string()),
            ConversionError::NumericOverflow { .. } => GaugeError::overflow().with_note(err.to_string()),
            ConversionError::IncompatibleUnits { .. } => {
                GaugeError::new(gauge_core::codes::INCOMPATIBLE_UNITS, err.to_string())
                    .with_suggestion("Both units must belong to the same category")
            }
            ConversionError::Parse(details) => GaugeError::parse_error(details.clone()),
            ConversionError::InvalidFactor { .. }
            | ConversionError::InvalidBase { .. }
            | ConversionError::RuleMismatch { .. }
            | ConversionError::DuplicateUnit { .. }
            | ConversionError::DuplicateCategory(_) => GaugeError::internal(err.to_string()),
        }
    }
}
