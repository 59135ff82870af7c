//! Argument extraction shared by all calculator plugins
//!
//! Numbers may arrive as `Value::Number` or as text typed into a form.
//! Both paths go through `gauge_core::number`, so a non-finite value is
//! rejected the same way everywhere.

use gauge_core::{number, GaugeError, Value};

/// Extract a finite number from a Value
pub fn extract_number(value: &Value, func: &str, arg: &str) -> Result<f64, GaugeError> {
    match value {
        Value::Number(n) => number::ensure_finite(*n)
            .map_err(|e| GaugeError::from(e).in_function(func).for_argument(arg)),
        Value::Text(s) => number::parse_number(s)
            .map_err(|e| GaugeError::from(e).in_function(func).for_argument(arg)),
        Value::Error(e) => Err(e.clone()),
        other => Err(GaugeError::arg_type(func, arg, "Number", other.type_name())),
    }
}

/// Extract a Text string from a Value
pub fn extract_text<'a>(value: &'a Value, func: &str, arg: &str) -> Result<&'a str, GaugeError> {
    match value {
        Value::Text(s) => Ok(s),
        Value::Error(e) => Err(e.clone()),
        other => Err(GaugeError::arg_type(func, arg, "Text", other.type_name())),
    }
}

/// Extract optional Text (missing or null means absent)
pub fn optional_text<'a>(args: &'a [Value], index: usize, func: &str, arg: &str) -> Result<Option<&'a str>, GaugeError> {
    match args.get(index) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => extract_text(v, func, arg).map(Some),
    }
}

/// Validate a strictly positive number
pub fn validate_positive(value: f64, func: &str, arg: &str) -> Result<f64, GaugeError> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(GaugeError::domain_error(format!("{}(): {} must be positive, got {}", func, arg, value))
            .in_function(func)
            .for_argument(arg))
    }
}

/// Validate a number that may be zero but not negative
pub fn validate_non_negative(value: f64, func: &str, arg: &str) -> Result<f64, GaugeError> {
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(GaugeError::domain_error(format!("{}(): {} cannot be negative, got {}", func, arg, value))
            .in_function(func)
            .for_argument(arg))
    }
}
