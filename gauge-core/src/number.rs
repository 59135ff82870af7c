//! Numeric input policy
//!
//! All calculators work on `f64`. Values entering a calculator go through
//! this module so every widget treats empty, malformed and non-finite input
//! the same way: empty input is 0, anything else must parse to a finite
//! number.

use thiserror::Error;

/// Error type for number handling
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumberError {
    #[error("Invalid number format: {0}")]
    ParseError(String),

    #[error("Non-finite number: {0}")]
    NonFinite(f64),

    #[error("Domain error: {0}")]
    DomainError(String),

    #[error("Overflow: result too large")]
    Overflow,
}

/// Reject NaN and infinities.
pub fn ensure_finite(value: f64) -> Result<f64, NumberError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(NumberError::NonFinite(value))
    }
}

/// Parse a number from text.
///
/// Supports: "123", "-3.14", "1.5e10", "1/4", "1_000".
/// Spellings of infinity and NaN are rejected.
pub fn parse_number(s: &str) -> Result<f64, NumberError> {
    let cleaned: String = s.trim().chars().filter(|c| *c != '_').collect();
    if cleaned.is_empty() {
        return Err(NumberError::ParseError(s.to_string()));
    }

    if let Some((num, den)) = cleaned.split_once('/') {
        let num = parse_plain(num.trim(), s)?;
        let den = parse_plain(den.trim(), s)?;
        if den == 0.0 {
            return Err(NumberError::DomainError(format!("zero denominator in '{}'", s.trim())));
        }
        return ensure_finite(num / den);
    }

    parse_plain(&cleaned, s)
}

fn parse_plain(text: &str, original: &str) -> Result<f64, NumberError> {
    // f64::from_str accepts "inf" and "NaN"; only digits may start a number here
    let starts_numeric = text
        .trim_start_matches(['+', '-'])
        .starts_with(|c: char| c.is_ascii_digit() || c == '.');
    if !starts_numeric {
        return Err(NumberError::ParseError(original.to_string()));
    }
    let value: f64 = text
        .parse()
        .map_err(|_| NumberError::ParseError(original.to_string()))?;
    ensure_finite(value)
}

/// Form-field convention: a missing or blank field counts as 0.
pub fn coerce_input(input: Option<&str>) -> Result<f64, NumberError> {
    match input.map(str::trim) {
        None | Some("") => Ok(0.0),
        Some(text) => parse_number(text),
    }
}

/// Render with at most `precision` decimal places, trimming trailing zeros.
pub fn format_number(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let mut text = format!("{:.*}", precision, value);
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer_and_decimal() {
        assert_eq!(parse_number("123").unwrap(), 123.0);
        assert_eq!(parse_number(" -3.25 ").unwrap(), -3.25);
        assert_eq!(parse_number("1_000").unwrap(), 1000.0);
    }

    #[test]
    fn test_parse_scientific() {
        assert_eq!(parse_number("1.5e2").unwrap(), 150.0);
        assert_eq!(parse_number("2E-3").unwrap(), 0.002);
    }

    #[test]
    fn test_parse_fraction() {
        assert_eq!(parse_number("1/4").unwrap(), 0.25);
        assert!(matches!(parse_number("1/0"), Err(NumberError::DomainError(_))));
    }

    #[test]
    fn test_parse_rejects_non_finite_spellings() {
        assert!(parse_number("inf").is_err());
        assert!(parse_number("-infinity").is_err());
        assert!(parse_number("NaN").is_err());
        assert!(matches!(parse_number("1e400"), Err(NumberError::NonFinite(_))));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(parse_number("abc"), Err(NumberError::ParseError(_))));
        assert!(parse_number("").is_err());
        assert!(parse_number("12 apples").is_err());
    }

    #[test]
    fn test_coerce_input() {
        assert_eq!(coerce_input(None).unwrap(), 0.0);
        assert_eq!(coerce_input(Some("   ")).unwrap(), 0.0);
        assert_eq!(coerce_input(Some("4.5")).unwrap(), 4.5);
        assert!(coerce_input(Some("four")).is_err());
    }

    #[test]
    fn test_ensure_finite() {
        assert_eq!(ensure_finite(1.0), Ok(1.0));
        assert!(ensure_finite(f64::NAN).is_err());
        assert!(ensure_finite(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.280839895013123, 5), "3.28084");
        assert_eq!(format_number(2.0, 6), "2");
        assert_eq!(format_number(-0.0000001, 3), "0");
        assert_eq!(format_number(1500.26, 1), "1500.3");
        assert_eq!(format_number(42.0, 0), "42");
    }
}
