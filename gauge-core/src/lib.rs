//! Gauge Core - Fundamental types
//!
//! This crate provides the core types used throughout Gauge:
//! - `Value`: Runtime values passed to and returned from calculators
//! - `GaugeError`: Structured errors that travel as values
//! - `number`: Numeric input policy shared by every widget

pub mod number;
mod value;
mod error;

pub use number::NumberError;
pub use value::Value;
pub use error::{GaugeError, ErrorContext, Severity, codes};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Value, GaugeError, NumberError, Severity};
    pub use crate::error::codes;
}
