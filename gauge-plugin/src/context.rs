//! Evaluation Context

use crate::PluginRegistry;
use std::sync::Arc;

/// Default number of decimal places used when rendering results as text
pub const DEFAULT_PRECISION: usize = 6;

/// Evaluation context passed to plugins
pub struct EvalContext {
    /// Decimal places used when a plugin renders a number as text
    pub precision: usize,
    pub registry: Arc<PluginRegistry>,
}

impl EvalContext {
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            registry,
        }
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Render a number with the context precision
    pub fn format(&self, value: f64) -> String {
        gauge_core::number::format_number(value, self.precision)
    }
}
