//! Gauge Plugin System
//!
//! Calculators are pure functions implementing [`FunctionPlugin`]. Crates
//! expose a `load_*_library` function that adds their plugins to a
//! [`PluginRegistry`].

mod traits;
mod registry;
mod context;
pub mod args;

pub use traits::{FunctionPlugin, FunctionMeta, ArgMeta};
pub use registry::PluginRegistry;
pub use context::{EvalContext, DEFAULT_PRECISION};

/// Re-export core types for plugin authors
pub mod prelude {
    pub use crate::{FunctionPlugin, FunctionMeta, ArgMeta, PluginRegistry, EvalContext};
    pub use crate::args::{extract_number, extract_text, optional_text, validate_non_negative, validate_positive};
    pub use gauge_core::prelude::*;
}
