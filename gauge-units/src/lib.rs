//! Gauge Units - Category-based unit conversion
//!
//! Every unit belongs to exactly one category and is defined against that
//! category's base unit. Converting between two units of a category goes
//! through the base unit: a single factor ratio for linear categories, an
//! explicit pair of functions for temperature.
//!
//! Categories:
//! - Length (m, km, ft, mi, etc.)
//! - Weight (kg, g, lb, oz, etc.)
//! - Volume (L, mL, gal, cup, cm3, etc.)
//! - Area (m2, ft2, acre, ha, etc.)
//! - Density (g/cm3, kg/m3, lb/ft3, etc.)
//! - Temperature (C, F, K)
//! - Data size (bit, B, Mb, MB, etc.)
//! - Data rate (bps, Mbps, MB/s, etc.)
//! - Time (s, min, h, d, etc.)
//! - Speed (m/s, km/h, mph, kn)
//! - Pace (min/km, min/mi)

mod unit;
mod category;
mod units;
mod resolve;
mod parse;
mod functions;

pub use unit::{AffineRule, ConversionError, Rule, UnitDefinition};
pub use category::{CategoryKind, UnitCategory};
pub use units::{RegistryBuilder, UnitRegistry, UNITS};
pub use resolve::{convert, from_base, to_base, ConversionRequest};
pub use parse::{
    find_unit, parse_conversion, parse_conversion_in, parse_quantity, parse_quantity_in,
    ConversionSpec, Quantity,
};
pub use functions::{describe_category, describe_units};

use gauge_plugin::PluginRegistry;

/// Load unit functions into registry
pub fn load_units_library(registry: PluginRegistry) -> PluginRegistry {
    registry
        // Conversion
        .with_function(functions::Convert)
        .with_function(functions::ToBase)
        .with_function(functions::InUnits)
        .with_function(functions::Density)

        // Inspection
        .with_function(functions::Categories)
        .with_function(functions::Units)
        .with_function(functions::Compatible)

        // Construction
        .with_function(functions::QuantityFn)
}
