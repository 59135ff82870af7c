//! Unit registry and the built-in unit tables
//!
//! One table per category, each expressed against a single base unit.
//! Every calculator reads from the same process-wide [`UNITS`] registry.

use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;
use crate::category::UnitCategory;
use crate::unit::{ConversionError, UnitDefinition};

/// Global unit registry
pub static UNITS: LazyLock<UnitRegistry> = LazyLock::new(|| {
    UnitRegistry::builtin().expect("built-in unit tables are well-formed")
});

/// Immutable registry of unit categories
#[derive(Debug, Clone)]
pub struct UnitRegistry {
    categories: Vec<UnitCategory>,
    by_name: HashMap<String, usize>,
}

impl UnitRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// The registry behind [`UNITS`]
    pub fn builtin() -> Result<Self, ConversionError> {
        let length = length()?;
        let weight = weight()?;
        let volume = volume()?;
        let density = density(&weight, &volume)?;

        let registry = UnitRegistry::builder()
            .category(length)?
            .category(weight)?
            .category(volume)?
            .category(area()?)?
            .category(density)?
            .category(temperature()?)?
            .category(data_size()?)?
            .category(data_rate()?)?
            .category(time()?)?
            .category(speed()?)?
            .category(pace()?)?
            .build();

        debug!(categories = registry.categories.len(), "unit registry initialized");
        Ok(registry)
    }

    /// Look up a category by name or alias (case-insensitive)
    pub fn get_category(&self, name: &str) -> Option<&UnitCategory> {
        self.by_name
            .get(&name.trim().to_lowercase())
            .map(|&index| &self.categories[index])
    }

    /// Like [`get_category`](Self::get_category), but signals `UnknownCategory`
    pub fn category(&self, name: &str) -> Result<&UnitCategory, ConversionError> {
        self.get_category(name)
            .ok_or_else(|| ConversionError::UnknownCategory(name.to_string()))
    }

    /// Look up a unit within a category
    pub fn unit(&self, category: &str, unit: &str) -> Result<&UnitDefinition, ConversionError> {
        self.category(category)?.unit(unit)
    }

    /// Categories in registration order
    pub fn categories(&self) -> &[UnitCategory] {
        &self.categories
    }

    pub fn category_names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name()).collect()
    }

    /// Find a unit in any category. Categories are searched in
    /// registration order and the first match wins.
    pub fn find_unit(&self, unit: &str) -> Option<(&UnitCategory, &UnitDefinition)> {
        self.categories
            .iter()
            .find_map(|c| c.get(unit).map(|u| (c, u)))
    }
}

/// Collects categories, then freezes them into a [`UnitRegistry`]
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    categories: Vec<UnitCategory>,
    by_name: HashMap<String, usize>,
}

impl RegistryBuilder {
    pub fn category(mut self, category: UnitCategory) -> Result<Self, ConversionError> {
        let index = self.categories.len();
        let names = std::iter::once(category.name().to_lowercase())
            .chain(category.aliases().iter().cloned());
        for name in names {
            if self.by_name.insert(name.clone(), index).is_some() {
                return Err(ConversionError::DuplicateCategory(name));
            }
        }
        self.categories.push(category);
        Ok(self)
    }

    pub fn build(self) -> UnitRegistry {
        UnitRegistry {
            categories: self.categories,
            by_name: self.by_name,
        }
    }
}

fn length() -> Result<UnitCategory, ConversionError> {
    UnitCategory::linear("length",
        UnitDefinition::linear("m", "meter", 1.0).with_aliases(&["meters", "metre", "metres"]))?
        .with_unit(UnitDefinition::linear("km", "kilometer", 1000.0)
            .with_aliases(&["kilometers", "kilometre", "kilometres"]))?
        .with_unit(UnitDefinition::linear("cm", "centimeter", 0.01)
            .with_aliases(&["centimeters", "centimetre", "centimetres"]))?
        .with_unit(UnitDefinition::linear("mm", "millimeter", 0.001)
            .with_aliases(&["millimeters", "millimetre", "millimetres"]))?
        .with_unit(UnitDefinition::linear("ft", "foot", 0.3048).with_aliases(&["feet", "foot"]))?
        .with_unit(UnitDefinition::linear("mi", "mile", 1609.344).with_aliases(&["miles", "mile"]))?
        .with_unit(UnitDefinition::linear("in", "inch", 0.0254).with_aliases(&["inches", "inch"]))?
        .with_unit(UnitDefinition::linear("yd", "yard", 0.9144).with_aliases(&["yards", "yard"]))
        .map(|c| c.with_aliases(&["distance"]))
}

fn weight() -> Result<UnitCategory, ConversionError> {
    UnitCategory::linear("weight",
        UnitDefinition::linear("kg", "kilogram", 1.0).with_aliases(&["kilograms", "kilogram", "kgs"]))?
        .with_unit(UnitDefinition::linear("g", "gram", 0.001).with_aliases(&["grams", "gram"]))?
        .with_unit(UnitDefinition::linear("mg", "milligram", 0.000001)
            .with_aliases(&["milligrams", "milligram"]))?
        .with_unit(UnitDefinition::linear("lb", "pound", 0.45359237).with_aliases(&["pounds", "pound", "lbs"]))?
        .with_unit(UnitDefinition::linear("oz", "ounce", 0.028349523125).with_aliases(&["ounces", "ounce"]))?
        .with_unit(UnitDefinition::linear("t", "metric ton", 1000.0)
            .with_aliases(&["metric tons", "tonne", "tonnes"]))?
        .with_unit(UnitDefinition::linear("st", "stone", 6.35029318).with_aliases(&["stones", "stone"]))
        .map(|c| c.with_aliases(&["mass"]))
}

fn volume() -> Result<UnitCategory, ConversionError> {
    UnitCategory::linear("volume",
        UnitDefinition::linear("L", "liter", 1.0).with_aliases(&["liters", "litre", "litres"]))?
        .with_unit(UnitDefinition::linear("mL", "milliliter", 0.001)
            .with_aliases(&["milliliters", "millilitre", "millilitres"]))?
        .with_unit(UnitDefinition::linear("gal", "US gallon", 3.785411784)
            .with_aliases(&["gallons", "gallon", "us gallons"]))?
        .with_unit(UnitDefinition::linear("qt", "US quart", 0.946352946).with_aliases(&["quarts", "quart"]))?
        .with_unit(UnitDefinition::linear("pt", "US pint", 0.473176473).with_aliases(&["pints", "pint"]))?
        .with_unit(UnitDefinition::linear("cup", "US cup", 0.2365882365).with_aliases(&["cups"]))?
        .with_unit(UnitDefinition::linear("floz", "US fluid ounce", 0.0295735295625)
            .with_aliases(&["fl oz", "fluid ounces", "fluid ounce"]))?
        .with_unit(UnitDefinition::linear("cm3", "cubic centimeter", 0.001)
            .with_aliases(&["cm³", "cc", "cubic centimeters"]))?
        .with_unit(UnitDefinition::linear("m3", "cubic meter", 1000.0)
            .with_aliases(&["m³", "cubic meters", "cubic metres"]))?
        .with_unit(UnitDefinition::linear("in3", "cubic inch", 0.016387064)
            .with_aliases(&["in³", "cubic inches"]))?
        .with_unit(UnitDefinition::linear("ft3", "cubic foot", 28.316846592)
            .with_aliases(&["ft³", "cubic feet"]))?
        .with_unit(UnitDefinition::linear("yd3", "cubic yard", 764.554857984)
            .with_aliases(&["yd³", "cubic yards"]))
}

fn area() -> Result<UnitCategory, ConversionError> {
    UnitCategory::linear("area",
        UnitDefinition::linear("m2", "square meter", 1.0).with_aliases(&["m²", "sq m", "square meters"]))?
        .with_unit(UnitDefinition::linear("km2", "square kilometer", 1_000_000.0)
            .with_aliases(&["km²", "sq km", "square kilometers"]))?
        .with_unit(UnitDefinition::linear("cm2", "square centimeter", 0.0001)
            .with_aliases(&["cm²", "sq cm", "square centimeters"]))?
        .with_unit(UnitDefinition::linear("ft2", "square foot", 0.09290304)
            .with_aliases(&["ft²", "sq ft", "square feet"]))?
        .with_unit(UnitDefinition::linear("in2", "square inch", 0.00064516)
            .with_aliases(&["in²", "sq in", "square inches"]))?
        .with_unit(UnitDefinition::linear("yd2", "square yard", 0.83612736)
            .with_aliases(&["yd²", "sq yd", "square yards"]))?
        .with_unit(UnitDefinition::linear("acre", "acre", 4046.8564224).with_aliases(&["acres", "ac"]))?
        .with_unit(UnitDefinition::linear("ha", "hectare", 10_000.0).with_aliases(&["hectares"]))
}

/// Density units are mass/volume pairs; their factors come from the
/// weight and volume tables so the three categories cannot drift apart.
fn density(weight: &UnitCategory, volume: &UnitCategory) -> Result<UnitCategory, ConversionError> {
    let composite = |mass: &str, vol: &str, name: &str, aliases: &[&str]| -> Result<UnitDefinition, ConversionError> {
        let ratio = |m: &str, v: &str| -> Result<f64, ConversionError> {
            Ok(weight.unit(m)?.to_base(1.0) / volume.unit(v)?.to_base(1.0))
        };
        let factor = ratio(mass, vol)? / ratio("g", "cm3")?;
        Ok(UnitDefinition::linear(&format!("{}/{}", mass, vol), name, factor).with_aliases(aliases))
    };

    UnitCategory::linear("density",
        composite("g", "cm3", "gram per cubic centimeter", &["g/cc", "g/cm³"])?)?
        .with_unit(composite("g", "mL", "gram per milliliter", &["g/ml"])?)?
        .with_unit(composite("kg", "m3", "kilogram per cubic meter", &["kg/m³"])?)?
        .with_unit(composite("kg", "L", "kilogram per liter", &["kg/l"])?)?
        .with_unit(composite("lb", "ft3", "pound per cubic foot", &["lb/ft³", "pcf"])?)?
        .with_unit(composite("lb", "in3", "pound per cubic inch", &["lb/in³"])?)?
        .with_unit(composite("lb", "gal", "pound per US gallon", &["ppg"])?)
}

fn celsius_identity(c: f64) -> f64 {
    c
}

fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

fn kelvin_to_celsius(k: f64) -> f64 {
    k - 273.15
}

fn celsius_to_kelvin(c: f64) -> f64 {
    c + 273.15
}

fn temperature() -> Result<UnitCategory, ConversionError> {
    UnitCategory::affine("temperature",
        UnitDefinition::affine("C", "celsius", celsius_identity, celsius_identity)
            .with_aliases(&["celsius", "°C", "degC", "centigrade"]))?
        .with_unit(UnitDefinition::affine("F", "fahrenheit", fahrenheit_to_celsius, celsius_to_fahrenheit)
            .with_aliases(&["fahrenheit", "°F", "degF"]))?
        .with_unit(UnitDefinition::affine("K", "kelvin", kelvin_to_celsius, celsius_to_kelvin)
            .with_aliases(&["kelvin", "kelvins"]))
        .map(|c| c.with_aliases(&["temp"]))
}

const KIB: f64 = 1024.0;

/// Binary multiples throughout: 1 GB = 8 × 1024 Mb.
fn data_size() -> Result<UnitCategory, ConversionError> {
    Ok(UnitCategory::linear("data-size",
        UnitDefinition::linear("bit", "bit", 1.0).with_aliases(&["bits", "b"]))?
        .with_unit(UnitDefinition::linear("Kb", "kilobit", KIB).with_aliases(&["kilobits", "kbit"]))?
        .with_unit(UnitDefinition::linear("Mb", "megabit", KIB.powi(2)).with_aliases(&["megabits", "Mbit"]))?
        .with_unit(UnitDefinition::linear("Gb", "gigabit", KIB.powi(3)).with_aliases(&["gigabits", "Gbit"]))?
        .with_unit(UnitDefinition::linear("Tb", "terabit", KIB.powi(4)).with_aliases(&["terabits", "Tbit"]))?
        .with_unit(UnitDefinition::linear("B", "byte", 8.0).with_aliases(&["bytes", "byte"]))?
        .with_unit(UnitDefinition::linear("KB", "kilobyte", 8.0 * KIB).with_aliases(&["kilobytes", "kilobyte"]))?
        .with_unit(UnitDefinition::linear("MB", "megabyte", 8.0 * KIB.powi(2)).with_aliases(&["megabytes", "megabyte"]))?
        .with_unit(UnitDefinition::linear("GB", "gigabyte", 8.0 * KIB.powi(3)).with_aliases(&["gigabytes", "gigabyte"]))?
        .with_unit(UnitDefinition::linear("TB", "terabyte", 8.0 * KIB.powi(4)).with_aliases(&["terabytes", "terabyte"]))?
        .with_aliases(&["data", "bandwidth", "storage"])
        .case_sensitive())
}

fn data_rate() -> Result<UnitCategory, ConversionError> {
    Ok(UnitCategory::linear("data-rate",
        UnitDefinition::linear("bps", "bit per second", 1.0).with_aliases(&["bit/s"]))?
        .with_unit(UnitDefinition::linear("Kbps", "kilobit per second", KIB).with_aliases(&["Kb/s", "kbps"]))?
        .with_unit(UnitDefinition::linear("Mbps", "megabit per second", KIB.powi(2)).with_aliases(&["Mb/s"]))?
        .with_unit(UnitDefinition::linear("Gbps", "gigabit per second", KIB.powi(3)).with_aliases(&["Gb/s"]))?
        .with_unit(UnitDefinition::linear("B/s", "byte per second", 8.0).with_aliases(&["Bps"]))?
        .with_unit(UnitDefinition::linear("KB/s", "kilobyte per second", 8.0 * KIB).with_aliases(&["KBps"]))?
        .with_unit(UnitDefinition::linear("MB/s", "megabyte per second", 8.0 * KIB.powi(2)).with_aliases(&["MBps"]))?
        .with_unit(UnitDefinition::linear("GB/s", "gigabyte per second", 8.0 * KIB.powi(3)).with_aliases(&["GBps"]))?
        .with_aliases(&["throughput", "transfer-rate"])
        .case_sensitive())
}

fn time() -> Result<UnitCategory, ConversionError> {
    UnitCategory::linear("time",
        UnitDefinition::linear("s", "second", 1.0).with_aliases(&["seconds", "sec", "secs"]))?
        .with_unit(UnitDefinition::linear("ms", "millisecond", 0.001).with_aliases(&["milliseconds"]))?
        .with_unit(UnitDefinition::linear("min", "minute", 60.0).with_aliases(&["minutes", "mins"]))?
        .with_unit(UnitDefinition::linear("h", "hour", 3600.0).with_aliases(&["hours", "hr", "hrs"]))?
        .with_unit(UnitDefinition::linear("d", "day", 86_400.0).with_aliases(&["days"]))?
        .with_unit(UnitDefinition::linear("wk", "week", 604_800.0).with_aliases(&["weeks"]))
}

fn speed() -> Result<UnitCategory, ConversionError> {
    UnitCategory::linear("speed",
        UnitDefinition::linear("m/s", "meter per second", 1.0).with_aliases(&["mps", "meters per second"]))?
        .with_unit(UnitDefinition::linear("km/h", "kilometer per hour", 1000.0 / 3600.0)
            .with_aliases(&["kph", "kmh", "kilometers per hour"]))?
        .with_unit(UnitDefinition::linear("mph", "mile per hour", 0.44704)
            .with_aliases(&["mi/h", "miles per hour"]))?
        .with_unit(UnitDefinition::linear("ft/s", "foot per second", 0.3048)
            .with_aliases(&["fps", "feet per second"]))?
        .with_unit(UnitDefinition::linear("kn", "knot", 1852.0 / 3600.0).with_aliases(&["knots", "kt"]))
        .map(|c| c.with_aliases(&["velocity"]))
}

/// Pace is time per distance, with seconds per meter as base.
fn pace() -> Result<UnitCategory, ConversionError> {
    UnitCategory::linear("pace",
        UnitDefinition::linear("s/m", "second per meter", 1.0))?
        .with_unit(UnitDefinition::linear("s/km", "second per kilometer", 0.001))?
        .with_unit(UnitDefinition::linear("min/km", "minute per kilometer", 60.0 / 1000.0)
            .with_aliases(&["minutes per kilometer"]))?
        .with_unit(UnitDefinition::linear("min/mi", "minute per mile", 60.0 / 1609.344)
            .with_aliases(&["minutes per mile"]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CategoryKind;

    #[test]
    fn test_builtin_categories() {
        let reg = UnitRegistry::builtin().unwrap();
        for name in ["length", "weight", "volume", "density", "data-size", "temperature"] {
            assert!(reg.get_category(name).is_some(), "missing category {}", name);
        }
        assert_eq!(reg.category("temperature").unwrap().kind(), CategoryKind::Affine);
        assert!(reg.category("length").unwrap().is_linear());
    }

    #[test]
    fn test_category_aliases() {
        let reg = UnitRegistry::builtin().unwrap();
        assert_eq!(reg.category("mass").unwrap().name(), "weight");
        assert_eq!(reg.category("Data").unwrap().name(), "data-size");
        assert_eq!(reg.category("bandwidth").unwrap().name(), "data-size");
    }

    #[test]
    fn test_unknown_category() {
        let reg = UnitRegistry::builtin().unwrap();
        assert_eq!(
            reg.category("luminosity").unwrap_err(),
            ConversionError::UnknownCategory("luminosity".to_string())
        );
    }

    #[test]
    fn test_base_units_have_factor_one() {
        for category in UNITS.categories() {
            let base = category.base_unit();
            assert!(base.is_identity(), "{} base {} is not identity", category.name(), base.symbol);
        }
    }

    #[test]
    fn test_every_linear_factor_positive() {
        for category in UNITS.categories().iter().filter(|c| c.is_linear()) {
            for unit in category.units() {
                let factor = unit.factor_to_base().unwrap();
                assert!(factor.is_finite() && factor > 0.0, "{} has factor {}", unit.symbol, factor);
            }
        }
    }

    #[test]
    fn test_density_factors_derived_from_mass_and_volume() {
        let density = UNITS.category("density").unwrap();
        assert_eq!(density.base_unit().symbol, "g/cm3");
        assert_eq!(density.factor_to_base("g/mL").unwrap(), Some(1.0));
        let kg_m3 = density.factor_to_base("kg/m3").unwrap().unwrap();
        assert!((kg_m3 - 0.001).abs() < 1e-15);
        let lb_ft3 = density.factor_to_base("lb/ft3").unwrap().unwrap();
        assert!((lb_ft3 - 0.016018463373960).abs() < 1e-12);
    }

    #[test]
    fn test_data_size_binary_multiples() {
        let data = UNITS.category("data-size").unwrap();
        assert_eq!(data.factor_to_base("B").unwrap(), Some(8.0));
        assert_eq!(data.factor_to_base("Mb").unwrap(), Some(1_048_576.0));
        assert_eq!(data.factor_to_base("GB").unwrap(), Some(8.0 * 1_073_741_824.0));
        assert!(data.get("mb").is_none());
    }

    #[test]
    fn test_find_unit_across_categories() {
        let (category, unit) = UNITS.find_unit("gallons").unwrap();
        assert_eq!(category.name(), "volume");
        assert_eq!(unit.symbol, "gal");

        let (category, _) = UNITS.find_unit("°F").unwrap();
        assert_eq!(category.name(), "temperature");

        assert!(UNITS.find_unit("parsec").is_none());
    }

    #[test]
    fn test_builder_rejects_duplicate_category() {
        let first = UnitCategory::linear("length", UnitDefinition::linear("m", "meter", 1.0)).unwrap();
        let second = UnitCategory::linear("Length", UnitDefinition::linear("m", "meter", 1.0)).unwrap();
        let err = UnitRegistry::builder()
            .category(first)
            .and_then(|b| b.category(second))
            .unwrap_err();
        assert_eq!(err, ConversionError::DuplicateCategory("length".to_string()));
    }

    #[test]
    fn test_custom_registry() {
        let mulch = UnitCategory::linear("mulch", UnitDefinition::linear("bag", "2 cu ft bag", 1.0))
            .and_then(|c| c.with_unit(UnitDefinition::linear("yd3", "cubic yard", 13.5)))
            .unwrap();
        let reg = UnitRegistry::builder().category(mulch).unwrap().build();
        assert_eq!(reg.unit("mulch", "yd3").unwrap().factor_to_base(), Some(13.5));
        assert_eq!(reg.category_names(), vec!["mulch"]);
    }
}
