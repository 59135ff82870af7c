//! Unit conversion functions for Gauge

use gauge_plugin::prelude::*;
use crate::category::UnitCategory;
use crate::unit::ConversionError;
use crate::units::UNITS;
use crate::parse::{find_unit, parse_conversion, ConversionSpec};

fn conversion_error(func: &str, e: ConversionError) -> Value {
    Value::Error(GaugeError::from(e).in_function(func))
}

/// The named category, or the category of `unit` when none is given
fn resolve_category(unit: &str, category: Option<&str>) -> Result<&'static UnitCategory, ConversionError> {
    match category {
        Some(name) => UNITS.category(name),
        None => find_unit(&UNITS, unit).map(|(category, _)| category),
    }
}

// ============ convert ============

pub struct Convert;

static CONVERT_ARGS: [ArgMeta; 4] = [
    ArgMeta::required("value", "Number", "Value to convert"),
    ArgMeta::required("from_unit", "Text", "Source unit (e.g., \"km\")"),
    ArgMeta::required("to_unit", "Text", "Target unit (e.g., \"mi\")"),
    ArgMeta::optional("category", "Text", "Unit category; inferred from from_unit when omitted", "inferred"),
];

static CONVERT_EXAMPLES: [&str; 4] = [
    "convert(100, \"km\", \"mi\") → 62.137",
    "convert(32, \"F\", \"C\") → 0",
    "convert(1, \"GB\", \"Mb\", \"data-size\") → 8192",
    "convert(1, \"kg\", \"lb\") → 2.205",
];

static CONVERT_RELATED: [&str; 3] = ["to_base", "in_units", "quantity"];

impl FunctionPlugin for Convert {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "convert",
            description: "Convert a value from one unit to another within a category",
            usage: "convert(value, from_unit, to_unit, [category])",
            args: &CONVERT_ARGS,
            returns: "Number",
            examples: &CONVERT_EXAMPLES,
            category: "units",
            related: &CONVERT_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        if args.len() < 3 {
            return Value::Error(GaugeError::arg_count("convert", 3, args.len()));
        }

        let value = match extract_number(&args[0], "convert", "value") {
            Ok(n) => n,
            Err(e) => return Value::Error(e),
        };
        let from = match extract_text(&args[1], "convert", "from_unit") {
            Ok(s) => s,
            Err(e) => return Value::Error(e),
        };
        let to = match extract_text(&args[2], "convert", "to_unit") {
            Ok(s) => s,
            Err(e) => return Value::Error(e),
        };
        let category = match optional_text(args, 3, "convert", "category") {
            Ok(c) => c,
            Err(e) => return Value::Error(e),
        };

        let result = match category {
            Some(name) => UNITS.category(name).and_then(|c| c.convert(from, to, value)),
            None => ConversionSpec::resolve(&UNITS, from, to).and_then(|spec| spec.apply(value)),
        };
        match result {
            Ok(n) => Value::Number(n),
            Err(e) => conversion_error("convert", e),
        }
    }
}

// ============ to_base ============

pub struct ToBase;

static TO_BASE_ARGS: [ArgMeta; 3] = [
    ArgMeta::required("value", "Number", "Value to convert"),
    ArgMeta::required("unit", "Text", "Source unit"),
    ArgMeta::optional("category", "Text", "Unit category; inferred from unit when omitted", "inferred"),
];

static TO_BASE_EXAMPLES: [&str; 3] = [
    "to_base(5, \"km\") → 5000",
    "to_base(212, \"F\") → 100",
    "to_base(1, \"KB\") → 8192",
];

static TO_BASE_RELATED: [&str; 2] = ["convert", "units"];

impl FunctionPlugin for ToBase {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "to_base",
            description: "Convert a value to its category's base unit",
            usage: "to_base(value, unit, [category])",
            args: &TO_BASE_ARGS,
            returns: "Number",
            examples: &TO_BASE_EXAMPLES,
            category: "units",
            related: &TO_BASE_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        if args.len() < 2 {
            return Value::Error(GaugeError::arg_count("to_base", 2, args.len()));
        }

        let value = match extract_number(&args[0], "to_base", "value") {
            Ok(n) => n,
            Err(e) => return Value::Error(e),
        };
        let unit = match extract_text(&args[1], "to_base", "unit") {
            Ok(s) => s,
            Err(e) => return Value::Error(e),
        };
        let category = match optional_text(args, 2, "to_base", "category") {
            Ok(c) => c,
            Err(e) => return Value::Error(e),
        };

        match resolve_category(unit, category).and_then(|c| c.to_base(unit, value)) {
            Ok(n) => Value::Number(n),
            Err(e) => conversion_error("to_base", e),
        }
    }
}

// ============ in_units ============

pub struct InUnits;

static IN_UNITS_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("value", "Number", "Value to convert"),
    ArgMeta::required("conversion", "Text", "Conversion such as \"km->mi\" or \"F to C\""),
];

static IN_UNITS_EXAMPLES: [&str; 3] = [
    "in_units(10, \"km->mi\") → 6.2137",
    "in_units(100, \"C to F\") → 212",
    "in_units(1, \"gal → cup\") → 16",
];

static IN_UNITS_RELATED: [&str; 2] = ["convert", "compatible"];

impl FunctionPlugin for InUnits {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "in_units",
            description: "Convert using a single \"from->to\" conversion string",
            usage: "in_units(value, \"from->to\")",
            args: &IN_UNITS_ARGS,
            returns: "Number",
            examples: &IN_UNITS_EXAMPLES,
            category: "units",
            related: &IN_UNITS_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        if args.len() < 2 {
            return Value::Error(GaugeError::arg_count("in_units", 2, args.len()));
        }

        let value = match extract_number(&args[0], "in_units", "value") {
            Ok(n) => n,
            Err(e) => return Value::Error(e),
        };
        let conversion = match extract_text(&args[1], "in_units", "conversion") {
            Ok(s) => s,
            Err(e) => return Value::Error(e),
        };

        match parse_conversion(conversion).and_then(|spec| spec.apply(value)) {
            Ok(n) => Value::Number(n),
            Err(e) => conversion_error("in_units", e),
        }
    }
}

// ============ categories ============

pub struct Categories;

static CATEGORIES_EXAMPLES: [&str; 1] = ["categories() → [{name: \"length\", base: \"m\", ...}, ...]"];

static CATEGORIES_RELATED: [&str; 1] = ["units"];

impl FunctionPlugin for Categories {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "categories",
            description: "List unit categories with their base unit and units",
            usage: "categories()",
            args: &[],
            returns: "List",
            examples: &CATEGORIES_EXAMPLES,
            category: "units",
            related: &CATEGORIES_RELATED,
        }
    }

    fn call(&self, _args: &[Value], _ctx: &EvalContext) -> Value {
        Value::List(UNITS.categories().iter().map(describe_category).collect())
    }
}

pub fn describe_category(category: &UnitCategory) -> Value {
    Value::object([
        ("name", Value::from(category.name())),
        ("base", Value::from(category.base_unit().symbol.as_str())),
        ("kind", Value::Text(category.kind().to_string())),
        ("aliases", Value::List(category.aliases().iter().map(|a| Value::from(a.as_str())).collect())),
        ("units", Value::List(category.units().iter().map(|u| Value::from(u.symbol.as_str())).collect())),
    ])
}

// ============ units ============

pub struct Units;

static UNITS_ARGS: [ArgMeta; 1] = [
    ArgMeta::required("category", "Text", "Category name or alias"),
];

static UNITS_EXAMPLES: [&str; 2] = [
    "units(\"length\") → [{symbol: \"m\", name: \"meter\", factor: 1}, ...]",
    "units(\"temperature\") → [{symbol: \"C\", name: \"celsius\"}, ...]",
];

static UNITS_RELATED: [&str; 2] = ["categories", "to_base"];

impl FunctionPlugin for Units {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "units",
            description: "List the units of a category",
            usage: "units(category)",
            args: &UNITS_ARGS,
            returns: "List",
            examples: &UNITS_EXAMPLES,
            category: "units",
            related: &UNITS_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        if args.is_empty() {
            return Value::Error(GaugeError::arg_count("units", 1, args.len()));
        }

        let name = match extract_text(&args[0], "units", "category") {
            Ok(s) => s,
            Err(e) => return Value::Error(e),
        };
        match UNITS.category(name) {
            Ok(category) => describe_units(category),
            Err(e) => conversion_error("units", e),
        }
    }
}

pub fn describe_units(category: &UnitCategory) -> Value {
    Value::List(category.units().iter().map(|unit| {
        let mut fields = vec![
            ("symbol", Value::from(unit.symbol.as_str())),
            ("name", Value::from(unit.name.as_str())),
            ("aliases", Value::List(unit.aliases.iter().map(|a| Value::from(a.as_str())).collect())),
        ];
        if let Some(factor) = unit.factor_to_base() {
            fields.push(("factor", Value::Number(factor)));
        }
        Value::object(fields)
    }).collect())
}

// ============ compatible ============

pub struct Compatible;

static COMPATIBLE_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("unit1", "Text", "First unit"),
    ArgMeta::required("unit2", "Text", "Second unit"),
];

static COMPATIBLE_EXAMPLES: [&str; 3] = [
    "compatible(\"km\", \"mi\") → true",
    "compatible(\"kg\", \"m\") → false",
    "compatible(\"MB\", \"Gb\") → true",
];

static COMPATIBLE_RELATED: [&str; 2] = ["convert", "in_units"];

impl FunctionPlugin for Compatible {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "compatible",
            description: "Check whether two units belong to the same category",
            usage: "compatible(unit1, unit2)",
            args: &COMPATIBLE_ARGS,
            returns: "Bool",
            examples: &COMPATIBLE_EXAMPLES,
            category: "units",
            related: &COMPATIBLE_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        if args.len() < 2 {
            return Value::Error(GaugeError::arg_count("compatible", 2, args.len()));
        }

        let unit1 = match extract_text(&args[0], "compatible", "unit1") {
            Ok(s) => s,
            Err(e) => return Value::Error(e),
        };
        let unit2 = match extract_text(&args[1], "compatible", "unit2") {
            Ok(s) => s,
            Err(e) => return Value::Error(e),
        };

        let category = match find_unit(&UNITS, unit1) {
            Ok((category, _)) => category,
            Err(e) => return conversion_error("compatible", e),
        };
        if category.get(unit2).is_some() {
            return Value::Bool(true);
        }
        match find_unit(&UNITS, unit2) {
            Ok(_) => Value::Bool(false),
            Err(e) => conversion_error("compatible", e),
        }
    }
}

// ============ density ============

pub struct Density;

static DENSITY_ARGS: [ArgMeta; 5] = [
    ArgMeta::required("mass", "Number", "Mass of the sample"),
    ArgMeta::required("mass_unit", "Text", "Unit of mass (weight category)"),
    ArgMeta::required("volume", "Number", "Volume of the sample"),
    ArgMeta::required("volume_unit", "Text", "Unit of volume"),
    ArgMeta::optional("target_unit", "Text", "Density unit for the result", "g/cm3"),
];

static DENSITY_EXAMPLES: [&str; 3] = [
    "density(100, \"g\", 50, \"cm3\") → 2",
    "density(1, \"kg\", 1, \"L\", \"kg/m3\") → 1000",
    "density(8.34, \"lb\", 1, \"gal\") → 0.999",
];

static DENSITY_RELATED: [&str; 2] = ["convert", "units"];

impl FunctionPlugin for Density {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "density",
            description: "Density from a mass and a volume",
            usage: "density(mass, mass_unit, volume, volume_unit, [target_unit])",
            args: &DENSITY_ARGS,
            returns: "Number",
            examples: &DENSITY_EXAMPLES,
            category: "units",
            related: &DENSITY_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        if args.len() < 4 {
            return Value::Error(GaugeError::arg_count("density", 4, args.len()));
        }

        let mass = match extract_number(&args[0], "density", "mass") {
            Ok(n) => n,
            Err(e) => return Value::Error(e),
        };
        let mass_unit = match extract_text(&args[1], "density", "mass_unit") {
            Ok(s) => s,
            Err(e) => return Value::Error(e),
        };
        let volume = match extract_number(&args[2], "density", "volume") {
            Ok(n) => n,
            Err(e) => return Value::Error(e),
        };
        let volume_unit = match extract_text(&args[3], "density", "volume_unit") {
            Ok(s) => s,
            Err(e) => return Value::Error(e),
        };
        let target = match optional_text(args, 4, "density", "target_unit") {
            Ok(t) => t.unwrap_or("g/cm3"),
            Err(e) => return Value::Error(e),
        };

        let volume = match validate_positive(volume, "density", "volume") {
            Ok(v) => v,
            Err(e) => return Value::Error(e),
        };

        let result = UNITS.convert("weight", mass_unit, "g", mass)
            .and_then(|grams| {
                let cm3 = UNITS.convert("volume", volume_unit, "cm3", volume)?;
                let density = grams / cm3;
                if !density.is_finite() {
                    return Err(ConversionError::NumericOverflow {
                        value: mass,
                        from: format!("{}/{}", mass_unit, volume_unit),
                        to: target.to_string(),
                    });
                }
                UNITS.convert("density", "g/cm3", target, density)
            });
        match result {
            Ok(n) => Value::Number(n),
            Err(e) => conversion_error("density", e),
        }
    }
}

// ============ quantity ============

pub struct QuantityFn;

static QUANTITY_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("value", "Number", "Numeric value"),
    ArgMeta::required("unit", "Text", "Unit symbol or alias"),
];

static QUANTITY_EXAMPLES: [&str; 2] = [
    "quantity(5, \"kilometers\") → \"5 km\"",
    "quantity(1.5, \"GB\") → \"1.5 GB\"",
];

static QUANTITY_RELATED: [&str; 2] = ["convert", "compatible"];

impl FunctionPlugin for QuantityFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "quantity",
            description: "Render a value with its canonical unit symbol",
            usage: "quantity(value, unit)",
            args: &QUANTITY_ARGS,
            returns: "Text",
            examples: &QUANTITY_EXAMPLES,
            category: "units",
            related: &QUANTITY_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        if args.len() < 2 {
            return Value::Error(GaugeError::arg_count("quantity", 2, args.len()));
        }

        let value = match extract_number(&args[0], "quantity", "value") {
            Ok(n) => n,
            Err(e) => return Value::Error(e),
        };
        let unit = match extract_text(&args[1], "quantity", "unit") {
            Ok(s) => s,
            Err(e) => return Value::Error(e),
        };

        match find_unit(&UNITS, unit) {
            Ok((_, unit)) => Value::Text(format!("{} {}", ctx.format(value), unit.symbol)),
            Err(e) => conversion_error("quantity", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn ctx() -> EvalContext {
        EvalContext::new(Arc::new(crate::load_units_library(PluginRegistry::new())))
    }

    fn call(name: &str, args: Vec<Value>) -> Value {
        let ctx = ctx();
        ctx.registry.call_function(name, &args, &ctx)
    }

    fn number(v: Value) -> f64 {
        v.as_number().unwrap_or_else(|| panic!("expected number, got {:?}", v))
    }

    #[test]
    fn test_convert_infers_category() {
        let mi = number(call("convert", vec![100.0.into(), "km".into(), "mi".into()]));
        assert!((mi - 62.137119).abs() < 1e-6);
        let c = number(call("convert", vec![32.0.into(), "F".into(), "C".into()]));
        assert!(c.abs() < 1e-12);
    }

    #[test]
    fn test_convert_with_category() {
        let mb = call("convert", vec![1.0.into(), "GB".into(), "Mb".into(), "bandwidth".into()]);
        assert_eq!(mb, Value::Number(8192.0));
    }

    #[test]
    fn test_convert_accepts_text_numbers() {
        let m = call("convert", vec!["2.5".into(), "km".into(), "m".into()]);
        assert_eq!(m, Value::Number(2500.0));
    }

    #[test]
    fn test_convert_errors() {
        let err = call("convert", vec![1.0.into(), "m".into(), "parsecs".into()]);
        assert_eq!(err.as_error().unwrap().code, codes::UNKNOWN_UNIT);

        let err = call("convert", vec![1.0.into(), "kg".into(), "m".into()]);
        assert_eq!(err.as_error().unwrap().code, codes::INCOMPATIBLE_UNITS);

        let err = call("convert", vec![1.0.into(), "kg".into(), "m".into(), "weight".into()]);
        assert_eq!(err.as_error().unwrap().code, codes::UNKNOWN_UNIT);

        let err = call("convert", vec![1.0.into(), "m".into(), "ft".into(), "luminosity".into()]);
        assert_eq!(err.as_error().unwrap().code, codes::UNKNOWN_CATEGORY);

        let err = call("convert", vec![Value::Number(f64::INFINITY), "m".into(), "ft".into()]);
        assert_eq!(err.as_error().unwrap().code, codes::INVALID_NUMBER);

        let err = call("convert", vec![1.0.into(), "m".into()]);
        assert_eq!(err.as_error().unwrap().code, codes::ARG_COUNT);
    }

    #[test]
    fn test_direct_calls_check_arity() {
        let ctx = ctx();
        for name in ctx.registry.function_names() {
            let f = ctx.registry.get_function(name).unwrap();
            let required = f.meta().required_args();
            if required == 0 {
                continue;
            }
            for len in [0, required - 1] {
                let result = f.call(&vec![Value::Null; len], &ctx);
                assert_eq!(result.as_error().unwrap().code, codes::ARG_COUNT, "{} with {} args", name, len);
            }
        }
    }

    #[test]
    fn test_to_base() {
        assert_eq!(call("to_base", vec![5.0.into(), "km".into()]), Value::Number(5000.0));
        assert_eq!(call("to_base", vec![1.0.into(), "KB".into()]), Value::Number(8192.0));
        let c = number(call("to_base", vec![212.0.into(), "F".into()]));
        assert!((c - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_in_units() {
        assert_eq!(call("in_units", vec![1.0.into(), "gal → cup".into()]), Value::Number(16.0));
        let err = call("in_units", vec![1.0.into(), "kg->m".into()]);
        assert_eq!(err.as_error().unwrap().code, codes::INCOMPATIBLE_UNITS);
    }

    #[test]
    fn test_categories_and_units() {
        let cats = call("categories", vec![]);
        let names: Vec<String> = cats.as_list().unwrap().iter()
            .map(|c| c.get("name").as_text().unwrap().to_string())
            .collect();
        assert!(names.contains(&"density".to_string()));
        assert!(names.contains(&"temperature".to_string()));

        let units = call("units", vec!["mass".into()]);
        let first = &units.as_list().unwrap()[0];
        assert_eq!(first.get("symbol"), Value::from("kg"));
        assert_eq!(first.get("factor"), Value::Number(1.0));

        let temps = call("units", vec!["temperature".into()]);
        assert!(temps.as_list().unwrap()[0].get("factor").is_error());
    }

    #[test]
    fn test_compatible() {
        assert_eq!(call("compatible", vec!["km".into(), "mi".into()]), Value::Bool(true));
        assert_eq!(call("compatible", vec!["kg".into(), "m".into()]), Value::Bool(false));
        assert_eq!(call("compatible", vec!["MB".into(), "Gb".into()]), Value::Bool(true));
        assert!(call("compatible", vec!["kg".into(), "parsec".into()]).is_error());
    }

    #[test]
    fn test_density() {
        let d = call("density", vec![100.0.into(), "g".into(), 50.0.into(), "cm3".into()]);
        assert_eq!(d, Value::Number(2.0));

        let kg_m3 = number(call("density", vec![1.0.into(), "kg".into(), 1.0.into(), "L".into(), "kg/m3".into()]));
        assert!((kg_m3 - 1000.0).abs() < 1e-9);

        let err = call("density", vec![1.0.into(), "g".into(), 0.0.into(), "cm3".into()]);
        assert_eq!(err.as_error().unwrap().code, codes::DOMAIN_ERROR);

        let err = call("density", vec![1e300.into(), "kg".into(), 1e-10.into(), "cm3".into()]);
        assert_eq!(err.as_error().unwrap().code, codes::OVERFLOW);
    }

    #[test]
    fn test_quantity() {
        assert_eq!(call("quantity", vec![5.0.into(), "kilometers".into()]), Value::from("5 km"));
        assert_eq!(call("quantity", vec![(1.0 / 3.0).into(), "h".into()]), Value::from("0.333333 h"));
    }
}
