//! Apparent temperature: heat index and wind chill
//!
//! Both follow the US National Weather Service formulas, which are fitted
//! in Fahrenheit and miles per hour. Inputs are converted into those units
//! first and the result is converted back to the caller's temperature unit.

use gauge_plugin::prelude::*;
use gauge_units::convert;
use tracing::debug;

fn to_fahrenheit(value: f64, unit: &str) -> Result<f64, GaugeError> {
    Ok(convert("temperature", unit, "F", value)?)
}

fn from_fahrenheit(value: f64, unit: &str, func: &str) -> Result<f64, GaugeError> {
    if !value.is_finite() {
        return Err(GaugeError::overflow().in_function(func));
    }
    Ok(convert("temperature", "F", unit, value)?)
}

/// NWS heat index in °F
pub fn heat_index_f(t: f64, rh: f64) -> f64 {
    let simple = 0.5 * (t + 61.0 + (t - 68.0) * 1.2 + rh * 0.094);
    if (simple + t) / 2.0 < 80.0 {
        return simple;
    }

    // Rothfusz regression
    let mut hi = -42.379
        + 2.049_015_23 * t
        + 10.143_331_27 * rh
        - 0.224_755_41 * t * rh
        - 0.006_837_83 * t * t
        - 0.054_817_17 * rh * rh
        + 0.001_228_74 * t * t * rh
        + 0.000_852_82 * t * rh * rh
        - 0.000_001_99 * t * t * rh * rh;

    if rh < 13.0 && (80.0..=112.0).contains(&t) {
        hi -= ((13.0 - rh) / 4.0) * ((17.0 - (t - 95.0).abs()) / 17.0).sqrt();
    } else if rh > 85.0 && (80.0..=87.0).contains(&t) {
        hi += ((rh - 85.0) / 10.0) * ((87.0 - t) / 5.0);
    }
    hi
}

/// NWS (2001) wind chill in °F; outside its validity range the air
/// temperature is returned unchanged
pub fn wind_chill_f(t: f64, mph: f64) -> f64 {
    if t > 50.0 || mph < 3.0 {
        return t;
    }
    let v = mph.powf(0.16);
    35.74 + 0.6215 * t - 35.75 * v + 0.4275 * t * v
}

// ============ heat_index ============

pub struct HeatIndex;

static HEAT_INDEX_ARGS: [ArgMeta; 3] = [
    ArgMeta::required("temperature", "Number", "Air temperature"),
    ArgMeta::required("humidity", "Number", "Relative humidity in percent (0-100)"),
    ArgMeta::optional("unit", "Text", "Temperature unit of input and result", "F"),
];

static HEAT_INDEX_EXAMPLES: [&str; 3] = [
    "heat_index(90, 70) → 105.9",
    "heat_index(70, 50) → 69.05",
    "heat_index(32, 70, \"C\") → 40.9",
];

static HEAT_INDEX_RELATED: [&str; 1] = ["wind_chill"];

impl FunctionPlugin for HeatIndex {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "heat_index",
            description: "Apparent temperature from air temperature and humidity",
            usage: "heat_index(temperature, humidity, [unit])",
            args: &HEAT_INDEX_ARGS,
            returns: "Number",
            examples: &HEAT_INDEX_EXAMPLES,
            category: "widgets",
            related: &HEAT_INDEX_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        heat_index(args).unwrap_or_else(Value::Error)
    }
}

fn heat_index(args: &[Value]) -> Result<Value, GaugeError> {
    const NAME: &str = "heat_index";
    if args.len() < 2 {
        return Err(GaugeError::arg_count(NAME, 2, args.len()));
    }
    let temperature = extract_number(&args[0], NAME, "temperature")?;
    let humidity = extract_number(&args[1], NAME, "humidity")?;
    let unit = optional_text(args, 2, NAME, "unit")?.unwrap_or("F");

    if !(0.0..=100.0).contains(&humidity) {
        return Err(GaugeError::domain_error(format!(
            "{}(): humidity must be between 0 and 100, got {}",
            NAME, humidity
        )).in_function(NAME).for_argument("humidity"));
    }

    let t = to_fahrenheit(temperature, unit)?;
    let hi = heat_index_f(t, humidity);
    debug!(t, humidity, hi, "heat index");
    Ok(Value::Number(from_fahrenheit(hi, unit, NAME)?))
}

// ============ wind_chill ============

pub struct WindChill;

static WIND_CHILL_ARGS: [ArgMeta; 4] = [
    ArgMeta::required("temperature", "Number", "Air temperature"),
    ArgMeta::required("wind_speed", "Number", "Wind speed"),
    ArgMeta::optional("temp_unit", "Text", "Temperature unit of input and result", "F"),
    ArgMeta::optional("speed_unit", "Text", "Wind speed unit", "mph"),
];

static WIND_CHILL_EXAMPLES: [&str; 3] = [
    "wind_chill(0, 15) → -19.4",
    "wind_chill(-10, 24, \"C\", \"km/h\") → -19.6",
    "wind_chill(60, 20) → 60",
];

static WIND_CHILL_RELATED: [&str; 1] = ["heat_index"];

impl FunctionPlugin for WindChill {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "wind_chill",
            description: "Apparent temperature from air temperature and wind speed",
            usage: "wind_chill(temperature, wind_speed, [temp_unit], [speed_unit])",
            args: &WIND_CHILL_ARGS,
            returns: "Number",
            examples: &WIND_CHILL_EXAMPLES,
            category: "widgets",
            related: &WIND_CHILL_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        wind_chill(args).unwrap_or_else(Value::Error)
    }
}

fn wind_chill(args: &[Value]) -> Result<Value, GaugeError> {
    const NAME: &str = "wind_chill";
    if args.len() < 2 {
        return Err(GaugeError::arg_count(NAME, 2, args.len()));
    }
    let temperature = extract_number(&args[0], NAME, "temperature")?;
    let wind_speed = validate_non_negative(extract_number(&args[1], NAME, "wind_speed")?, NAME, "wind_speed")?;
    let temp_unit = optional_text(args, 2, NAME, "temp_unit")?.unwrap_or("F");
    let speed_unit = optional_text(args, 3, NAME, "speed_unit")?.unwrap_or("mph");

    let t = to_fahrenheit(temperature, temp_unit)?;
    let mph = convert("speed", speed_unit, "mph", wind_speed)?;
    let wc = wind_chill_f(t, mph);
    Ok(Value::Number(from_fahrenheit(wc, temp_unit, NAME)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn call(f: &dyn FunctionPlugin, args: Vec<Value>) -> Value {
        let ctx = EvalContext::new(Arc::new(PluginRegistry::new()));
        f.call(&args, &ctx)
    }

    fn number(v: Value) -> f64 {
        v.as_number().unwrap_or_else(|| panic!("expected number, got {:?}", v))
    }

    #[test]
    fn test_heat_index_simple_formula() {
        assert!((heat_index_f(70.0, 50.0) - 69.05).abs() < 1e-9);
    }

    #[test]
    fn test_heat_index_regression() {
        assert!((heat_index_f(90.0, 70.0) - 105.9220206).abs() < 1e-6);
    }

    #[test]
    fn test_heat_index_humidity_adjustments() {
        // Low humidity lowers the regression value
        assert!((heat_index_f(100.0, 10.0) - 94.1224827).abs() < 1e-6);
        // High humidity raises it
        assert!((heat_index_f(85.0, 90.0) - 101.7808036).abs() < 1e-6);
    }

    #[test]
    fn test_heat_index_in_celsius() {
        let c = number(call(&HeatIndex, vec![(32.0 + 2.0 / 9.0).into(), 70.0.into(), "C".into()]));
        assert!((c - (105.9220206 - 32.0) * 5.0 / 9.0).abs() < 1e-5);
    }

    #[test]
    fn test_heat_index_humidity_range() {
        let result = call(&HeatIndex, vec![90.0.into(), 120.0.into()]);
        assert_eq!(result.as_error().unwrap().code, codes::DOMAIN_ERROR);
    }

    #[test]
    fn test_heat_index_overflow() {
        let result = call(&HeatIndex, vec![1e200.into(), 50.0.into()]);
        assert_eq!(result.as_error().unwrap().code, codes::OVERFLOW);
    }

    #[test]
    fn test_wind_chill() {
        let wc = number(call(&WindChill, vec![0.0.into(), 15.0.into()]));
        assert!((wc - (-19.397954108)).abs() < 1e-6);
    }

    #[test]
    fn test_wind_chill_outside_validity() {
        assert_eq!(call(&WindChill, vec![60.0.into(), 20.0.into()]), Value::Number(60.0));
        assert_eq!(call(&WindChill, vec![20.0.into(), 2.0.into()]), Value::Number(20.0));
    }

    #[test]
    fn test_wind_chill_metric_units() {
        let c = number(call(&WindChill, vec![(-10.0).into(), 24.0.into(), "C".into(), "km/h".into()]));
        let t = -10.0 * 9.0 / 5.0 + 32.0;
        let mph = 24.0 * (1000.0 / 3600.0) / 0.44704;
        let expected = (wind_chill_f(t, mph) - 32.0) * 5.0 / 9.0;
        assert!((c - expected).abs() < 1e-9);
        assert!(c < -10.0);
    }

    #[test]
    fn test_unknown_temperature_unit() {
        let result = call(&WindChill, vec![0.0.into(), 15.0.into(), "R".into()]);
        assert_eq!(result.as_error().unwrap().code, codes::UNKNOWN_UNIT);
    }
}
