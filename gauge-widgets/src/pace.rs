//! Running pace

use gauge_plugin::prelude::*;
use gauge_units::{from_base, to_base};

/// Pace in `pace_unit` for a time per meter
fn pace_in(seconds_per_meter: f64, pace_unit: &str) -> Result<Value, GaugeError> {
    Ok(Value::finite(from_base("pace", pace_unit, seconds_per_meter)?))
}

// ============ pace ============

pub struct Pace;

static PACE_ARGS: [ArgMeta; 5] = [
    ArgMeta::required("distance", "Number", "Distance covered"),
    ArgMeta::required("distance_unit", "Text", "Length unit (e.g., \"km\", \"mi\")"),
    ArgMeta::required("time", "Number", "Elapsed time"),
    ArgMeta::required("time_unit", "Text", "Time unit (e.g., \"min\", \"h\")"),
    ArgMeta::optional("pace_unit", "Text", "Pace unit for the result", "min/km"),
];

static PACE_EXAMPLES: [&str; 2] = [
    "pace(10, \"km\", 50, \"min\") → 5",
    "pace(26.2, \"mi\", 4, \"h\", \"min/mi\") → 9.16",
];

static PACE_RELATED: [&str; 2] = ["speed_to_pace", "convert"];

impl FunctionPlugin for Pace {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "pace",
            description: "Running pace from distance and elapsed time",
            usage: "pace(distance, distance_unit, time, time_unit, [pace_unit])",
            args: &PACE_ARGS,
            returns: "Number",
            examples: &PACE_EXAMPLES,
            category: "widgets",
            related: &PACE_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        pace(args).unwrap_or_else(Value::Error)
    }
}

fn pace(args: &[Value]) -> Result<Value, GaugeError> {
    const NAME: &str = "pace";
    if args.len() < 4 {
        return Err(GaugeError::arg_count(NAME, 4, args.len()));
    }
    let distance = validate_positive(extract_number(&args[0], NAME, "distance")?, NAME, "distance")?;
    let distance_unit = extract_text(&args[1], NAME, "distance_unit")?;
    let time = validate_non_negative(extract_number(&args[2], NAME, "time")?, NAME, "time")?;
    let time_unit = extract_text(&args[3], NAME, "time_unit")?;
    let pace_unit = optional_text(args, 4, NAME, "pace_unit")?.unwrap_or("min/km");

    let meters = to_base("length", distance_unit, distance)?;
    let seconds = to_base("time", time_unit, time)?;
    pace_in(seconds / meters, pace_unit)
}

// ============ speed_to_pace ============

pub struct SpeedToPace;

static SPEED_TO_PACE_ARGS: [ArgMeta; 3] = [
    ArgMeta::required("speed", "Number", "Speed"),
    ArgMeta::required("speed_unit", "Text", "Speed unit (e.g., \"km/h\", \"mph\")"),
    ArgMeta::optional("pace_unit", "Text", "Pace unit for the result", "min/km"),
];

static SPEED_TO_PACE_EXAMPLES: [&str; 2] = [
    "speed_to_pace(12, \"km/h\") → 5",
    "speed_to_pace(6, \"mph\", \"min/mi\") → 10",
];

static SPEED_TO_PACE_RELATED: [&str; 1] = ["pace"];

impl FunctionPlugin for SpeedToPace {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "speed_to_pace",
            description: "Pace equivalent of a speed",
            usage: "speed_to_pace(speed, speed_unit, [pace_unit])",
            args: &SPEED_TO_PACE_ARGS,
            returns: "Number",
            examples: &SPEED_TO_PACE_EXAMPLES,
            category: "widgets",
            related: &SPEED_TO_PACE_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        speed_to_pace(args).unwrap_or_else(Value::Error)
    }
}

fn speed_to_pace(args: &[Value]) -> Result<Value, GaugeError> {
    const NAME: &str = "speed_to_pace";
    if args.len() < 2 {
        return Err(GaugeError::arg_count(NAME, 2, args.len()));
    }
    let speed = validate_positive(extract_number(&args[0], NAME, "speed")?, NAME, "speed")?;
    let speed_unit = extract_text(&args[1], NAME, "speed_unit")?;
    let pace_unit = optional_text(args, 2, NAME, "pace_unit")?.unwrap_or("min/km");

    let meters_per_second = to_base("speed", speed_unit, speed)?;
    pace_in(1.0 / meters_per_second, pace_unit)
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
    fn test_pace_default_unit() {
        let p = number(call(&Pace, vec![10.0.into(), "km".into(), 50.0.into(), "min".into()]));
        assert!((p - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_pace_minutes_per_mile() {
        let p = number(call(&Pace, vec![26.2.into(), "mi".into(), 4.0.into(), "h".into(), "min/mi".into()]));
        assert!((p - 240.0 / 26.2).abs() < 1e-9);
    }

    #[test]
    fn test_pace_zero_distance_rejected() {
        let result = call(&Pace, vec![0.0.into(), "km".into(), 50.0.into(), "min".into()]);
        assert_eq!(result.as_error().unwrap().code, codes::DOMAIN_ERROR);
    }

    #[test]
    fn test_speed_to_pace() {
        let p = number(call(&SpeedToPace, vec![12.0.into(), "km/h".into()]));
        assert!((p - 5.0).abs() < 1e-9);
        let p = number(call(&SpeedToPace, vec![6.0.into(), "mph".into(), "min/mi".into()]));
        assert!((p - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_pace_and_speed_agree() {
        // 10 km in 50 min is 12 km/h
        let from_time = number(call(&Pace, vec![10.0.into(), "km".into(), 50.0.into(), "min".into(), "min/mi".into()]));
        let from_speed = number(call(&SpeedToPace, vec![12.0.into(), "km/h".into(), "min/mi".into()]));
        assert!((from_time - from_speed).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_pace_unit() {
        let result = call(&SpeedToPace, vec![12.0.into(), "km/h".into(), "min/lap".into()]);
        assert_eq!(result.as_error().unwrap().code, codes::UNKNOWN_UNIT);
    }
}
