//! One-rep max estimation

use gauge_plugin::prelude::*;
use gauge_units::UNITS;

/// Beyond this the Brzycki denominator (37 - reps) stops being meaningful
const MAX_REPS: f64 = 36.0;

pub struct OneRepMax;

static ONE_REP_MAX_ARGS: [ArgMeta; 3] = [
    ArgMeta::required("weight", "Number", "Weight lifted"),
    ArgMeta::required("reps", "Number", "Repetitions completed (1-36)"),
    ArgMeta::optional("unit", "Text", "Weight unit, echoed in the result", "none"),
];

static ONE_REP_MAX_EXAMPLES: [&str; 2] = [
    "one_rep_max(100, 10) → {epley: 133.3, brzycki: 133.3, lombardi: 125.9, oconner: 125, mean: 129.4}",
    "one_rep_max(225, 1, \"lbs\") → {epley: 225, ..., unit: \"lb\"}",
];

static ONE_REP_MAX_RELATED: [&str; 1] = ["convert"];

impl FunctionPlugin for OneRepMax {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "one_rep_max",
            description: "Estimate a one-repetition maximum from a multi-rep set",
            usage: "one_rep_max(weight, reps, [unit])",
            args: &ONE_REP_MAX_ARGS,
            returns: "Object",
            examples: &ONE_REP_MAX_EXAMPLES,
            category: "widgets",
            related: &ONE_REP_MAX_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        one_rep_max(args).unwrap_or_else(Value::Error)
    }
}

/// (epley, brzycki, lombardi, oconner)
fn estimates(weight: f64, reps: f64) -> [f64; 4] {
    if reps == 1.0 {
        return [weight; 4];
    }
    [
        weight * (1.0 + reps / 30.0),
        weight * 36.0 / (37.0 - reps),
        weight * reps.powf(0.10),
        weight * (1.0 + 0.025 * reps),
    ]
}

fn one_rep_max(args: &[Value]) -> Result<Value, GaugeError> {
    const NAME: &str = "one_rep_max";
    if args.len() < 2 {
        return Err(GaugeError::arg_count(NAME, 2, args.len()));
    }
    let weight = validate_positive(extract_number(&args[0], NAME, "weight")?, NAME, "weight")?;
    let reps = extract_number(&args[1], NAME, "reps")?;
    let unit = match optional_text(args, 2, NAME, "unit")? {
        Some(u) => Some(UNITS.unit("weight", u)?),
        None => None,
    };

    if reps.fract() != 0.0 || !(1.0..=MAX_REPS).contains(&reps) {
        return Err(GaugeError::domain_error(format!(
            "{}(): reps must be a whole number from 1 to {}, got {}",
            NAME, MAX_REPS, reps
        )).in_function(NAME).for_argument("reps"));
    }

    let [epley, brzycki, lombardi, oconner] = estimates(weight, reps);
    let mean = (epley + brzycki + lombardi + oconner) / 4.0;

    let mut fields = vec![
        ("epley", Value::Number(epley)),
        ("brzycki", Value::Number(brzycki)),
        ("lombardi", Value::Number(lombardi)),
        ("oconner", Value::Number(oconner)),
        ("mean", Value::Number(mean)),
    ];
    if let Some(unit) = unit {
        fields.push(("unit", Value::from(unit.symbol.as_str())));
    }
    Ok(Value::object(fields))
}
