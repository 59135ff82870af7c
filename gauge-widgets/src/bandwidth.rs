//! Transfer time for a file over a network link

use gauge_plugin::prelude::*;
use gauge_units::to_base;

pub struct TransferTime;

static TRANSFER_TIME_ARGS: [ArgMeta; 4] = [
    ArgMeta::required("size", "Number", "Amount of data"),
    ArgMeta::required("size_unit", "Text", "Data-size unit (e.g., \"GB\", \"Mb\")"),
    ArgMeta::required("rate", "Number", "Link rate"),
    ArgMeta::required("rate_unit", "Text", "Data-rate unit (e.g., \"Mbps\", \"MB/s\")"),
];

static TRANSFER_TIME_EXAMPLES: [&str; 2] = [
    "transfer_time(1, \"GB\", 100, \"Mbps\") → {seconds: 81.92, ...}",
    "transfer_time(700, \"MB\", 5, \"MB/s\") → {seconds: 140, ...}",
];

static TRANSFER_TIME_RELATED: [&str; 1] = ["convert"];

impl FunctionPlugin for TransferTime {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "transfer_time",
            description: "Time to move an amount of data over a link",
            usage: "transfer_time(size, size_unit, rate, rate_unit)",
            args: &TRANSFER_TIME_ARGS,
            returns: "Object",
            examples: &TRANSFER_TIME_EXAMPLES,
            category: "widgets",
            related: &TRANSFER_TIME_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        transfer_time(args).unwrap_or_else(Value::Error)
    }
}

fn transfer_time(args: &[Value]) -> Result<Value, GaugeError> {
    const NAME: &str = "transfer_time";
    if args.len() < 4 {
        return Err(GaugeError::arg_count(NAME, 4, args.len()));
    }
    let size = validate_non_negative(extract_number(&args[0], NAME, "size")?, NAME, "size")?;
    let size_unit = extract_text(&args[1], NAME, "size_unit")?;
    let rate = validate_positive(extract_number(&args[2], NAME, "rate")?, NAME, "rate")?;
    let rate_unit = extract_text(&args[3], NAME, "rate_unit")?;

    let bits = to_base("data-size", size_unit, size)?;
    let bits_per_second = to_base("data-rate", rate_unit, rate)?;
    let seconds = bits / bits_per_second;

    Ok(Value::object([
        ("seconds", Value::finite(seconds)),
        ("minutes", Value::finite(seconds / 60.0)),
        ("hours", Value::finite(seconds / 3600.0)),
    ]))
}
