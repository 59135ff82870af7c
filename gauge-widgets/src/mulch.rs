//! Volume of loose material (mulch, gravel, soil) needed to cover an area

use gauge_plugin::prelude::*;
use gauge_units::{convert, to_base};

pub struct MulchVolume;

static MULCH_VOLUME_ARGS: [ArgMeta; 5] = [
    ArgMeta::required("area", "Number", "Area to cover"),
    ArgMeta::required("area_unit", "Text", "Area unit (e.g., \"ft2\", \"m2\")"),
    ArgMeta::required("depth", "Number", "Layer depth"),
    ArgMeta::required("depth_unit", "Text", "Length unit for depth (e.g., \"in\", \"cm\")"),
    ArgMeta::optional("volume_unit", "Text", "Volume unit for the result", "yd3"),
];

static MULCH_VOLUME_EXAMPLES: [&str; 3] = [
    "mulch_volume(100, \"ft2\", 3, \"in\") → 0.926",
    "mulch_volume(100, \"ft2\", 3, \"in\", \"ft3\") → 25",
    "mulch_volume(20, \"m2\", 5, \"cm\", \"m3\") → 1",
];

static MULCH_VOLUME_RELATED: [&str; 1] = ["convert"];

impl FunctionPlugin for MulchVolume {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "mulch_volume",
            description: "Volume of material needed to cover an area to a given depth",
            usage: "mulch_volume(area, area_unit, depth, depth_unit, [volume_unit])",
            args: &MULCH_VOLUME_ARGS,
            returns: "Number",
            examples: &MULCH_VOLUME_EXAMPLES,
            category: "widgets",
            related: &MULCH_VOLUME_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        mulch_volume(args).unwrap_or_else(Value::Error)
    }
}

fn mulch_volume(args: &[Value]) -> Result<Value, GaugeError> {
    const NAME: &str = "mulch_volume";
    if args.len() < 4 {
        return Err(GaugeError::arg_count(NAME, 4, args.len()));
    }
    let area = validate_non_negative(extract_number(&args[0], NAME, "area")?, NAME, "area")?;
    let area_unit = extract_text(&args[1], NAME, "area_unit")?;
    let depth = validate_non_negative(extract_number(&args[2], NAME, "depth")?, NAME, "depth")?;
    let depth_unit = extract_text(&args[3], NAME, "depth_unit")?;
    let volume_unit = optional_text(args, 4, NAME, "volume_unit")?.unwrap_or("yd3");

    let square_meters = to_base("area", area_unit, area)?;
    let meters = to_base("length", depth_unit, depth)?;

    Ok(Value::Number(convert("volume", "m3", volume_unit, square_meters * meters)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn call(args: Vec<Value>) -> Value {
        let ctx = EvalContext::new(Arc::new(PluginRegistry::new()));
        MulchVolume.call(&args, &ctx)
    }

    #[test]
    fn test_default_cubic_yards() {
        let yd3 = call(vec![100.0.into(), "ft2".into(), 3.0.into(), "in".into()]).as_number().unwrap();
        assert!((yd3 - 25.0 / 27.0).abs() < 1e-9);
    }

    #[test]
    fn test_explicit_volume_unit() {
        let ft3 = call(vec![100.0.into(), "sq ft".into(), 3.0.into(), "inches".into(), "ft3".into()])
            .as_number()
            .unwrap();
        assert!((ft3 - 25.0).abs() < 1e-9);

        let m3 = call(vec![20.0.into(), "m2".into(), 5.0.into(), "cm".into(), "m3".into()])
            .as_number()
            .unwrap();
        assert!((m3 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_depth() {
        assert_eq!(call(vec![50.0.into(), "m2".into(), 0.0.into(), "cm".into()]), Value::Number(0.0));
    }

    #[test]
    fn test_negative_area_rejected() {
        let result = call(vec![(-1.0).into(), "m2".into(), 5.0.into(), "cm".into()]);
        assert_eq!(result.as_error().unwrap().code, codes::DOMAIN_ERROR);
    }

    #[test]
    fn test_depth_must_be_length() {
        let result = call(vec![10.0.into(), "m2".into(), 5.0.into(), "kg".into()]);
        assert_eq!(result.as_error().unwrap().code, codes::UNKNOWN_UNIT);
    }
}
