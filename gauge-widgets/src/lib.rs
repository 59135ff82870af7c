//! Gauge Widgets
//!
//! Small calculators that take amounts with category/unit strings and run
//! them through the conversion engine:
//! - Download time for a file size over a link rate
//! - Mulch or gravel needed to cover an area
//! - Running pace from distance and time, or from speed
//! - Heat index and wind chill
//! - One-rep max estimates
//!
//! For plain unit conversions use gauge-units.

mod bandwidth;
mod mulch;
mod pace;
mod weather;
mod fitness;

use gauge_plugin::PluginRegistry;

/// Load widget functions into registry
pub fn load_widgets_library(registry: PluginRegistry) -> PluginRegistry {
    registry
        .with_function(bandwidth::TransferTime)
        .with_function(mulch::MulchVolume)

        // Running
        .with_function(pace::Pace)
        .with_function(pace::SpeedToPace)

        // Weather
        .with_function(weather::HeatIndex)
        .with_function(weather::WindChill)

        .with_function(fitness::OneRepMax)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauge_plugin::prelude::*;
    use std::sync::Arc;

    #[test]
    fn test_load_widgets_library() {
        let registry = load_widgets_library(PluginRegistry::new());

        for name in ["transfer_time", "mulch_volume", "pace", "speed_to_pace", "heat_index", "wind_chill", "one_rep_max"] {
            assert!(registry.get_function(name).is_some(), "missing {}", name);
        }
        assert_eq!(registry.function_names().len(), 7);
    }

    #[test]
    fn test_direct_calls_check_arity() {
        let registry = Arc::new(load_widgets_library(PluginRegistry::new()));
        let ctx = EvalContext::new(registry.clone());

        for name in registry.function_names() {
            let f = registry.get_function(name).unwrap();
            let required = f.meta().required_args();
            for len in [0, required - 1] {
                let result = f.call(&vec![Value::Null; len], &ctx);
                assert_eq!(result.as_error().unwrap().code, codes::ARG_COUNT, "{} with {} args", name, len);
            }
        }
    }

    #[test]
    fn test_widgets_share_category() {
        let registry = load_widgets_library(PluginRegistry::new());
        assert_eq!(registry.list_functions(Some("widgets")).as_list().unwrap().len(), 7);
    }
}
