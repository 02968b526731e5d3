use alphastoch_core::{ModelControls, RiskAppetite, SliderBounds, DEFAULT_SYMBOL};
use serde::Serialize;

use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct PresetRow {
    name: &'static str,
    drift: f64,
    volatility: f64,
}

#[derive(Debug, Serialize)]
struct PresetsResponseData {
    presets: Vec<PresetRow>,
    bounds: SliderBounds,
    defaults: ModelControls,
    default_symbol: &'static str,
}

pub fn run() -> Result<CommandResult, CliError> {
    let presets = RiskAppetite::ALL
        .iter()
        .map(|appetite| PresetRow {
            name: appetite.as_str(),
            drift: appetite.drift(),
            volatility: appetite.volatility(),
        })
        .collect();

    let data = serde_json::to_value(PresetsResponseData {
        presets,
        bounds: SliderBounds::default(),
        defaults: ModelControls::default(),
        default_symbol: DEFAULT_SYMBOL,
    })?;

    Ok(CommandResult::ok(data))
}
