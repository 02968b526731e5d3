use alphastoch_core::SimulationParameters;

use crate::cli::SimulateArgs;
use crate::error::CliError;

use super::CommandResult;

pub fn run(args: &SimulateArgs) -> Result<CommandResult, CliError> {
    let controls = super::controls(&args.model);
    let warnings = super::range_warnings(&controls);

    let report = SimulationParameters::new(
        args.start_price,
        controls.drift,
        controls.volatility,
        controls.horizon_days,
        controls.path_count,
    )
    .and_then(|params| {
        let advisor = super::advisor(&args.model)?;
        advisor.simulate_offline(params, &mut super::rng(args.model.seed))
    });

    let result = match report {
        Ok(report) => CommandResult::ok(serde_json::to_value(&report)?),
        Err(error) => CommandResult::failed(error),
    };
    Ok(result.with_warnings(warnings))
}
