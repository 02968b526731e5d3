use std::time::Duration;

use alphastoch_core::{
    AdvisoryReport, CachedPriceSource, EngineError, PriceSource, Symbol, YahooPriceSource,
};
use serde::Serialize;
use tracing::info;

use crate::cli::AdviseArgs;
use crate::error::CliError;

use super::CommandResult;

/// One pass of a repeated advisory.
#[derive(Debug, Serialize)]
struct AdviseRun {
    iteration: u32,
    cache_hit: bool,
    report: AdvisoryReport,
}

#[derive(Debug, Serialize)]
struct AdviseRuns<'a> {
    runs: &'a [AdviseRun],
}

/// Fetch, simulate and summarize `--repeat` times against one cached source,
/// so passes inside the cache TTL reuse the first snapshot.
///
/// A single pass returns the report itself; repeats return `{"runs": [...]}`.
/// The envelope's `cache_hit` is set when any pass was served from the cache.
pub async fn run(args: &AdviseArgs) -> Result<CommandResult, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let controls = super::controls(&args.model);
    let mut warnings = super::range_warnings(&controls);

    let advisor = match super::advisor(&args.model) {
        Ok(advisor) => advisor,
        Err(error) => return Ok(CommandResult::failed(error).with_warnings(warnings)),
    };

    let upstream = if args.mock {
        warnings.push(String::from(
            "--mock: prices come from a synthetic series, not the market",
        ));
        YahooPriceSource::offline()
    } else {
        YahooPriceSource::real()
    };
    let source = CachedPriceSource::with_ttl(upstream, Duration::from_secs(args.cache_ttl_secs))
        .with_mode(args.cache_mode.into());
    let mut rng = super::rng(args.model.seed);

    let mut runs = Vec::with_capacity(args.repeat as usize);
    for iteration in 1..=args.repeat {
        if iteration > 1 && args.interval_secs > 0 {
            tokio::time::sleep(Duration::from_secs(args.interval_secs)).await;
        }

        let lookup = match source.lookup(&symbol).await {
            Ok(lookup) => lookup,
            Err(error) => {
                return Ok(CommandResult::failed(EngineError::from(error)).with_warnings(warnings));
            }
        };
        info!(
            symbol = %symbol,
            source = source.name(),
            iteration,
            cache_hit = lookup.cache_hit,
            "snapshot resolved"
        );

        match advisor.advise_with_snapshot(lookup.snapshot, &controls, &mut rng) {
            Ok(report) => runs.push(AdviseRun {
                iteration,
                cache_hit: lookup.cache_hit,
                report,
            }),
            Err(error) => return Ok(CommandResult::failed(error).with_warnings(warnings)),
        }
    }

    let cache_hit = runs.iter().any(|run| run.cache_hit);
    let data = match runs.as_slice() {
        [only] => serde_json::to_value(&only.report)?,
        _ => serde_json::to_value(AdviseRuns { runs: &runs })?,
    };

    Ok(CommandResult::ok(data)
        .with_warnings(warnings)
        .with_cache_hit(cache_hit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{CacheModeArg, ModelArgs};

    fn mock_args(symbol: &str) -> AdviseArgs {
        AdviseArgs {
            symbol: symbol.to_string(),
            model: ModelArgs {
                appetite: None,
                drift: None,
                volatility: None,
                days: 14,
                paths: 40,
                seed: Some(3),
                sample_paths: 2,
                kelly_cap: None,
            },
            cache_mode: CacheModeArg::Use,
            cache_ttl_secs: 60,
            mock: true,
            repeat: 1,
            interval_secs: 0,
        }
    }

    #[tokio::test]
    async fn mock_run_produces_report_with_snapshot() {
        let result = run(&mock_args("ETH-USD")).await.expect("runs");

        assert!(!result.cache_hit);
        assert!(result.warnings.iter().any(|w| w.contains("--mock")));
        let data = result.outcome.expect("report");
        assert_eq!(data["snapshot"]["symbol"], "ETH-USD");
        assert_eq!(data["parameters"]["start_price"], data["snapshot"]["current_price"]);
    }

    #[tokio::test]
    async fn repeated_runs_reuse_the_cached_snapshot() {
        let args = AdviseArgs {
            repeat: 3,
            ..mock_args("BTC-USD")
        };

        let result = run(&args).await.expect("runs");

        assert!(result.cache_hit);
        let data = result.outcome.expect("runs payload");
        let hits: Vec<_> = data["runs"]
            .as_array()
            .expect("runs array")
            .iter()
            .map(|run| run["cache_hit"].as_bool())
            .collect();
        assert_eq!(hits, [Some(false), Some(true), Some(true)]);
        assert_eq!(data["runs"][2]["iteration"], 3);
        assert_eq!(
            data["runs"][0]["report"]["snapshot"],
            data["runs"][1]["report"]["snapshot"]
        );
    }

    #[tokio::test]
    async fn bypass_mode_never_reports_a_hit() {
        let args = AdviseArgs {
            repeat: 2,
            cache_mode: CacheModeArg::Bypass,
            ..mock_args("BTC-USD")
        };

        let result = run(&args).await.expect("runs");

        assert!(!result.cache_hit);
        let data = result.outcome.expect("runs payload");
        assert_eq!(data["runs"][0]["cache_hit"], false);
        assert_eq!(data["runs"][1]["cache_hit"], false);
    }

    #[tokio::test]
    async fn invalid_symbol_is_a_validation_error() {
        let error = run(&mock_args("??")).await.err().expect("rejects");
        assert_eq!(error.exit_code(), 2);
    }
}
