mod advise;
mod presets;
mod simulate;

use std::time::Instant;

use alphastoch_core::{
    Advisor, EngineError, Envelope, EnvelopeMeta, KellyPolicy, ModelControls, SliderBounds,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::Value;
use tracing::warn;

use crate::cli::{Cli, Command, ModelArgs};
use crate::error::CliError;

/// What a command produced, before it is wrapped in an envelope.
pub struct CommandResult {
    pub outcome: Result<Value, EngineError>,
    pub warnings: Vec<String>,
    pub cache_hit: bool,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            outcome: Ok(data),
            warnings: Vec::new(),
            cache_hit: false,
        }
    }

    /// Engine failures still render an envelope; the caller picks the exit code.
    pub fn failed(error: EngineError) -> Self {
        warn!(code = error.code(), %error, "command failed");
        Self {
            outcome: Err(error),
            warnings: Vec::new(),
            cache_hit: false,
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_cache_hit(mut self, cache_hit: bool) -> Self {
        self.cache_hit = cache_hit;
        self
    }
}

pub struct CommandOutcome {
    pub envelope: Envelope<Value>,
    pub failure: Option<EngineError>,
}

pub async fn run(cli: &Cli) -> Result<CommandOutcome, CliError> {
    let started = Instant::now();

    let CommandResult {
        outcome,
        warnings,
        cache_hit,
    } = match &cli.command {
        Command::Simulate(args) => simulate::run(args)?,
        Command::Advise(args) => advise::run(args).await?,
        Command::Presets => presets::run()?,
    };

    let meta = EnvelopeMeta::new(started.elapsed())
        .with_cache_hit(cache_hit)
        .with_warnings(warnings);
    Ok(match outcome {
        Ok(data) => CommandOutcome {
            envelope: Envelope::success(meta, data),
            failure: None,
        },
        Err(error) => CommandOutcome {
            envelope: Envelope::failure(meta, &error),
            failure: Some(error),
        },
    })
}

/// Resolve the preset and explicit overrides into model controls.
fn controls(model: &ModelArgs) -> ModelControls {
    let base = ModelControls::from_appetite(model.appetite.unwrap_or_default());
    ModelControls {
        drift: model.drift.unwrap_or(base.drift),
        volatility: model.volatility.unwrap_or(base.volatility),
        horizon_days: model.days,
        path_count: model.paths,
    }
}

fn range_warnings(controls: &ModelControls) -> Vec<String> {
    controls.out_of_range_warnings(&SliderBounds::default())
}

fn advisor(model: &ModelArgs) -> Result<Advisor, EngineError> {
    let policy = match model.kelly_cap {
        Some(max) => KellyPolicy::capped(max)?,
        None => KellyPolicy::Strict,
    };
    Ok(Advisor::new()
        .with_kelly_policy(policy)
        .with_sample_limit(model.sample_paths))
}

fn rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}
