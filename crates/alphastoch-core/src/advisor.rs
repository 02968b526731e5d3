//! Fetch, simulate, summarize.
//!
//! [`Advisor`] wires a [`PriceSource`] snapshot into the path generator and
//! the risk summarizer. A failure at any stage returns early, so a report
//! (and therefore a recommendation) only exists when every stage succeeded.

use rand::Rng;
use serde::Serialize;
use tracing::{info, info_span};

use crate::market::PriceSource;
use crate::risk::{KellyPolicy, RiskSummarizer, RiskSummary};
use crate::simulation::{
    ModelControls, Path, PathEnsemble, PathGenerator, SimulationParameters, DEFAULT_PLOT_SAMPLE,
};
use crate::{EngineError, MarketSnapshot, Symbol};

/// Everything the presentation layer needs from one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisoryReport {
    /// Absent for offline runs with a caller-supplied start price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<MarketSnapshot>,
    pub parameters: SimulationParameters,
    pub summary: RiskSummary,
    /// Bounded sample of individual paths for plotting.
    pub sample_paths: Vec<Path>,
}

impl AdvisoryReport {
    pub fn mean_path(&self) -> &[f64] {
        &self.summary.mean_path
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Advisor {
    generator: PathGenerator,
    summarizer: RiskSummarizer,
    sample_limit: usize,
}

impl Default for Advisor {
    fn default() -> Self {
        Self {
            generator: PathGenerator::default(),
            summarizer: RiskSummarizer::default(),
            sample_limit: DEFAULT_PLOT_SAMPLE,
        }
    }
}

impl Advisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_generator(mut self, generator: PathGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_kelly_policy(mut self, policy: KellyPolicy) -> Self {
        self.summarizer = RiskSummarizer::new(policy);
        self
    }

    pub fn with_sample_limit(mut self, sample_limit: usize) -> Self {
        self.sample_limit = sample_limit;
        self
    }

    pub const fn sample_limit(&self) -> usize {
        self.sample_limit
    }

    /// Parameters for a run seeded at the snapshot's current price.
    pub fn parameters_for(
        snapshot: &MarketSnapshot,
        controls: &ModelControls,
    ) -> Result<SimulationParameters, EngineError> {
        SimulationParameters::new(
            snapshot.current_price,
            controls.drift,
            controls.volatility,
            controls.horizon_days,
            controls.path_count,
        )
    }

    /// Fetch the latest snapshot for `symbol` and run the full pipeline on it.
    ///
    /// # Errors
    ///
    /// `UpstreamDataUnavailable` when the source fails, otherwise any error of
    /// [`Advisor::advise_with_snapshot`].
    pub async fn advise<R>(
        &self,
        source: &dyn PriceSource,
        symbol: &Symbol,
        controls: &ModelControls,
        rng: &mut R,
    ) -> Result<AdvisoryReport, EngineError>
    where
        R: Rng + ?Sized,
    {
        let snapshot = source.snapshot(symbol).await?;
        info!(
            symbol = %symbol,
            source = source.name(),
            price = snapshot.current_price,
            "snapshot fetched"
        );
        self.advise_with_snapshot(snapshot, controls, rng)
    }

    /// Run the pipeline on an already-fetched snapshot.
    pub fn advise_with_snapshot<R>(
        &self,
        snapshot: MarketSnapshot,
        controls: &ModelControls,
        rng: &mut R,
    ) -> Result<AdvisoryReport, EngineError>
    where
        R: Rng + ?Sized,
    {
        let params = Self::parameters_for(&snapshot, controls)?;
        let mut report = self.simulate_offline(params, rng)?;
        report.snapshot = Some(snapshot);
        Ok(report)
    }

    /// Generate and summarize without any market input.
    pub fn simulate_offline<R>(
        &self,
        params: SimulationParameters,
        rng: &mut R,
    ) -> Result<AdvisoryReport, EngineError>
    where
        R: Rng + ?Sized,
    {
        let span = info_span!(
            "simulate",
            paths = params.path_count(),
            days = params.horizon_days()
        );
        let _guard = span.enter();

        let ensemble = self.generator.generate(&params, rng)?;
        let summary = self.summarizer.summarize(&ensemble)?;
        info!(
            recommendation = summary.recommendation.label(),
            expected_return = summary.expected_return,
            "advisory ready"
        );

        Ok(AdvisoryReport {
            snapshot: None,
            sample_paths: sampled(&ensemble, self.sample_limit),
            parameters: params,
            summary,
        })
    }
}

fn sampled(ensemble: &PathEnsemble, limit: usize) -> Vec<Path> {
    ensemble.sample(limit).to_vec()
}
