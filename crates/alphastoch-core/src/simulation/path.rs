use std::ops::Index;

use serde::Serialize;

use super::SimulationParameters;
use crate::EngineError;

/// Paths handed to a chart by default; larger ensembles are summarized, not drawn.
pub const DEFAULT_PLOT_SAMPLE: usize = 50;

/// One simulated price trajectory: index 0 is the start price, index `i` the
/// price after `i` steps.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Path(Vec<f64>);

impl Path {
    pub(crate) fn from_prices(prices: Vec<f64>) -> Self {
        Self(prices)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<f64> {
        self.0.first().copied()
    }

    pub fn last(&self) -> Option<f64> {
        self.0.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.0.iter()
    }
}

impl Index<usize> for Path {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// All paths produced by one simulation run, together with the model drift
/// and volatility that produced them.
///
/// Every path has `horizon_days + 1` strictly positive prices and starts at
/// `start_price`. The ensemble is never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathEnsemble {
    start_price: f64,
    horizon_days: usize,
    drift: f64,
    volatility: f64,
    paths: Vec<Path>,
}

impl PathEnsemble {
    pub(crate) fn new_unchecked(params: &SimulationParameters, paths: Vec<Path>) -> Self {
        Self {
            start_price: params.start_price(),
            horizon_days: params.horizon_days(),
            drift: params.drift(),
            volatility: params.volatility(),
            paths,
        }
    }

    /// Build an ensemble from externally produced price series.
    ///
    /// Used for replaying recorded runs and for synthetic fixtures; enforces the
    /// same shape guarantees the generator provides. `drift` and `volatility`
    /// are the annualized model inputs the series are attributed to.
    pub fn from_paths(paths: Vec<Vec<f64>>, drift: f64, volatility: f64) -> Result<Self, EngineError> {
        if !drift.is_finite() {
            return Err(EngineError::invalid("drift", "must be finite"));
        }
        if !volatility.is_finite() || volatility < 0.0 {
            return Err(EngineError::invalid("volatility", "must be finite and non-negative"));
        }

        let first = paths
            .first()
            .ok_or_else(|| EngineError::invalid("paths", "ensemble must contain at least one path"))?;
        if first.len() < 2 {
            return Err(EngineError::invalid(
                "paths",
                "each path needs a start price and at least one step",
            ));
        }
        let start_price = first[0];
        let len = first.len();

        for (index, path) in paths.iter().enumerate() {
            if path.len() != len {
                return Err(EngineError::invalid(
                    "paths",
                    format!("path {index} has length {} (expected {len})", path.len()),
                ));
            }
            if path[0] != start_price {
                return Err(EngineError::invalid(
                    "paths",
                    format!("path {index} does not start at {start_price}"),
                ));
            }
            if let Some(step) = path.iter().position(|p| !p.is_finite() || *p <= 0.0) {
                return Err(EngineError::invalid(
                    "paths",
                    format!("path {index} has a non-positive price at step {step}"),
                ));
            }
        }

        Ok(Self {
            start_price,
            horizon_days: len - 1,
            drift,
            volatility,
            paths: paths.into_iter().map(Path::from_prices).collect(),
        })
    }

    pub const fn start_price(&self) -> f64 {
        self.start_price
    }

    pub const fn horizon_days(&self) -> usize {
        self.horizon_days
    }

    /// Annualized drift the paths were generated with.
    pub const fn drift(&self) -> f64 {
        self.drift
    }

    pub const fn volatility(&self) -> f64 {
        self.volatility
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Terminal price of every path, in path order.
    pub fn final_prices(&self) -> Vec<f64> {
        self.paths.iter().filter_map(Path::last).collect()
    }

    /// First `limit` paths, for bounded plotting.
    pub fn sample(&self, limit: usize) -> &[Path] {
        &self.paths[..limit.min(self.paths.len())]
    }
}
