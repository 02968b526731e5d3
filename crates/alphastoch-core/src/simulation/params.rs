use serde::{Deserialize, Serialize};

use crate::EngineError;

/// One calendar day expressed as a fraction of a year.
pub const DAILY_STEP: f64 = 1.0 / 365.0;

/// Longest horizon accepted by the generator (one hundred years of daily steps).
pub const MAX_HORIZON_DAYS: usize = 36_500;

/// Largest ensemble accepted by the generator.
pub const MAX_PATH_COUNT: usize = 1_000_000;

/// Most prices one run may hold, `path_count * (horizon_days + 1)`.
/// About 400 MB of `f64`.
pub const MAX_PATH_CELLS: usize = 50_000_000;

/// Immutable input record for one simulation run.
///
/// Construct through [`SimulationParameters::new`] or
/// [`SimulationParametersBuilder`]; both enforce the invariants below, so a
/// value of this type is always safe to hand to the generator:
///
/// - `start_price > 0` and finite
/// - `drift` finite (may be negative)
/// - `volatility >= 0` and finite
/// - `1 <= horizon_days <= MAX_HORIZON_DAYS`
/// - `1 <= path_count <= MAX_PATH_COUNT`
/// - `path_count * (horizon_days + 1) <= MAX_PATH_CELLS`
/// - `step_size > 0` and finite
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationParameters {
    start_price: f64,
    drift: f64,
    volatility: f64,
    horizon_days: usize,
    path_count: usize,
    step_size: f64,
}

impl SimulationParameters {
    /// Create parameters with the daily step size.
    pub fn new(
        start_price: f64,
        drift: f64,
        volatility: f64,
        horizon_days: usize,
        path_count: usize,
    ) -> Result<Self, EngineError> {
        Self::with_step_size(
            start_price,
            drift,
            volatility,
            horizon_days,
            path_count,
            DAILY_STEP,
        )
    }

    pub fn with_step_size(
        start_price: f64,
        drift: f64,
        volatility: f64,
        horizon_days: usize,
        path_count: usize,
        step_size: f64,
    ) -> Result<Self, EngineError> {
        let params = Self {
            start_price,
            drift,
            volatility,
            horizon_days,
            path_count,
            step_size,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn builder() -> SimulationParametersBuilder {
        SimulationParametersBuilder::default()
    }

    fn validate(&self) -> Result<(), EngineError> {
        if !self.start_price.is_finite() || self.start_price <= 0.0 {
            return Err(EngineError::invalid(
                "start_price",
                format!("must be a positive finite number, got {}", self.start_price),
            ));
        }
        if !self.drift.is_finite() {
            return Err(EngineError::invalid("drift", "must be finite"));
        }
        if !self.volatility.is_finite() || self.volatility < 0.0 {
            return Err(EngineError::invalid(
                "volatility",
                format!("must be a non-negative finite number, got {}", self.volatility),
            ));
        }
        if self.horizon_days == 0 {
            return Err(EngineError::invalid("horizon_days", "must be at least 1"));
        }
        if self.horizon_days > MAX_HORIZON_DAYS {
            return Err(EngineError::invalid(
                "horizon_days",
                format!("must not exceed {MAX_HORIZON_DAYS}"),
            ));
        }
        if self.path_count == 0 {
            return Err(EngineError::invalid("path_count", "must be at least 1"));
        }
        if self.path_count > MAX_PATH_COUNT {
            return Err(EngineError::invalid(
                "path_count",
                format!("must not exceed {MAX_PATH_COUNT}"),
            ));
        }
        let cells = self.path_count.checked_mul(self.horizon_days + 1);
        if cells.map_or(true, |cells| cells > MAX_PATH_CELLS) {
            return Err(EngineError::invalid(
                "path_count",
                format!(
                    "{} paths over {} horizon_days exceed {MAX_PATH_CELLS} simulated prices",
                    self.path_count, self.horizon_days
                ),
            ));
        }
        if !self.step_size.is_finite() || self.step_size <= 0.0 {
            return Err(EngineError::invalid(
                "step_size",
                format!("must be a positive finite number, got {}", self.step_size),
            ));
        }
        Ok(())
    }

    pub const fn start_price(&self) -> f64 {
        self.start_price
    }

    pub const fn drift(&self) -> f64 {
        self.drift
    }

    pub const fn volatility(&self) -> f64 {
        self.volatility
    }

    pub const fn horizon_days(&self) -> usize {
        self.horizon_days
    }

    pub const fn path_count(&self) -> usize {
        self.path_count
    }

    pub const fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Simulated horizon in years.
    pub fn horizon_years(&self) -> f64 {
        self.horizon_days as f64 * self.step_size
    }

    /// Closed-form GBM expectation `E[S_T] / S_0 = exp(drift * T)`.
    pub fn expected_gross_return(&self) -> f64 {
        (self.drift * self.horizon_years()).exp()
    }

    /// Per-step log drift `(drift - volatility^2 / 2) * step_size`.
    pub fn log_drift_per_step(&self) -> f64 {
        (self.drift - 0.5 * self.volatility * self.volatility) * self.step_size
    }

    /// Per-step diffusion scale `volatility * sqrt(step_size)`.
    pub fn diffusion_per_step(&self) -> f64 {
        self.volatility * self.step_size.sqrt()
    }
}

impl<'de> Deserialize<'de> for SimulationParameters {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            start_price: f64,
            drift: f64,
            volatility: f64,
            horizon_days: usize,
            path_count: usize,
            #[serde(default = "default_step")]
            step_size: f64,
        }

        fn default_step() -> f64 {
            DAILY_STEP
        }

        let raw = Raw::deserialize(deserializer)?;
        Self::with_step_size(
            raw.start_price,
            raw.drift,
            raw.volatility,
            raw.horizon_days,
            raw.path_count,
            raw.step_size,
        )
        .map_err(serde::de::Error::custom)
    }
}

/// Builder with the interactive defaults (30 days, 100 paths, daily step).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParametersBuilder {
    start_price: f64,
    drift: f64,
    volatility: f64,
    horizon_days: usize,
    path_count: usize,
    step_size: f64,
}

impl Default for SimulationParametersBuilder {
    fn default() -> Self {
        Self {
            start_price: 1.0,
            drift: 0.15,
            volatility: 0.65,
            horizon_days: 30,
            path_count: 100,
            step_size: DAILY_STEP,
        }
    }
}

impl SimulationParametersBuilder {
    pub fn start_price(mut self, start_price: f64) -> Self {
        self.start_price = start_price;
        self
    }

    pub fn drift(mut self, drift: f64) -> Self {
        self.drift = drift;
        self
    }

    pub fn volatility(mut self, volatility: f64) -> Self {
        self.volatility = volatility;
        self
    }

    pub fn horizon_days(mut self, horizon_days: usize) -> Self {
        self.horizon_days = horizon_days;
        self
    }

    pub fn path_count(mut self, path_count: usize) -> Self {
        self.path_count = path_count;
        self
    }

    pub fn step_size(mut self, step_size: f64) -> Self {
        self.step_size = step_size;
        self
    }

    pub fn build(self) -> Result<SimulationParameters, EngineError> {
        SimulationParameters::with_step_size(
            self.start_price,
            self.drift,
            self.volatility,
            self.horizon_days,
            self.path_count,
            self.step_size,
        )
    }
}
