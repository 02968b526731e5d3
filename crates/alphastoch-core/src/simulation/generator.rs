//! Geometric Brownian Motion path generator.
//!
//! Each step applies the exact log-normal transition
//!
//! ```text
//! S_{t+dt} = S_t * exp((mu - sigma^2 / 2) * dt + sigma * sqrt(dt) * Z),  Z ~ N(0, 1)
//! ```
//!
//! which keeps every simulated price strictly positive for finite `Z`.
//!
//! The caller injects the random source. The generator draws one `u64` seed
//! per path from it and then runs every path on its own ChaCha stream, so paths
//! are independent of each other and a seeded run produces the same ensemble
//! whether it executes on one thread or many.

use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use rayon::prelude::*;
use tracing::{debug, info};

use super::{Path, PathEnsemble, SimulationParameters};
use crate::EngineError;

/// Produces [`PathEnsemble`]s from validated [`SimulationParameters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathGenerator {
    parallel: bool,
}

impl Default for PathGenerator {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl PathGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator that builds paths on the calling thread only.
    pub fn sequential() -> Self {
        Self { parallel: false }
    }

    pub const fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Generate `path_count` independent paths of `horizon_days` steps.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NumericOverflow`] when any price leaves the
    /// positive finite range of `f64`. The whole run fails; no partial
    /// ensemble is returned.
    pub fn generate<R>(
        &self,
        params: &SimulationParameters,
        rng: &mut R,
    ) -> Result<PathEnsemble, EngineError>
    where
        R: Rng + ?Sized,
    {
        let started = Instant::now();
        debug!(
            start_price = params.start_price(),
            drift = params.drift(),
            volatility = params.volatility(),
            horizon_days = params.horizon_days(),
            path_count = params.path_count(),
            parallel = self.parallel,
            "generating GBM paths"
        );

        let paths = if params.volatility() == 0.0 {
            deterministic_paths(params)?
        } else {
            let seeds: Vec<u64> = (0..params.path_count()).map(|_| rng.gen()).collect();
            let built: Vec<Result<Path, EngineError>> = if self.parallel {
                seeds
                    .par_iter()
                    .enumerate()
                    .map(|(index, &seed)| stochastic_path(params, index, seed))
                    .collect()
            } else {
                seeds
                    .iter()
                    .enumerate()
                    .map(|(index, &seed)| stochastic_path(params, index, seed))
                    .collect()
            };
            // Sequential scan keeps the reported failure deterministic.
            built.into_iter().collect::<Result<Vec<_>, _>>()?
        };

        info!(
            paths = paths.len(),
            steps = params.horizon_days(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "path ensemble generated"
        );

        Ok(PathEnsemble::new_unchecked(params, paths))
    }
}

fn stochastic_path(
    params: &SimulationParameters,
    index: usize,
    seed: u64,
) -> Result<Path, EngineError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let log_drift = params.log_drift_per_step();
    let diffusion = params.diffusion_per_step();

    let mut prices = Vec::with_capacity(params.horizon_days() + 1);
    let mut price = params.start_price();
    prices.push(price);

    for step in 1..=params.horizon_days() {
        let z: f64 = rng.sample(StandardNormal);
        price *= (log_drift + diffusion * z).exp();
        check_price(price, index, step)?;
        prices.push(price);
    }

    Ok(Path::from_prices(prices))
}

/// Zero-volatility paths follow `S_0 * exp(drift * dt * i)` exactly.
fn deterministic_paths(params: &SimulationParameters) -> Result<Vec<Path>, EngineError> {
    let rate = params.drift() * params.step_size();
    let mut prices = Vec::with_capacity(params.horizon_days() + 1);
    prices.push(params.start_price());
    for step in 1..=params.horizon_days() {
        let price = params.start_price() * (rate * step as f64).exp();
        check_price(price, 0, step)?;
        prices.push(price);
    }

    let template = Path::from_prices(prices);
    Ok(vec![template; params.path_count()])
}

fn check_price(price: f64, path: usize, step: usize) -> Result<(), EngineError> {
    if price.is_finite() && price > 0.0 {
        Ok(())
    } else {
        Err(EngineError::NumericOverflow {
            context: format!("path {path} left the positive finite range at step {step}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    #[test]
    fn paths_have_expected_shape_and_positivity() {
        let params = SimulationParameters::new(100.0, 0.15, 0.65, 30, 64).expect("valid");
        let ensemble = PathGenerator::new()
            .generate(&params, &mut seeded(7))
            .expect("generates");

        assert_eq!(ensemble.len(), 64);
        for path in ensemble.paths() {
            assert_eq!(path.len(), 31);
            assert_eq!(path.first(), Some(100.0));
            assert!(path.iter().all(|price| *price > 0.0));
        }
    }

    #[test]
    fn seeded_runs_are_reproducible_across_execution_modes() {
        let params = SimulationParameters::new(250.0, 0.05, 0.4, 20, 40).expect("valid");
        let parallel = PathGenerator::new()
            .generate(&params, &mut seeded(99))
            .expect("parallel");
        let sequential = PathGenerator::sequential()
            .generate(&params, &mut seeded(99))
            .expect("sequential");
        assert_eq!(parallel, sequential);

        let other = PathGenerator::new()
            .generate(&params, &mut seeded(100))
            .expect("other seed");
        assert_ne!(parallel, other);
    }

    #[test]
    fn paths_are_not_copies_of_each_other() {
        let params = SimulationParameters::new(100.0, 0.1, 0.5, 10, 8).expect("valid");
        let ensemble = PathGenerator::new()
            .generate(&params, &mut seeded(1))
            .expect("generates");
        let finals = ensemble.final_prices();
        for (i, a) in finals.iter().enumerate() {
            for b in &finals[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn zero_volatility_is_deterministic_exponential_drift() {
        let params = SimulationParameters::new(100.0, 0.2, 0.0, 15, 3).expect("valid");
        let ensemble = PathGenerator::new()
            .generate(&params, &mut seeded(3))
            .expect("generates");

        for path in ensemble.paths() {
            for (i, price) in path.iter().enumerate() {
                let expected = 100.0 * (0.2 * params.step_size() * i as f64).exp();
                assert!((price - expected).abs() < 1e-9, "step {i}: {price} vs {expected}");
            }
        }
    }

    #[test]
    fn overflow_is_reported_not_propagated() {
        let params =
            SimulationParameters::with_step_size(1e300, 500.0, 0.0, 10, 2, 1.0).expect("valid");
        let err = PathGenerator::new()
            .generate(&params, &mut seeded(5))
            .expect_err("must overflow");
        assert!(matches!(err, EngineError::NumericOverflow { .. }));
        assert!(err.to_string().contains("at step 1"));
    }
}
