//! Behavior-driven tests for the path generator.
//!
//! These tests pin down the properties every simulated ensemble must have,
//! independent of the particular random draws.

use alphastoch_core::{
    summarize, PathGenerator, SimulationParameters, DAILY_STEP,
};
use alphastoch_tests::seeded;

// =============================================================================
// Shape and positivity
// =============================================================================

#[test]
fn when_paths_are_generated_each_has_horizon_plus_one_points_starting_at_start_price() {
    // Given: 45 days and 200 paths from 37.5
    let params = SimulationParameters::new(37.5, 0.1, 0.5, 45, 200).expect("valid");

    // When: The ensemble is generated
    let ensemble = PathGenerator::new()
        .generate(&params, &mut seeded(1))
        .expect("generates");

    // Then: Every path has 46 points and starts exactly at 37.5
    assert_eq!(ensemble.len(), 200);
    assert_eq!(ensemble.horizon_days(), 45);
    for path in ensemble.paths() {
        assert_eq!(path.len(), 46);
        assert_eq!(path[0], 37.5);
    }
}

#[test]
fn when_volatility_is_extreme_every_price_stays_strictly_positive() {
    // Given: Parameter sets ranging from calm to violent
    let cases = [
        (1.0, -0.9, 0.05),
        (100.0, 0.15, 0.65),
        (0.01, 0.0, 2.5),
        (5_000.0, 1.0, 4.0),
    ];

    for (index, (start, drift, volatility)) in cases.into_iter().enumerate() {
        let params = SimulationParameters::new(start, drift, volatility, 365, 100).expect("valid");

        // When: Paths are generated
        let ensemble = PathGenerator::new()
            .generate(&params, &mut seeded(index as u64))
            .expect("generates");

        // Then: No price is zero, negative or non-finite
        for path in ensemble.paths() {
            assert!(
                path.iter().all(|p| p.is_finite() && *p > 0.0),
                "case {index} produced a non-positive price"
            );
        }
    }
}

// =============================================================================
// Zero volatility
// =============================================================================

#[test]
fn when_volatility_is_zero_paths_follow_the_exponential_drift_exactly() {
    // Given: No diffusion
    let params = SimulationParameters::new(80.0, 0.2, 0.0, 60, 25).expect("valid");

    // When: Two runs with different seeds
    let first = PathGenerator::new()
        .generate(&params, &mut seeded(1))
        .expect("generates");
    let second = PathGenerator::new()
        .generate(&params, &mut seeded(2))
        .expect("generates");

    // Then: Randomness never enters; every point is S0 * exp(mu * dt * i)
    assert_eq!(first, second);
    for path in first.paths() {
        for (i, price) in path.iter().enumerate() {
            let expected = 80.0 * (0.2 * DAILY_STEP * i as f64).exp();
            assert!(
                ((price - expected) / expected).abs() < 1e-12,
                "step {i}: {price} != {expected}"
            );
        }
    }
}

#[test]
fn when_volatility_and_drift_are_zero_the_price_never_moves() {
    let params = SimulationParameters::new(12.0, 0.0, 0.0, 10, 3).expect("valid");
    let ensemble = PathGenerator::new()
        .generate(&params, &mut seeded(0))
        .expect("generates");

    assert!(ensemble.paths().iter().all(|p| p.iter().all(|v| *v == 12.0)));
}

// =============================================================================
// Reproducibility and independence
// =============================================================================

#[test]
fn when_the_seed_is_fixed_the_ensemble_is_identical_regardless_of_threading() {
    // Given: The same seed
    let params = SimulationParameters::new(100.0, 0.15, 0.65, 30, 500).expect("valid");

    // When: Generated in parallel and on one thread
    let parallel = PathGenerator::new()
        .generate(&params, &mut seeded(2024))
        .expect("parallel");
    let sequential = PathGenerator::sequential()
        .generate(&params, &mut seeded(2024))
        .expect("sequential");

    // Then: The ensembles match path for path
    assert_eq!(parallel, sequential);
}

#[test]
fn when_paths_are_generated_their_increments_are_standard_normal_and_independent() {
    // Given: Many paths with a known per-step drift and diffusion
    let params = SimulationParameters::new(100.0, 0.1, 0.8, 50, 2_000).expect("valid");
    let ensemble = PathGenerator::new()
        .generate(&params, &mut seeded(77))
        .expect("generates");

    // When: Increments are standardized back to Z
    let log_drift = params.log_drift_per_step();
    let diffusion = params.diffusion_per_step();
    let standardized: Vec<Vec<f64>> = ensemble
        .paths()
        .iter()
        .map(|path| {
            path.as_slice()
                .windows(2)
                .map(|w| ((w[1] / w[0]).ln() - log_drift) / diffusion)
                .collect()
        })
        .collect();
    let all: Vec<f64> = standardized.iter().flatten().copied().collect();
    let n = all.len() as f64;
    let mean = all.iter().sum::<f64>() / n;
    let variance = all.iter().map(|z| (z - mean).powi(2)).sum::<f64>() / (n - 1.0);

    // Then: Z ~ N(0, 1) within sampling error
    assert!(mean.abs() < 0.02, "mean {mean}");
    assert!((variance - 1.0).abs() < 0.03, "variance {variance}");

    // And: First-step draws of neighbouring paths are uncorrelated
    let pairs = standardized.len() - 1;
    let cross = (0..pairs)
        .map(|i| standardized[i][0] * standardized[i + 1][0])
        .sum::<f64>()
        / pairs as f64;
    assert!(cross.abs() < 0.1, "cross-path correlation {cross}");
}

// =============================================================================
// Law of large numbers
// =============================================================================

#[test]
fn when_path_count_grows_expected_return_converges_to_closed_form() {
    // Given: The closed-form GBM expectation exp(mu * T) - 1
    let (drift, volatility, days) = (0.15, 0.65, 30);
    let closed_form = (drift * days as f64 * DAILY_STEP).exp() - 1.0;

    // When/Then: Larger ensembles land within tighter tolerances
    for (paths, tolerance) in [(1_000, 0.03), (20_000, 0.008), (100_000, 0.004)] {
        let params = SimulationParameters::new(100.0, drift, volatility, days, paths).expect("valid");
        let ensemble = PathGenerator::new()
            .generate(&params, &mut seeded(11))
            .expect("generates");
        let summary = summarize(&ensemble).expect("summary");

        let error = (summary.expected_return - closed_form).abs();
        assert!(
            error < tolerance,
            "paths={paths}: |{} - {closed_form}| = {error} >= {tolerance}",
            summary.expected_return
        );
    }
}

#[test]
fn when_summarized_mean_path_starts_at_start_price() {
    let params = SimulationParameters::new(3.25, -0.4, 1.2, 15, 64).expect("valid");
    let ensemble = PathGenerator::new()
        .generate(&params, &mut seeded(5))
        .expect("generates");

    let summary = summarize(&ensemble).expect("summary");

    assert_eq!(summary.mean_path[0], 3.25);
    assert_eq!(summary.mean_path.len(), 16);
}
