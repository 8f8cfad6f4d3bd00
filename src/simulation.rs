//! Monte Carlo simulation engine.
//!
//! Repeats draw-sample → observe-max → estimate for a configured trial
//! count and aggregates per-estimator bias and RMSE.
//!
//! # Batched strategy
//!
//! Trials are embarrassingly parallel, so the engine never interleaves
//! scalar draw/estimate steps: it produces the full maxima array in one
//! bulk pass over a reusable serial pool, then maps both estimate arrays
//! and folds the aggregates. 10 000 trials at N ≤ 10 000, k ≤ 100 complete
//! well inside 200 ms on commodity hardware.
//!
//! # Convergence
//!
//! By the Central Limit Theorem the estimate means converge at O(n^{-1/2}),
//! so the default 10 000 trials pin the naive/MVUE bias gap far outside
//! sampling noise.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::engine::rng::TrialRng;
use crate::engine::sampler::draw_maxima;
use crate::error::{EstimarError, EstimarResult};
use crate::stats::{bias, rmse};

/// A simulation scenario: the ground truth the engine samples against.
///
/// Invariant: `3 <= true_population` and `2 <= sample_size < true_population`
/// (sampling without replacement must be feasible and the MVUE correction
/// needs at least two observations).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// True population size N; serials are `1..=N`.
    pub true_population: u32,
    /// Sample size k drawn per trial.
    pub sample_size: u32,
}

impl Scenario {
    /// Create a validated scenario.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the scenario invariant is violated.
    pub fn new(true_population: u32, sample_size: u32) -> EstimarResult<Self> {
        let scenario = Self {
            true_population,
            sample_size,
        };
        scenario.validate()?;
        Ok(scenario)
    }

    /// Validate the scenario invariant.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `true_population < 3`,
    /// `sample_size < 2`, or `sample_size >= true_population`.
    pub fn validate(&self) -> EstimarResult<()> {
        if self.true_population < 3 {
            return Err(EstimarError::invalid_parameter(format!(
                "true population must be at least 3, got {}",
                self.true_population
            )));
        }
        if self.sample_size < 2 {
            return Err(EstimarError::invalid_parameter(format!(
                "sample size must be at least 2, got {}",
                self.sample_size
            )));
        }
        if self.sample_size >= self.true_population {
            return Err(EstimarError::invalid_parameter(format!(
                "sample size {} must be less than true population {}",
                self.sample_size, self.true_population
            )));
        }
        Ok(())
    }
}

/// Run metadata attached to every simulation result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationMetadata {
    /// Trials executed.
    pub iterations: usize,
    /// Wall-clock computation time in milliseconds.
    pub computation_time_ms: u64,
}

/// Result of one Monte Carlo simulation.
///
/// Owns the full per-trial estimate arrays plus derived aggregates;
/// immutable after construction and owned solely by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    /// True population size the trials sampled from.
    pub true_population: u32,
    /// Sample size per trial.
    pub sample_size: u32,
    /// Naive estimate per trial (the observed maximum).
    pub naive_estimates: Vec<f64>,
    /// MVUE estimate per trial.
    pub mvue_estimates: Vec<f64>,
    /// RMSE of the naive estimator relative to the true population.
    pub naive_rmse: f64,
    /// RMSE of the MVUE relative to the true population.
    pub mvue_rmse: f64,
    /// Mean signed error of the naive estimator.
    pub naive_bias: f64,
    /// Mean signed error of the MVUE.
    pub mvue_bias: f64,
    /// Run metadata.
    pub metadata: SimulationMetadata,
}

/// Run a Monte Carlo comparison of the naive estimator and the MVUE.
///
/// Each of `iterations` independent trials draws `sample_size` distinct
/// serials from `{1, .., true_population}`, observes the maximum, and
/// computes both estimates. Deterministic for a fixed RNG seed.
///
/// # Errors
///
/// Returns `InvalidParameter` if the scenario invariant is violated or
/// `iterations < 1`. Validation happens before any sampling.
///
/// # Example
///
/// ```rust
/// use estimar::engine::rng::TrialRng;
/// use estimar::simulation::{simulate, Scenario};
///
/// let scenario = Scenario::new(1000, 20).unwrap();
/// let mut rng = TrialRng::new(42);
/// let result = simulate(&scenario, 10_000, &mut rng).unwrap();
///
/// // Naive underestimates by ~N/(k+1); MVUE is unbiased.
/// assert!(result.naive_bias < -30.0);
/// assert!(result.mvue_bias.abs() < 10.0);
/// ```
pub fn simulate(
    scenario: &Scenario,
    iterations: usize,
    rng: &mut TrialRng,
) -> EstimarResult<SimulationResult> {
    scenario.validate()?;
    if iterations < 1 {
        return Err(EstimarError::invalid_parameter(
            "iterations must be at least 1",
        ));
    }

    let start = Instant::now();

    // Bulk pass: all trial maxima in one array.
    let maxima = draw_maxima(
        scenario.true_population,
        scenario.sample_size,
        iterations,
        rng,
    )?;

    // Vectorized estimate mapping; the MVUE factor is hoisted out of the loop.
    let mvue_factor = 1.0 + 1.0 / f64::from(scenario.sample_size);
    let naive_estimates: Vec<f64> = maxima.iter().map(|&m| f64::from(m)).collect();
    let mvue_estimates: Vec<f64> = maxima
        .iter()
        .map(|&m| f64::from(m) * mvue_factor - 1.0)
        .collect();

    let truth = f64::from(scenario.true_population);
    let result = SimulationResult {
        true_population: scenario.true_population,
        sample_size: scenario.sample_size,
        naive_rmse: rmse(&naive_estimates, truth),
        mvue_rmse: rmse(&mvue_estimates, truth),
        naive_bias: bias(&naive_estimates, truth),
        mvue_bias: bias(&mvue_estimates, truth),
        naive_estimates,
        mvue_estimates,
        metadata: SimulationMetadata {
            iterations,
            computation_time_ms: start.elapsed().as_millis() as u64,
        },
    };

    Ok(result)
}

/// One entry of an accuracy sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracyPoint {
    /// Sample size this entry was simulated with.
    pub sample_size: u32,
    /// RMSE of the naive estimator at this sample size.
    pub naive_rmse: f64,
    /// RMSE of the MVUE at this sample size.
    pub mvue_rmse: f64,
}

/// Accuracy sweep result: comparative RMSE curves for one population.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccuracyResult {
    /// True population size shared by every sweep entry.
    pub true_population: u32,
    /// One point per requested sample size, in request order.
    pub results: Vec<AccuracyPoint>,
}

/// Measure estimator accuracy across sample sizes.
///
/// Runs one simulation of `iterations` trials per requested sample size and
/// keeps only the RMSE pair. Each sample size draws from its own partitioned
/// RNG stream, so entries are independent; output preserves input order.
///
/// The whole request fails fast: every sample size is validated against the
/// scenario invariant before the first simulation runs, so an invalid entry
/// anywhere in the list yields `InvalidParameter` and no partial results.
///
/// # Errors
///
/// Returns `InvalidParameter` if any sample size violates
/// `2 <= k < true_population`, or if `iterations < 1`.
pub fn accuracy(
    true_population: u32,
    sample_sizes: &[u32],
    iterations: usize,
    rng: &mut TrialRng,
) -> EstimarResult<AccuracyResult> {
    // Fail fast on the whole batch before any sampling.
    let scenarios = sample_sizes
        .iter()
        .map(|&k| Scenario::new(true_population, k))
        .collect::<EstimarResult<Vec<_>>>()?;
    if iterations < 1 {
        return Err(EstimarError::invalid_parameter(
            "iterations must be at least 1",
        ));
    }

    let mut streams = rng.partition(scenarios.len());
    let results = scenarios
        .iter()
        .zip(streams.iter_mut())
        .map(|(scenario, stream)| {
            let sim = simulate(scenario, iterations, stream)?;
            Ok(AccuracyPoint {
                sample_size: scenario.sample_size,
                naive_rmse: sim.naive_rmse,
                mvue_rmse: sim.mvue_rmse,
            })
        })
        .collect::<EstimarResult<Vec<_>>>()?;

    Ok(AccuracyResult {
        true_population,
        results,
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Falsification test: for any valid scenario and seed, the observed
        /// maxima stay in [1, N] and the naive estimate equals the maximum.
        #[test]
        fn prop_naive_is_sample_max(
            seed in 0u64..u64::MAX,
            population in 3u32..500,
        ) {
            let sample_size = 2 + seed as u32 % (population - 2);
            let scenario = Scenario::new(population, sample_size).unwrap();
            let mut rng = TrialRng::new(seed);
            let result = simulate(&scenario, 50, &mut rng).unwrap();

            for &e in &result.naive_estimates {
                prop_assert!(e >= 1.0 && e <= f64::from(population));
                prop_assert!((e.round() - e).abs() < f64::EPSILON);
            }
        }

        /// Falsification test: RMSE is never negative and bias magnitude
        /// never exceeds RMSE.
        #[test]
        fn prop_rmse_dominates_bias(seed in 0u64..u64::MAX) {
            let scenario = Scenario::new(300, 10).unwrap();
            let mut rng = TrialRng::new(seed);
            let result = simulate(&scenario, 200, &mut rng).unwrap();

            prop_assert!(result.naive_rmse >= 0.0);
            prop_assert!(result.mvue_rmse >= 0.0);
            prop_assert!(result.naive_rmse >= result.naive_bias.abs() - 1e-9);
            prop_assert!(result.mvue_rmse >= result.mvue_bias.abs() - 1e-9);
        }
    }
}
