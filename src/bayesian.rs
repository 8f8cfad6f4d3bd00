//! Discrete Bayesian posterior inference over candidate population sizes.
//!
//! Given one realized observation (maximum serial `m` from a sample of `k`),
//! the likelihood of a candidate population `N` is
//!
//! ```text
//! P(m | N, k) = C(m-1, k-1) / C(N, k)   for N >= m, else 0
//! ```
//!
//! Binomial coefficients overflow `f64` long before N reaches the thousands,
//! so all likelihood evaluation happens in log space via log-gamma, and the
//! posterior is normalized with log-sum-exp stabilization: weights are
//! exponentiated relative to the maximum log-likelihood on the grid before
//! summing.
//!
//! The candidate grid is the integer range `m..=m * grid_multiplier`,
//! computed per call and discarded; there is no cross-call caching.

use serde::{Deserialize, Serialize};
use statrs::function::gamma::ln_gamma;
use std::time::Instant;

use crate::config::{BayesianConfig, Prior};
use crate::engine::rng::TrialRng;
use crate::engine::sampler::draw_sample;
use crate::error::{EstimarError, EstimarResult};
use crate::simulation::Scenario;

/// Natural log of the binomial coefficient C(n, k), via log-gamma.
///
/// Returns negative infinity when `k > n` (the coefficient is zero).
#[must_use]
pub fn ln_choose(n: u64, k: u64) -> f64 {
    if k > n {
        return f64::NEG_INFINITY;
    }
    ln_gamma(n as f64 + 1.0) - ln_gamma(k as f64 + 1.0) - ln_gamma((n - k) as f64 + 1.0)
}

/// Log-likelihood of candidate population `candidate` given observed
/// maximum `max_observed` from a sample of `sample_size`.
///
/// `ln C(m-1, k-1) - ln C(N, k)` for `N >= m`, negative infinity below.
/// A zero-size sample has no maximum, so its likelihood is also zero.
#[must_use]
pub fn log_likelihood(candidate: u32, max_observed: u32, sample_size: u32) -> f64 {
    if candidate < max_observed || sample_size == 0 {
        return f64::NEG_INFINITY;
    }
    ln_choose(u64::from(max_observed) - 1, u64::from(sample_size) - 1)
        - ln_choose(u64::from(candidate), u64::from(sample_size))
}

/// Normalized discrete posterior over candidate population sizes.
///
/// `n_values` ascends from the observed maximum (candidates below it have
/// zero likelihood) to the grid bound; `posterior` is aligned and sums
/// to 1 within 1e-9.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosteriorDistribution {
    /// Candidate population sizes, ascending.
    pub n_values: Vec<u32>,
    /// Posterior probability per candidate.
    pub posterior: Vec<f64>,
    /// Grid value at the posterior mode.
    pub map_estimate: f64,
    /// Posterior expected value.
    pub mean_estimate: f64,
    /// Posterior standard deviation.
    pub std_estimate: f64,
    /// Equal-tailed 95% credible interval: the first grid values whose
    /// cumulative posterior mass reaches 2.5% and 97.5% respectively.
    pub credible_interval_95: (f64, f64),
}

impl PosteriorDistribution {
    /// Total posterior mass inside the closed interval `[lo, hi]`.
    #[must_use]
    pub fn mass_between(&self, lo: f64, hi: f64) -> f64 {
        self.n_values
            .iter()
            .zip(self.posterior.iter())
            .filter(|(&n, _)| f64::from(n) >= lo && f64::from(n) <= hi)
            .map(|(_, &p)| p)
            .sum()
    }

    /// Whether the credible interval contains the given population.
    #[must_use]
    pub fn interval_contains(&self, population: u32) -> bool {
        let n = f64::from(population);
        n >= self.credible_interval_95.0 && n <= self.credible_interval_95.1
    }
}

/// Compute the posterior over candidate populations for one observation.
///
/// The grid spans `max_observed..=max_observed * config.grid_multiplier`;
/// its size is capped by `config.max_grid_points`.
///
/// # Errors
///
/// - `InvalidParameter` if `max_observed < 1`, `sample_size < 1`, or
///   `sample_size > max_observed` (a maximum below the sample size is
///   impossible for distinct serials).
/// - `GridTooLarge` if the grid would exceed the configured point cap.
pub fn posterior_given_max(
    max_observed: u32,
    sample_size: u32,
    config: &BayesianConfig,
) -> EstimarResult<PosteriorDistribution> {
    if max_observed < 1 {
        return Err(EstimarError::invalid_parameter(format!(
            "observed maximum must be at least 1, got {max_observed}"
        )));
    }
    if sample_size < 1 {
        return Err(EstimarError::invalid_parameter(format!(
            "sample size must be at least 1, got {sample_size}"
        )));
    }
    if sample_size > max_observed {
        return Err(EstimarError::invalid_parameter(format!(
            "observed maximum {max_observed} is impossible for {sample_size} distinct serials"
        )));
    }

    let bound = u64::from(max_observed) * u64::from(config.grid_multiplier);
    let grid_points = (bound - u64::from(max_observed) + 1) as usize;
    if grid_points > config.max_grid_points {
        return Err(EstimarError::GridTooLarge {
            requested: grid_points,
            cap: config.max_grid_points,
        });
    }

    let n_values: Vec<u32> = (max_observed..=bound as u32).collect();

    // Unnormalized log posterior per grid point. The C(m-1, k-1) term is
    // constant across the grid but kept so each entry is a true
    // log-likelihood.
    let log_weights: Vec<f64> = n_values
        .iter()
        .map(|&n| {
            let ll = log_likelihood(n, max_observed, sample_size);
            match config.prior {
                Prior::Uniform => ll,
                Prior::Reciprocal => ll - f64::from(n).ln(),
            }
        })
        .collect();

    // Log-sum-exp: exponentiate relative to the max before normalizing.
    let max_lw = log_weights.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let weights: Vec<f64> = log_weights.iter().map(|&lw| (lw - max_lw).exp()).collect();
    let total: f64 = weights.iter().sum();
    let posterior: Vec<f64> = weights.iter().map(|&w| w / total).collect();

    // MAP: grid value at the posterior mode (first index on ties).
    let map_idx = posterior
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map_or(0, |(i, _)| i);
    let map_estimate = f64::from(n_values[map_idx]);

    let mean_estimate: f64 = n_values
        .iter()
        .zip(posterior.iter())
        .map(|(&n, &p)| f64::from(n) * p)
        .sum();
    let variance: f64 = n_values
        .iter()
        .zip(posterior.iter())
        .map(|(&n, &p)| {
            let d = f64::from(n) - mean_estimate;
            p * d * d
        })
        .sum();
    let std_estimate = variance.sqrt();

    let credible_interval_95 = equal_tailed_interval(&n_values, &posterior, 0.95);

    Ok(PosteriorDistribution {
        n_values,
        posterior,
        map_estimate,
        mean_estimate,
        std_estimate,
        credible_interval_95,
    })
}

/// Equal-tailed credible interval from the discrete CDF: the first grid
/// values whose cumulative mass reaches α/2 and 1 - α/2.
fn equal_tailed_interval(n_values: &[u32], posterior: &[f64], confidence: f64) -> (f64, f64) {
    let alpha = (1.0 - confidence) / 2.0;
    let mut cdf = 0.0;
    let mut lower = f64::from(n_values[0]);
    let mut upper = f64::from(n_values[n_values.len() - 1]);
    let mut lower_found = false;

    for (&n, &p) in n_values.iter().zip(posterior.iter()) {
        cdf += p;
        if !lower_found && cdf >= alpha {
            lower = f64::from(n);
            lower_found = true;
        }
        if cdf >= 1.0 - alpha {
            upper = f64::from(n);
            break;
        }
    }

    (lower, upper)
}

/// A Bayesian analysis scenario.
///
/// `true_population` only synthesizes an observation when `max_observed`
/// is absent; it never enters the likelihood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BayesianScenario {
    /// True population size N for observation synthesis.
    pub true_population: u32,
    /// Sample size k behind the observation.
    pub sample_size: u32,
    /// Observed maximum; drawn from a fresh sample when absent.
    pub max_observed: Option<u32>,
}

impl BayesianScenario {
    /// Create a validated scenario.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the (N, k) invariant is violated or a
    /// supplied `max_observed` is outside `[sample_size, true_population)`.
    pub fn new(
        true_population: u32,
        sample_size: u32,
        max_observed: Option<u32>,
    ) -> EstimarResult<Self> {
        let scenario = Self {
            true_population,
            sample_size,
            max_observed,
        };
        scenario.validate()?;
        Ok(scenario)
    }

    /// Validate the scenario.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` as described on [`BayesianScenario::new`].
    pub fn validate(&self) -> EstimarResult<()> {
        Scenario::new(self.true_population, self.sample_size)?;

        if let Some(m) = self.max_observed {
            if m < 1 {
                return Err(EstimarError::invalid_parameter(
                    "observed maximum must be at least 1",
                ));
            }
            if m >= self.true_population {
                return Err(EstimarError::invalid_parameter(format!(
                    "observed maximum {m} must be less than true population {}",
                    self.true_population
                )));
            }
            if m < self.sample_size {
                return Err(EstimarError::invalid_parameter(format!(
                    "observed maximum {m} is impossible for {} distinct serials",
                    self.sample_size
                )));
            }
        }
        Ok(())
    }
}

/// Run metadata attached to every Bayesian analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BayesianMetadata {
    /// Wall-clock posterior computation time in milliseconds.
    pub computation_time_ms: u64,
    /// Grid points evaluated.
    pub grid_points: usize,
}

/// Full Bayesian analysis: the posterior plus the scenario it answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BayesianAnalysis {
    /// True population size of the scenario.
    pub true_population: u32,
    /// Sample size behind the observation.
    pub sample_size: u32,
    /// Observed maximum the posterior conditions on.
    pub max_observed: u32,
    /// Candidate population sizes, ascending.
    pub n_values: Vec<u32>,
    /// Posterior probability per candidate.
    pub posterior: Vec<f64>,
    /// Grid value at the posterior mode.
    pub map_estimate: f64,
    /// Posterior expected value.
    pub mean_estimate: f64,
    /// Posterior standard deviation.
    pub std_estimate: f64,
    /// Equal-tailed 95% credible interval.
    pub credible_interval_95: (f64, f64),
    /// Run metadata.
    pub metadata: BayesianMetadata,
}

/// Run a Bayesian analysis for a scenario.
///
/// When the scenario carries no `max_observed`, one sample of
/// `sample_size` distinct serials is drawn from the true population and
/// its maximum becomes the observation, deterministic under a fixed RNG
/// seed. The posterior itself never sees `true_population`.
///
/// # Errors
///
/// - `InvalidParameter` if the scenario is out of domain (see
///   [`BayesianScenario::new`]).
/// - `GridTooLarge` if the posterior grid would exceed the configured cap.
///
/// # Example
///
/// ```rust
/// use estimar::bayesian::{bayesian, BayesianScenario};
/// use estimar::config::BayesianConfig;
/// use estimar::engine::rng::TrialRng;
///
/// let scenario = BayesianScenario::new(1000, 20, None).unwrap();
/// let mut rng = TrialRng::new(42);
/// let analysis = bayesian(&scenario, &BayesianConfig::default(), &mut rng).unwrap();
///
/// let total: f64 = analysis.posterior.iter().sum();
/// assert!((total - 1.0).abs() < 1e-9);
/// ```
pub fn bayesian(
    scenario: &BayesianScenario,
    config: &BayesianConfig,
    rng: &mut TrialRng,
) -> EstimarResult<BayesianAnalysis> {
    scenario.validate()?;

    let max_observed = match scenario.max_observed {
        Some(m) => m,
        None => {
            let sample = draw_sample(scenario.true_population, scenario.sample_size, rng)?;
            sample.iter().copied().max().unwrap_or(scenario.sample_size)
        }
    };

    let start = Instant::now();
    let dist = posterior_given_max(max_observed, scenario.sample_size, config)?;
    let computation_time_ms = start.elapsed().as_millis() as u64;

    let grid_points = dist.n_values.len();
    Ok(BayesianAnalysis {
        true_population: scenario.true_population,
        sample_size: scenario.sample_size,
        max_observed,
        n_values: dist.n_values,
        posterior: dist.posterior,
        map_estimate: dist.map_estimate,
        mean_estimate: dist.mean_estimate,
        std_estimate: dist.std_estimate,
        credible_interval_95: dist.credible_interval_95,
        metadata: BayesianMetadata {
            computation_time_ms,
            grid_points,
        },
    })
}
