//! Point estimators for the population upper bound.
//!
//! Both estimators map an observed sample maximum `m` (and sample size `k`)
//! to an estimate of `N`:
//!
//! ```text
//! Naive:  N̂ = m                      (biased low: E[N̂] = k(N+1)/(k+1))
//! MVUE:   N̂ = m(1 + 1/k) - 1         (unbiased: E[N̂] = N)
//! ```
//!
//! The MVUE widens the naive estimate by the average gap between observed
//! serials, which is what removes the downward bias.

use crate::error::{EstimarError, EstimarResult};

/// Naive estimator: the largest observed serial, exactly.
///
/// Systematically underestimates the population because the sample rarely
/// contains the very last serial.
#[must_use]
pub fn naive_estimate(max_serial: u32) -> f64 {
    f64::from(max_serial)
}

/// Minimum-Variance Unbiased Estimator: `m(1 + 1/k) - 1`.
///
/// May exceed the true population or be non-integral; both are expected for
/// an unbiased estimator.
///
/// # Errors
///
/// Returns `InvalidParameter` if `sample_size` is zero (the correction term
/// divides by `k`).
pub fn mvue_estimate(max_serial: u32, sample_size: u32) -> EstimarResult<f64> {
    if sample_size == 0 {
        return Err(EstimarError::invalid_parameter(
            "sample size must be at least 1 for the MVUE correction",
        ));
    }
    let k = f64::from(sample_size);
    Ok(f64::from(max_serial) * (1.0 + 1.0 / k) - 1.0)
}

/// Analytic expectation of the sample maximum: `k(N+1)/(k+1)`.
///
/// Exact for sampling without replacement from `{1, .., N}`; used by the
/// accuracy tests as Monte-Carlo-free ground truth.
#[must_use]
pub fn expected_max(population: u32, sample_size: u32) -> f64 {
    let n = f64::from(population);
    let k = f64::from(sample_size);
    k * (n + 1.0) / (k + 1.0)
}
