//! Aggregate statistics over estimate arrays.
//!
//! Single-pass folds; all metrics are relative to the known true population
//! of the generating scenario.

/// Arithmetic mean. Returns 0.0 for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Bias: `mean(estimates) - true_value`.
///
/// Positive bias means overestimation on average; an unbiased estimator
/// hovers near zero.
#[must_use]
pub fn bias(estimates: &[f64], true_value: f64) -> f64 {
    mean(estimates) - true_value
}

/// Root-mean-square error: `sqrt(mean((estimates - true_value)^2))`.
#[must_use]
pub fn rmse(estimates: &[f64], true_value: f64) -> f64 {
    if estimates.is_empty() {
        return 0.0;
    }
    let mse = estimates
        .iter()
        .map(|e| (e - true_value) * (e - true_value))
        .sum::<f64>()
        / estimates.len() as f64;
    mse.sqrt()
}

/// Population variance of the estimates.
#[must_use]
pub fn variance(estimates: &[f64]) -> f64 {
    if estimates.is_empty() {
        return 0.0;
    }
    let m = mean(estimates);
    estimates.iter().map(|e| (e - m) * (e - m)).sum::<f64>() / estimates.len() as f64
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Falsification test: RMSE dominates the absolute bias.
        #[test]
        fn prop_rmse_at_least_abs_bias(
            values in proptest::collection::vec(-1.0e6f64..1.0e6, 1..200),
            truth in -1.0e6f64..1.0e6,
        ) {
            let r = rmse(&values, truth);
            let b = bias(&values, truth).abs();
            // Allow a whisker of floating-point slack.
            prop_assert!(r >= b - 1e-6 * b.max(1.0));
        }

        /// Falsification test: variance is non-negative.
        #[test]
        fn prop_variance_non_negative(
            values in proptest::collection::vec(-1.0e6f64..1.0e6, 0..200),
        ) {
            prop_assert!(variance(&values) >= -1e-9);
        }
    }
}
