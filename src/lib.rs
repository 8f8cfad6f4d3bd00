//! # estimar
//!
//! Estimation engine for the serial-number population problem: given a
//! random sample of `k` distinct serial numbers from an unknown contiguous
//! population `{1, .., N}`, estimate `N`.
//!
//! Three stateless entry points:
//! - [`simulation::simulate`]: Monte Carlo comparison of the naive
//!   estimator (`m`) against the MVUE (`m(1 + 1/k) - 1`), with bias and
//!   RMSE aggregation over bulk trials.
//! - [`simulation::accuracy`]: RMSE curves across a set of sample sizes.
//! - [`bayesian::bayesian`]: discrete posterior over candidate `N` from a
//!   single observed maximum, with MAP, mean, standard deviation, and a 95%
//!   credible interval.
//!
//! Every call takes an explicit [`engine::rng::TrialRng`]; there is no
//! global random state, so calls are reentrant and reproducible under a
//! fixed seed.
//!
//! ## Example
//!
//! ```rust
//! use estimar::prelude::*;
//!
//! let mut rng = TrialRng::new(42);
//! let scenario = Scenario::new(1000, 20).unwrap();
//! let result = simulate(&scenario, 10_000, &mut rng).unwrap();
//! assert!(result.mvue_bias.abs() < result.naive_bias.abs());
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops,  // Numerical code choices are intentional
    clippy::imprecise_flops,
    clippy::missing_const_for_fn,  // Many functions can't be const in stable Rust
    clippy::needless_range_loop,   // Sometimes range loops are clearer
)]

pub mod bayesian;
pub mod config;
pub mod engine;
pub mod error;
pub mod estimators;
pub mod simulation;
pub mod stats;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::bayesian::{bayesian, posterior_given_max, BayesianAnalysis, BayesianScenario, PosteriorDistribution};
    pub use crate::config::{BayesianConfig, EngineConfig, EngineConfigBuilder, Prior};
    pub use crate::engine::rng::TrialRng;
    pub use crate::engine::sampler::{draw_sample, SerialPool};
    pub use crate::error::{EstimarError, EstimarResult};
    pub use crate::estimators::{mvue_estimate, naive_estimate};
    pub use crate::simulation::{accuracy, simulate, AccuracyResult, Scenario, SimulationResult};
}

/// Re-export for public API
pub use error::{EstimarError, EstimarResult};
