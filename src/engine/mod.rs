//! Sampling engine.
//!
//! Low-level primitives shared by the Monte Carlo and Bayesian entry
//! points:
//! - Deterministic RNG (PCG with partitioned seeds)
//! - Exact-uniform sampling without replacement over the serial space

pub mod rng;
pub mod sampler;

pub use rng::TrialRng;
pub use sampler::{draw_maxima, draw_sample, SerialPool};
