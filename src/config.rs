//! Configuration with YAML schema and validation.
//!
//! Mistake-proofing through:
//! - Type-safe configuration structs
//! - Compile-time validation via serde (`deny_unknown_fields`)
//! - Runtime semantic validation

use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::error::{EstimarError, EstimarResult};

/// Default Monte Carlo iteration count per simulate call.
pub const DEFAULT_ITERATIONS: usize = 10_000;

/// Default multiplier applied to the observed maximum when deriving the
/// posterior grid's upper bound.
pub const DEFAULT_GRID_MULTIPLIER: u32 = 3;

/// Default cap on posterior grid points.
pub const DEFAULT_MAX_GRID_POINTS: usize = 4_000;

/// Top-level engine configuration.
///
/// Loaded from YAML files with full schema validation, or built
/// programmatically via [`EngineConfig::builder`].
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Schema version for forward compatibility.
    #[validate(length(min = 1))]
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Monte Carlo settings.
    #[validate(nested)]
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Bayesian posterior settings.
    #[validate(nested)]
    #[serde(default)]
    pub bayesian: BayesianConfig,

    /// Reproducibility settings.
    #[serde(default)]
    pub reproducibility: ReproducibilityConfig,
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

impl EngineConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> EstimarResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> EstimarResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;

        config.validate()?;
        config.validate_semantic()?;

        Ok(config)
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Validate semantic constraints beyond schema.
    fn validate_semantic(&self) -> EstimarResult<()> {
        if self.simulation.iterations < 1 {
            return Err(EstimarError::invalid_parameter(
                "iterations must be at least 1",
            ));
        }

        if self.bayesian.grid_multiplier < 2 {
            return Err(EstimarError::invalid_parameter(format!(
                "grid multiplier must be at least 2, got {}",
                self.bayesian.grid_multiplier
            )));
        }

        if self.bayesian.max_grid_points < 10 {
            return Err(EstimarError::invalid_parameter(format!(
                "grid-point cap must be at least 10, got {}",
                self.bayesian.max_grid_points
            )));
        }

        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            simulation: SimulationConfig::default(),
            bayesian: BayesianConfig::default(),
            reproducibility: ReproducibilityConfig::default(),
        }
    }
}

/// Monte Carlo settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    /// Trials per simulate call.
    #[validate(range(min = 1))]
    #[serde(default = "default_iterations")]
    pub iterations: usize,
}

fn default_iterations() -> usize {
    DEFAULT_ITERATIONS
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

/// Bayesian posterior settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct BayesianConfig {
    /// Grid upper bound = observed maximum × this multiplier.
    #[validate(range(min = 2))]
    #[serde(default = "default_grid_multiplier")]
    pub grid_multiplier: u32,

    /// Hard cap on grid points per posterior evaluation.
    #[validate(range(min = 10))]
    #[serde(default = "default_max_grid_points")]
    pub max_grid_points: usize,

    /// Prior over candidate population sizes.
    #[serde(default)]
    pub prior: Prior,
}

fn default_grid_multiplier() -> u32 {
    DEFAULT_GRID_MULTIPLIER
}

fn default_max_grid_points() -> usize {
    DEFAULT_MAX_GRID_POINTS
}

impl Default for BayesianConfig {
    fn default() -> Self {
        Self {
            grid_multiplier: DEFAULT_GRID_MULTIPLIER,
            max_grid_points: DEFAULT_MAX_GRID_POINTS,
            prior: Prior::default(),
        }
    }
}

/// Prior over candidate population sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prior {
    /// Flat prior: posterior is the normalized likelihood.
    #[default]
    Uniform,
    /// Reciprocal 1/N prior (Pareto with α=1, scale at the observed maximum).
    Reciprocal,
}

/// Reproducibility settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReproducibilityConfig {
    /// Master seed for all RNG streams.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_seed() -> u64 {
    42
}

impl Default for ReproducibilityConfig {
    fn default() -> Self {
        Self { seed: default_seed() }
    }
}

/// Configuration builder for programmatic construction.
#[derive(Debug, Default)]
pub struct EngineConfigBuilder {
    seed: Option<u64>,
    iterations: Option<usize>,
    grid_multiplier: Option<u32>,
    max_grid_points: Option<usize>,
    prior: Option<Prior>,
}

impl EngineConfigBuilder {
    /// Set the master random seed.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the Monte Carlo iteration count.
    #[must_use]
    pub const fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = Some(iterations);
        self
    }

    /// Set the posterior grid multiplier.
    #[must_use]
    pub const fn grid_multiplier(mut self, multiplier: u32) -> Self {
        self.grid_multiplier = Some(multiplier);
        self
    }

    /// Set the posterior grid-point cap.
    #[must_use]
    pub const fn max_grid_points(mut self, cap: usize) -> Self {
        self.max_grid_points = Some(cap);
        self
    }

    /// Set the prior over candidate population sizes.
    #[must_use]
    pub const fn prior(mut self, prior: Prior) -> Self {
        self.prior = Some(prior);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> EngineConfig {
        let mut config = EngineConfig::default();

        if let Some(seed) = self.seed {
            config.reproducibility.seed = seed;
        }
        if let Some(iterations) = self.iterations {
            config.simulation.iterations = iterations;
        }
        if let Some(multiplier) = self.grid_multiplier {
            config.bayesian.grid_multiplier = multiplier;
        }
        if let Some(cap) = self.max_grid_points {
            config.bayesian.max_grid_points = cap;
        }
        if let Some(prior) = self.prior {
            config.bayesian.prior = prior;
        }

        config
    }
}
