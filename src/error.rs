//! Error types for estimar.
//!
//! All fallible operations return `Result<T, EstimarError>`; validation
//! happens before any sampling or likelihood work begins, so a returned
//! error never leaves partial results behind.

use thiserror::Error;

/// Result type alias for estimar operations.
pub type EstimarResult<T> = Result<T, EstimarError>;

/// Unified error type for all estimar operations.
///
/// Each variant carries a machine-readable kind (see [`EstimarError::kind`])
/// and a human-readable reason, so API layers can map errors without
/// parsing display strings.
#[derive(Debug, Error)]
pub enum EstimarError {
    /// Out-of-domain population, sample size, iteration count, or grid bound.
    #[error("invalid parameter: {message}")]
    InvalidParameter {
        /// Description of the violated constraint.
        message: String,
    },

    /// Bayesian grid would exceed the configured computation budget.
    #[error("posterior grid of {requested} points exceeds cap of {cap}")]
    GridTooLarge {
        /// Grid points the request would require.
        requested: usize,
        /// Configured maximum grid-point count.
        cap: usize,
    },

    /// YAML parsing error while loading configuration.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Configuration schema validation error.
    #[error("validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// File I/O error while loading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EstimarError {
    /// Create an invalid-parameter error with a message.
    #[must_use]
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Machine-readable error kind token.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidParameter { .. } => "invalid_parameter",
            Self::GridTooLarge { .. } => "grid_too_large",
            Self::YamlParse(_) => "yaml_parse",
            Self::Validation(_) => "validation",
            Self::Io(_) => "io",
        }
    }

    /// Check whether this error was raised by input validation.
    ///
    /// Validation errors are deterministic: retrying the same call with the
    /// same inputs yields the same error.
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter { .. } | Self::GridTooLarge { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_display() {
        let err = EstimarError::invalid_parameter("sample size 10 must be less than population 5");
        let msg = err.to_string();
        assert!(msg.contains("invalid parameter"));
        assert!(msg.contains("sample size 10"));
    }

    #[test]
    fn test_grid_too_large_display() {
        let err = EstimarError::GridTooLarge {
            requested: 20_001,
            cap: 4_000,
        };
        let msg = err.to_string();
        assert!(msg.contains("20001"));
        assert!(msg.contains("4000"));
    }

    #[test]
    fn test_kind_tokens() {
        assert_eq!(
            EstimarError::invalid_parameter("x").kind(),
            "invalid_parameter"
        );
        assert_eq!(
            EstimarError::GridTooLarge {
                requested: 1,
                cap: 0
            }
            .kind(),
            "grid_too_large"
        );
    }

    #[test]
    fn test_is_invalid_input() {
        assert!(EstimarError::invalid_parameter("x").is_invalid_input());
        assert!(EstimarError::GridTooLarge {
            requested: 9,
            cap: 1
        }
        .is_invalid_input());

        let io = EstimarError::Io(std::io::Error::other("disk gone"));
        assert!(!io.is_invalid_input());
    }

    #[test]
    fn test_error_debug() {
        let err = EstimarError::invalid_parameter("test");
        let debug = format!("{err:?}");
        assert!(debug.contains("InvalidParameter"));
    }
}
