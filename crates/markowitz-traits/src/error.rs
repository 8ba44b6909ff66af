//! Error types for the Markowitz framework.
//!
//! This module defines the error types shared by the statistics estimator,
//! the allocation solver and the frontier tooling.

use crate::types::Exclusion;
use thiserror::Error;

/// The main error type for Markowitz operations.
///
/// Per-asset data problems and per-target infeasibility are *not* errors:
/// they degrade to exclusions and sentinel allocations respectively. The
/// variants here are the conditions that abort a run or reject its inputs.
#[derive(Debug, Error)]
pub enum MarkowitzError {
    /// Run parameters or inputs are invalid.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Error when data is insufficient for the requested operation.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Every candidate asset was excluded during estimation.
    #[error("No usable assets: all {} candidate(s) were excluded", excluded.len())]
    NoUsableAssets {
        /// The exclusions that emptied the universe.
        excluded: Vec<Exclusion>,
    },

    /// Vector or matrix dimensions do not agree with the asset universe.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The expected dimension.
        expected: usize,
        /// The dimension that was supplied.
        actual: usize,
    },

    /// Error fetching data from external sources.
    #[error("Data fetch error: {0}")]
    DataFetch(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

impl From<String> for MarkowitzError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for MarkowitzError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// A specialized Result type for Markowitz operations.
///
/// This is a convenience type that uses [`MarkowitzError`] as the error type.
pub type Result<T> = std::result::Result<T, MarkowitzError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ExclusionReason;

    #[test]
    fn test_error_display() {
        let err = MarkowitzError::InvalidInput("step size must be positive".to_string());
        assert_eq!(err.to_string(), "Invalid input: step size must be positive");

        let err = MarkowitzError::DimensionMismatch {
            expected: 3,
            actual: 2,
        };
        assert_eq!(err.to_string(), "Dimension mismatch: expected 3, got 2");
    }

    #[test]
    fn test_no_usable_assets_display() {
        let err = MarkowitzError::NoUsableAssets {
            excluded: vec![
                Exclusion::new("VTI", ExclusionReason::FetchFailed("timeout".to_string())),
                Exclusion::new(
                    "QQQ",
                    ExclusionReason::TooShort {
                        required: 1260,
                        available: 10,
                    },
                ),
            ],
        };
        assert_eq!(
            err.to_string(),
            "No usable assets: all 2 candidate(s) were excluded"
        );
    }

    #[test]
    fn test_error_from_string() {
        let err: MarkowitzError = "boom".into();
        assert!(matches!(err, MarkowitzError::Other(_)));
    }
}
