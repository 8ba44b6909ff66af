#![doc(issue_tracker_base_url = "https://github.com/factordynamics/markowitz/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and trait definitions for the Markowitz portfolio optimizer.
//!
//! This crate provides the foundational abstractions shared by the
//! statistics estimator, the allocation solver and the frontier tooling:
//! price series, asset universes, the price-history provider seam and the
//! common error type.

/// The version of the markowitz-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod error;
pub mod numeric;
pub mod provider;
pub mod types;
pub mod universe;

// Re-exports
pub use error::{MarkowitzError, Result};
pub use provider::PriceHistoryProvider;
pub use types::{Date, Exclusion, ExclusionReason, PricePoint, PriceSeries, Symbol};
pub use universe::{AssetUniverse, Candidate, CandidateFilter};

/// Trading days in one year, used for alignment and annualization.
pub const TRADING_DAYS_PER_YEAR: usize = 252;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }
}
