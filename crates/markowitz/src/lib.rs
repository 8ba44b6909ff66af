#![doc(issue_tracker_base_url = "https://github.com/factordynamics/markowitz/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # markowitz
//!
//! Mean-variance portfolio optimization with efficient frontier analysis.
//!
//! markowitz is an umbrella crate that re-exports all markowitz sub-crates
//! for convenience.
//!
//! ## Quick Start
//!
//! ```ignore
//! use markowitz::fmp::FmpClient;
//! use markowitz::prelude::*;
//!
//! # async fn example() -> markowitz::Result<()> {
//! let client = FmpClient::from_env()?;
//! let symbols = vec!["VTI".to_string(), "BND".to_string(), "VXUS".to_string()];
//!
//! let mut cache = PriceCache::new();
//! cache.populate(&client, &symbols, 5).await;
//! let estimate = StatisticsEstimator::default().estimate(&cache, &symbols, 5)?;
//!
//! let table = FrontierSweeper::new().sweep(
//!     0.0, 0.20, 0.01,
//!     &estimate.returns, &estimate.covariance, &estimate.universe,
//!     10_000.0,
//! )?;
//! let tangency = FrontierAnalyzer::new().analyze(&table, 0.04)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - Shared types, the price-history provider seam, errors
//! - [`stats`] - Price cache and statistics estimation
//! - [`optimize`] - Allocation solver, frontier sweep and tangency analysis
//! - [`fmp`] - Financial Modeling Prep price-history provider
//!
//! ## Pipeline
//!
//! 1. **Provider** fetches daily adjusted closes into a per-run [`PriceCache`](stats::PriceCache)
//! 2. **Estimator** aligns the series and produces annual returns and a decay-weighted covariance
//! 3. **Sweeper** solves the long-only minimum-variance portfolio at each target return
//! 4. **Analyzer** fits the frontier and finds the tangency portfolio

/// Version information for the markowitz crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core types and the provider trait.
pub mod traits {
    pub use markowitz_traits::*;
}

pub use markowitz_traits::{MarkowitzError, Result};

/// Statistics estimation.
///
/// ## Covariance
///
/// Daily log returns are weighted linearly from 1 (oldest) towards 2
/// (newest) and combined with the unbiased reliability-weighted estimator.
/// Non-finite entries are replaced by 1.0.
///
/// ## Expected returns
///
/// One price per year of lookback; year-over-year returns are weighted on a
/// ramp from 0.75 to 1.25 and averaged.
pub mod stats {
    pub use markowitz_stats::*;
}

/// Allocation, frontier sweep and tangency analysis.
pub mod optimize {
    pub use markowitz_optimize::*;
}

/// Financial Modeling Prep (FMP) API client.
///
/// ## Setup
///
/// 1. Get an API key at <https://financialmodelingprep.com/>
/// 2. Set the `FMP_API_KEY` environment variable or add it to a `.env` file
pub mod fmp {
    pub use markowitz_fmp::*;
}

/// Prelude module for convenient imports.
///
/// ```ignore
/// use markowitz::prelude::*;
/// ```
pub mod prelude {
    pub use crate::optimize::{
        Allocation, AllocationOutcome, AllocationSolver, FrontierAnalyzer, FrontierSweeper,
        FrontierTable, RunConfig, Tangency,
    };
    pub use crate::stats::{Estimate, PriceCache, StatisticsEstimator};
    pub use crate::traits::{AssetUniverse, PriceHistoryProvider, PriceSeries, Symbol};
    pub use crate::{MarkowitzError, Result};
}
