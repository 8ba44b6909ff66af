//! Statistics estimation for Markowitz portfolio optimization.
//!
//! This crate turns raw price histories into the inputs of the allocation
//! solver:
//!
//! - **Price cache**: per-run store of typed fetch outcomes
//! - **Estimator**: time-decay-weighted covariance and annual return vector
//!
//! # Examples
//!
//! ```rust,ignore
//! use markowitz_stats::{PriceCache, StatisticsEstimator};
//!
//! let mut cache = PriceCache::new();
//! cache.populate(&provider, &symbols, 5).await;
//!
//! let estimate = StatisticsEstimator::default().estimate(&cache, &symbols, 5)?;
//! for exclusion in &estimate.excluded {
//!     println!("skipped {exclusion}");
//! }
//! ```

mod cache;
mod estimator;

pub use cache::{FetchOutcome, PriceCache};
pub use estimator::{
    Estimate, EstimatorConfig, StatisticsEstimator, decay_weights, log_returns,
    weighted_covariance,
};
