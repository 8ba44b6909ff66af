//! Price-history provider trait.
//!
//! This module defines the `PriceHistoryProvider` trait, the boundary between
//! the optimizer and whatever market-data source supplies adjusted closes.
//! Implementations may call a remote API, read files, or serve fixtures.

use crate::{PricePoint, Result};
use std::future::Future;

/// A source of historical adjusted close prices.
///
/// Implementations should be thread-safe (`Send + Sync`) so a single
/// provider can be shared by concurrent fetches.
///
/// # Failure semantics
///
/// Returning an error for a symbol is never fatal to a run: the estimator
/// records the symbol as excluded and carries on with the rest of the
/// universe.
///
/// # Example
///
/// ```no_run
/// use markowitz_traits::{Date, PriceHistoryProvider, PricePoint, Result};
///
/// struct Flat;
///
/// impl PriceHistoryProvider for Flat {
///     async fn price_history(&self, _symbol: &str, years: u32) -> Result<Vec<PricePoint>> {
///         let start = Date::from_ymd_opt(2020, 1, 1).unwrap();
///         Ok(start
///             .iter_days()
///             .take(252 * years as usize)
///             .map(|d| PricePoint::new(d, 100.0))
///             .collect())
///     }
/// }
/// ```
pub trait PriceHistoryProvider: Send + Sync {
    /// Fetches the adjusted close history of `symbol` covering at least
    /// the last `years` years.
    ///
    /// The returned points need not be sorted or gap-free; callers build a
    /// [`PriceSeries`](crate::PriceSeries) from them.
    ///
    /// # Errors
    ///
    /// Returns an error if the symbol is unknown, delisted, or the source
    /// is unreachable.
    fn price_history(
        &self,
        symbol: &str,
        years: u32,
    ) -> impl Future<Output = Result<Vec<PricePoint>>> + Send;

    /// Returns the name of this provider, used in log output.
    fn name(&self) -> &str {
        "unnamed"
    }
}
