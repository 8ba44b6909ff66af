//! Time-decay-weighted return and covariance estimation.
//!
//! The estimator turns cached price histories into the statistics pair the
//! allocation solver consumes:
//!
//! - a daily covariance matrix of log returns, weighted linearly from 1
//!   (oldest day) towards 2 (newest day)
//! - an annual return per asset, the mean of year-over-year simple returns
//!   multiplied by a ramp from 0.75 (oldest year) to 1.25 (newest year)
//!
//! Assets whose history is missing or shorter than the lookback window are
//! excluded and reported, never fatal on their own.

use crate::cache::PriceCache;
use markowitz_traits::{
    AssetUniverse, Exclusion, ExclusionReason, MarkowitzError, Result, Symbol,
    TRADING_DAYS_PER_YEAR,
    numeric::{linspace, round_to, sanitize_non_finite},
};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration for statistics estimation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Trading days per year; sets both the window length and the yearly sampling stride
    pub trading_days_per_year: usize,
    /// Weight applied to the oldest year-over-year return
    pub return_weight_start: f64,
    /// Weight applied to the newest year-over-year return
    pub return_weight_end: f64,
    /// Decimal places kept on the annual return estimate
    pub return_decimals: u32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            trading_days_per_year: TRADING_DAYS_PER_YEAR,
            return_weight_start: 0.75,
            return_weight_end: 1.25,
            return_decimals: 3,
        }
    }
}

/// Statistics for a fixed asset universe.
#[derive(Debug, Clone)]
pub struct Estimate {
    /// Surviving assets; indexes every vector and matrix below.
    pub universe: AssetUniverse,
    /// Annual return estimate per asset.
    pub returns: Array1<f64>,
    /// Daily log-return covariance, sanitized.
    pub covariance: Array2<f64>,
    /// Candidates dropped during estimation.
    pub excluded: Vec<Exclusion>,
    /// Number of covariance entries overwritten because they were not finite.
    pub sanitized_entries: usize,
}

impl Estimate {
    /// Replaces the return estimate of every universe member present in `overrides`.
    ///
    /// The covariance matrix is left untouched. Overrides for symbols outside
    /// the universe are ignored.
    #[must_use]
    pub fn with_return_overrides(mut self, overrides: &BTreeMap<Symbol, f64>) -> Self {
        for (symbol, &value) in overrides {
            match self.universe.index_of(symbol) {
                Some(i) => self.returns[i] = value,
                None => {
                    tracing::warn!(symbol = %symbol, "return override ignored: symbol not in universe");
                }
            }
        }
        self
    }

    /// Return estimate for `symbol`, if it is in the universe.
    pub fn expected_return(&self, symbol: &str) -> Option<f64> {
        self.universe.index_of(symbol).map(|i| self.returns[i])
    }
}

/// Estimates returns and covariance from a [`PriceCache`].
///
/// # Examples
///
/// ```rust,ignore
/// use markowitz_stats::{PriceCache, StatisticsEstimator};
///
/// let mut cache = PriceCache::new();
/// cache.populate(&provider, &symbols, 5).await;
///
/// let estimate = StatisticsEstimator::default().estimate(&cache, &symbols, 5)?;
/// println!("{} assets survived", estimate.universe.len());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StatisticsEstimator {
    config: EstimatorConfig,
}

impl StatisticsEstimator {
    /// Create a new estimator with the given configuration.
    pub const fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub const fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Estimates statistics for `symbols` over a `years`-year lookback.
    ///
    /// Duplicate symbols are considered once. The resulting universe keeps
    /// the input order of the surviving symbols.
    ///
    /// # Errors
    ///
    /// - [`MarkowitzError::InvalidInput`] if `years < 2` (no year-over-year interval exists)
    /// - [`MarkowitzError::NoUsableAssets`] if every symbol is excluded
    pub fn estimate(&self, cache: &PriceCache, symbols: &[Symbol], years: u32) -> Result<Estimate> {
        if years < 2 {
            return Err(MarkowitzError::InvalidInput(format!(
                "lookback must span at least 2 years, got {years}"
            )));
        }

        let window = self.config.trading_days_per_year * years as usize;
        let mut universe = AssetUniverse::new();
        let mut excluded = Vec::new();
        let mut columns: Vec<&[f64]> = Vec::new();

        for symbol in symbols {
            if universe.contains(symbol) || excluded.iter().any(|e: &Exclusion| &e.symbol == symbol) {
                continue;
            }
            match cache.get(symbol) {
                Ok(series) => match series.tail(window) {
                    Some(prices) => {
                        universe.push(symbol.clone());
                        columns.push(prices);
                    }
                    None => excluded.push(Exclusion::new(
                        symbol.clone(),
                        ExclusionReason::TooShort {
                            required: window,
                            available: series.len(),
                        },
                    )),
                },
                Err(reason) => excluded.push(Exclusion::new(symbol.clone(), reason)),
            }
        }

        for exclusion in &excluded {
            tracing::warn!(%exclusion, "asset excluded from universe");
        }

        if universe.is_empty() {
            return Err(MarkowitzError::NoUsableAssets { excluded });
        }

        let prices = Array2::from_shape_fn((window, columns.len()), |(t, j)| columns[j][t]);
        let log_ret = log_returns(&prices);

        let weights = decay_weights(log_ret.nrows());
        let mut covariance = weighted_covariance(&log_ret, &weights);
        let sanitized_entries = sanitize_non_finite(&mut covariance);
        if sanitized_entries > 0 {
            tracing::warn!(
                sanitized_entries,
                "non-finite covariance entries replaced with sentinel"
            );
        }

        let returns: Array1<f64> = log_ret
            .axis_iter(Axis(1))
            .map(|col| self.annual_return(col, years as usize))
            .collect();

        tracing::info!(
            assets = universe.len(),
            excluded = excluded.len(),
            window,
            "estimated statistics"
        );

        Ok(Estimate {
            universe,
            returns,
            covariance,
            excluded,
            sanitized_entries,
        })
    }

    /// Ramp-weighted mean of year-over-year simple returns.
    ///
    /// Samples one price per year at offsets `0, d, 2d, …` (`d` trading days),
    /// so `years` samples bound `years - 1` intervals.
    fn annual_return(&self, log_returns: ArrayView1<'_, f64>, years: usize) -> f64 {
        let stride = self.config.trading_days_per_year;
        let intervals = years - 1;
        let ramp = linspace(
            self.config.return_weight_start,
            self.config.return_weight_end,
            intervals,
        );

        let weighted_sum: f64 = (0..intervals)
            .zip(ramp.iter())
            .map(|(k, w)| {
                let year_log: f64 = log_returns.slice(ndarray::s![k * stride..(k + 1) * stride]).sum();
                year_log.exp_m1() * w
            })
            .sum();

        round_to(weighted_sum / intervals as f64, self.config.return_decimals)
    }
}

/// Daily log returns of a price matrix (rows = days, oldest first).
///
/// The result has one row fewer than `prices`.
pub fn log_returns(prices: &Array2<f64>) -> Array2<f64> {
    let rows = prices.nrows().saturating_sub(1);
    Array2::from_shape_fn((rows, prices.ncols()), |(t, j)| {
        (prices[[t + 1, j]] / prices[[t, j]]).ln()
    })
}

/// Linear time-decay weights `1 + t / rows` for `t` in `0..rows`.
pub fn decay_weights(rows: usize) -> Array1<f64> {
    Array1::from_shape_fn(rows, |t| 1.0 + t as f64 / rows as f64)
}

/// Reliability-weighted unbiased covariance of the columns of `x`.
///
/// With `V1 = Σw` and `V2 = Σw²`, each entry is
/// `Σ w_t (x_tj - m_j)(x_tk - m_k) / (V1 - V2 / V1)` where `m` is the
/// weighted column mean. Uniform weights reduce to the ordinary sample
/// covariance. The result is exactly symmetric.
pub fn weighted_covariance(x: &Array2<f64>, weights: &Array1<f64>) -> Array2<f64> {
    let v1 = weights.sum();
    let v2 = weights.dot(weights);
    let norm = v1 - v2 / v1;

    let mean = weights.dot(x) / v1;
    let centered = x - &mean;
    let weighted = &centered * &weights.view().insert_axis(Axis(1));

    let mut cov = weighted.t().dot(&centered) / norm;
    let n = cov.nrows();
    for j in 0..n {
        for k in (j + 1)..n {
            cov[[k, j]] = cov[[j, k]];
        }
    }
    cov
}
