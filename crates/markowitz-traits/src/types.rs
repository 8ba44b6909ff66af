//! Common types used throughout the Markowitz framework.
//!
//! This module defines the price-history representation handed to the
//! statistics estimator and the typed per-asset exclusion record.

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// A market symbol identifier.
///
/// Symbols are ticker strings such as "VTI" or "QQQ".
pub type Symbol = String;

/// A single observation returned by a price-history provider.
///
/// `close` is the adjusted close. `None`, non-finite and non-positive values
/// are all treated as gaps when building a [`PriceSeries`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading date.
    pub date: Date,
    /// Adjusted close, if observed.
    pub close: Option<f64>,
}

impl PricePoint {
    /// Creates an observed price point.
    pub const fn new(date: Date, close: f64) -> Self {
        Self {
            date,
            close: Some(close),
        }
    }

    /// Creates a gap at the given date.
    pub const fn missing(date: Date) -> Self {
        Self { date, close: None }
    }

    fn observed(&self) -> Option<f64> {
        self.close.filter(|p| p.is_finite() && *p > 0.0)
    }
}

/// A date-ordered, gap-filled series of adjusted close prices for one asset.
///
/// Built with [`PriceSeries::from_points`], which:
/// - sorts observations by date, keeping the last observation for a repeated date
/// - drops leading gaps (the series starts at the first observed price)
/// - fills interior gaps by linear interpolation between the neighbouring observations
/// - forward-fills trailing gaps with the last observed price
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: Symbol,
    dates: Vec<Date>,
    prices: Vec<f64>,
}

impl PriceSeries {
    /// Builds a gap-filled series from raw provider output.
    ///
    /// # Example
    ///
    /// ```
    /// use markowitz_traits::{Date, PricePoint, PriceSeries};
    ///
    /// let d = |day| Date::from_ymd_opt(2024, 1, day).unwrap();
    /// let series = PriceSeries::from_points(
    ///     "VTI",
    ///     vec![PricePoint::new(d(2), 10.0), PricePoint::missing(d(3)), PricePoint::new(d(4), 12.0)],
    /// );
    /// assert_eq!(series.prices(), &[10.0, 11.0, 12.0]);
    /// ```
    pub fn from_points(symbol: impl Into<Symbol>, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);

        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }

        let Some(first) = deduped.iter().position(|p| p.observed().is_some()) else {
            return Self {
                symbol: symbol.into(),
                dates: Vec::new(),
                prices: Vec::new(),
            };
        };
        let deduped = &deduped[first..];

        let dates: Vec<Date> = deduped.iter().map(|p| p.date).collect();
        let raw: Vec<Option<f64>> = deduped.iter().map(PricePoint::observed).collect();
        let prices = fill_gaps(&raw);

        Self {
            symbol: symbol.into(),
            dates,
            prices,
        }
    }

    /// Builds a series from already-clean prices, one per consecutive date slot.
    ///
    /// Dates are synthesized as consecutive days from `start`. Non-positive or
    /// non-finite values are still treated as gaps and filled.
    pub fn from_prices(symbol: impl Into<Symbol>, start: Date, prices: &[f64]) -> Self {
        let points = prices
            .iter()
            .zip(start.iter_days())
            .map(|(&p, date)| PricePoint::new(date, p))
            .collect();
        Self::from_points(symbol, points)
    }

    /// The asset this series belongs to.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Observation dates, oldest first.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Gap-filled prices, oldest first.
    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    /// Number of observations after gap filling.
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Whether the series holds no observations.
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// The most recent `n` prices, or `None` if the series is shorter than `n`.
    pub fn tail(&self, n: usize) -> Option<&[f64]> {
        self.prices.len().checked_sub(n).map(|start| &self.prices[start..])
    }
}

fn fill_gaps(raw: &[Option<f64>]) -> Vec<f64> {
    let mut filled = Vec::with_capacity(raw.len());
    let mut last_known: Option<(usize, f64)> = None;

    for (i, value) in raw.iter().enumerate() {
        match value {
            Some(v) => {
                if let Some((j, prev)) = last_known
                    && i > j + 1
                {
                    let span = (i - j) as f64;
                    for k in (j + 1)..i {
                        let frac = (k - j) as f64 / span;
                        filled[k] = prev + (v - prev) * frac;
                    }
                }
                filled.push(*v);
                last_known = Some((i, *v));
            }
            // Placeholder; overwritten by interpolation if a later observation exists.
            None => filled.push(last_known.map_or(f64::NAN, |(_, v)| v)),
        }
    }

    filled
}

/// Why an asset was dropped from the universe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExclusionReason {
    /// The provider could not deliver a history for the symbol.
    FetchFailed(String),
    /// The gap-filled history is shorter than the lookback window.
    TooShort {
        /// Observations required by the lookback window.
        required: usize,
        /// Observations available after gap filling.
        available: usize,
    },
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FetchFailed(msg) => write!(f, "fetch failed: {msg}"),
            Self::TooShort {
                required,
                available,
            } => write!(
                f,
                "history too short: {available} observations, {required} required"
            ),
        }
    }
}

/// A symbol excluded from estimation, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusion {
    /// The excluded symbol.
    pub symbol: Symbol,
    /// Why it was excluded.
    pub reason: ExclusionReason,
}

impl Exclusion {
    /// Creates a new exclusion record.
    pub fn new(symbol: impl Into<Symbol>, reason: ExclusionReason) -> Self {
        Self {
            symbol: symbol.into(),
            reason,
        }
    }
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.symbol, self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn day(d: u32) -> Date {
        Date::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_interior_gap_is_interpolated() {
        let series = PriceSeries::from_points(
            "VTI",
            vec![
                PricePoint::new(day(1), 100.0),
                PricePoint::missing(day(2)),
                PricePoint::missing(day(3)),
                PricePoint::new(day(4), 106.0),
            ],
        );

        assert_eq!(series.len(), 4);
        assert_relative_eq!(series.prices()[1], 102.0);
        assert_relative_eq!(series.prices()[2], 104.0);
    }

    #[test]
    fn test_leading_gaps_dropped_trailing_forward_filled() {
        let series = PriceSeries::from_points(
            "VTI",
            vec![
                PricePoint::missing(day(1)),
                PricePoint::new(day(2), 50.0),
                PricePoint::new(day(3), 51.0),
                PricePoint {
                    date: day(4),
                    close: Some(f64::NAN),
                },
            ],
        );

        assert_eq!(series.dates(), &[day(2), day(3), day(4)]);
        assert_eq!(series.prices(), &[50.0, 51.0, 51.0]);
    }

    #[test]
    fn test_unsorted_and_duplicate_dates() {
        let series = PriceSeries::from_points(
            "QQQ",
            vec![
                PricePoint::new(day(3), 3.0),
                PricePoint::new(day(1), 1.0),
                PricePoint::new(day(2), 2.0),
                PricePoint::new(day(2), 2.5),
            ],
        );

        assert_eq!(series.prices(), &[1.0, 2.5, 3.0]);
    }

    #[test]
    fn test_non_positive_price_is_a_gap() {
        let series = PriceSeries::from_points(
            "QQQ",
            vec![
                PricePoint::new(day(1), 10.0),
                PricePoint::new(day(2), 0.0),
                PricePoint::new(day(3), 20.0),
            ],
        );

        assert_eq!(series.prices(), &[10.0, 15.0, 20.0]);
    }

    #[test]
    fn test_all_missing_is_empty() {
        let series = PriceSeries::from_points(
            "BAD",
            vec![PricePoint::missing(day(1)), PricePoint::missing(day(2))],
        );
        assert!(series.is_empty());
        assert!(series.tail(1).is_none());
    }

    #[test]
    fn test_tail() {
        let series = PriceSeries::from_prices("VTI", day(1), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(series.tail(2), Some(&[3.0, 4.0][..]));
        assert_eq!(series.tail(4).map(<[f64]>::len), Some(4));
        assert!(series.tail(5).is_none());
    }

    #[test]
    fn test_exclusion_display() {
        let exclusion = Exclusion::new(
            "VTI",
            ExclusionReason::TooShort {
                required: 504,
                available: 300,
            },
        );
        assert_eq!(
            exclusion.to_string(),
            "VTI: history too short: 300 observations, 504 required"
        );
    }
}
