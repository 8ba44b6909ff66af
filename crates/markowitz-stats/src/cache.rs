//! Per-run price-history cache.
//!
//! A [`PriceCache`] holds one typed fetch outcome per symbol for the
//! lifetime of a single optimization run. It is passed explicitly to the
//! estimator; nothing is cached process-wide.

use markowitz_traits::{ExclusionReason, PriceHistoryProvider, PriceSeries, Symbol};
use std::collections::BTreeMap;

/// Fetch outcome for one symbol.
pub type FetchOutcome = Result<PriceSeries, ExclusionReason>;

/// A cached outcome and the lookback it was fetched for.
#[derive(Debug, Clone)]
struct CacheEntry {
    /// `None` for entries seeded without a fetch; they serve any lookback.
    years: Option<u32>,
    outcome: FetchOutcome,
}

/// Price histories fetched for one run, keyed by symbol.
#[derive(Debug, Clone, Default)]
pub struct PriceCache {
    entries: BTreeMap<Symbol, CacheEntry>,
}

impl PriceCache {
    /// Creates an empty cache.
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Fetches `symbols` from `provider`, skipping symbols already cached
    /// for at least `years` of history.
    ///
    /// Provider failures are stored as [`ExclusionReason::FetchFailed`]
    /// rather than returned; this never fails as a whole.
    pub async fn populate<P: PriceHistoryProvider>(
        &mut self,
        provider: &P,
        symbols: &[Symbol],
        years: u32,
    ) {
        for symbol in symbols {
            if self.covers(symbol, years) {
                continue;
            }
            let outcome = match provider.price_history(symbol, years).await {
                Ok(points) => Ok(PriceSeries::from_points(symbol.clone(), points)),
                Err(e) => {
                    tracing::warn!(symbol = %symbol, provider = provider.name(), error = %e, "price history unavailable");
                    Err(ExclusionReason::FetchFailed(e.to_string()))
                }
            };
            self.entries.insert(
                symbol.clone(),
                CacheEntry {
                    years: Some(years),
                    outcome,
                },
            );
        }
    }

    /// Whether `symbol` is cached for a lookback of `years` or longer.
    fn covers(&self, symbol: &str, years: u32) -> bool {
        self.entries
            .get(symbol)
            .is_some_and(|entry| entry.years.is_none_or(|cached| cached >= years))
    }

    /// Seeds the cache with an already-built series.
    pub fn insert_series(&mut self, series: PriceSeries) {
        self.entries.insert(
            series.symbol().to_string(),
            CacheEntry {
                years: None,
                outcome: Ok(series),
            },
        );
    }

    /// Records a failed fetch for `symbol`.
    pub fn insert_failure(&mut self, symbol: impl Into<Symbol>, reason: impl Into<String>) {
        self.entries.insert(
            symbol.into(),
            CacheEntry {
                years: None,
                outcome: Err(ExclusionReason::FetchFailed(reason.into())),
            },
        );
    }

    /// Looks up the outcome for `symbol`.
    ///
    /// A symbol that was never fetched reports as a fetch failure.
    pub fn get(&self, symbol: &str) -> Result<&PriceSeries, ExclusionReason> {
        match self.entries.get(symbol).map(|entry| &entry.outcome) {
            Some(Ok(series)) => Ok(series),
            Some(Err(reason)) => Err(reason.clone()),
            None => Err(ExclusionReason::FetchFailed(format!(
                "{symbol} was not fetched for this run"
            ))),
        }
    }

    /// Number of cached outcomes (successful or not).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use markowitz_traits::{Date, MarkowitzError, PricePoint};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
    }

    impl PriceHistoryProvider for CountingProvider {
        async fn price_history(
            &self,
            symbol: &str,
            _years: u32,
        ) -> markowitz_traits::Result<Vec<PricePoint>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if symbol == "DELISTED" {
                return Err(MarkowitzError::DataFetch("404".to_string()));
            }
            let start = Date::from_ymd_opt(2024, 1, 1).unwrap();
            Ok(vec![PricePoint::new(start, 10.0)])
        }
    }

    #[tokio::test]
    async fn test_populate_records_typed_outcomes() {
        let provider = CountingProvider {
            calls: AtomicUsize::new(0),
        };
        let mut cache = PriceCache::new();
        let symbols = vec!["VTI".to_string(), "DELISTED".to_string()];

        cache.populate(&provider, &symbols, 1).await;
        cache.populate(&provider, &symbols, 1).await;

        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("VTI").unwrap().len(), 1);
        assert!(matches!(
            cache.get("DELISTED"),
            Err(ExclusionReason::FetchFailed(_))
        ));
    }

    #[test]
    fn test_unfetched_symbol_is_fetch_failure() {
        let cache = PriceCache::new();
        assert!(cache.is_empty());
        assert!(matches!(
            cache.get("QQQ"),
            Err(ExclusionReason::FetchFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_longer_lookback_refetches() {
        let provider = CountingProvider {
            calls: AtomicUsize::new(0),
        };
        let mut cache = PriceCache::new();
        let symbols = vec!["VTI".to_string()];

        cache.populate(&provider, &symbols, 2).await;
        cache.populate(&provider, &symbols, 1).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        cache.populate(&provider, &symbols, 5).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        cache.populate(&provider, &symbols, 3).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_seeded_entries_are_not_refetched() {
        let provider = CountingProvider {
            calls: AtomicUsize::new(0),
        };
        let mut cache = PriceCache::new();
        cache.insert_failure("GONE", "404");

        cache.populate(&provider, &["GONE".to_string()], 10).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }
}
