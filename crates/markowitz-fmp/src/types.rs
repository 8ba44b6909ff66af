//! Data types for FMP API responses.

use chrono::NaiveDate;
use markowitz_traits::PricePoint;
use serde::{Deserialize, Serialize};

/// Historical end-of-day price from FMP.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalPrice {
    /// Date (YYYY-MM-DD).
    pub date: String,
    /// Close price.
    #[serde(default)]
    pub close: Option<f64>,
    /// Adjusted close.
    #[serde(default)]
    pub adj_close: Option<f64>,
    /// Volume.
    #[serde(default)]
    pub volume: Option<f64>,
}

impl HistoricalPrice {
    /// Parse the date string into a NaiveDate.
    #[must_use]
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }

    /// Converts to a [`PricePoint`], preferring the adjusted close.
    ///
    /// Returns `None` if the date cannot be parsed.
    #[must_use]
    pub fn to_price_point(&self) -> Option<PricePoint> {
        Some(PricePoint {
            date: self.parsed_date()?,
            close: self.adj_close.or(self.close),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_eod_payload() {
        let json = r#"[
            {"symbol":"VTI","date":"2024-03-04","open":250.1,"close":251.0,"adjClose":249.5,"volume":3100000},
            {"symbol":"VTI","date":"2024-03-01","close":250.0},
            {"symbol":"VTI","date":"not-a-date","close":1.0}
        ]"#;
        let prices: Vec<HistoricalPrice> = serde_json::from_str(json).unwrap();
        assert_eq!(prices.len(), 3);

        let first = prices[0].to_price_point().unwrap();
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(first.close, Some(249.5));

        // Falls back to the unadjusted close.
        assert_eq!(prices[1].to_price_point().unwrap().close, Some(250.0));
        assert!(prices[2].to_price_point().is_none());
    }
}
