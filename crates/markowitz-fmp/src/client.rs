//! FMP API client implementation.

use crate::{Result, error::FmpError, types::HistoricalPrice};
use chrono::{Duration, NaiveDate, Utc};
use markowitz_traits::{PriceHistoryProvider, PricePoint};
use reqwest::Client;
use std::env;

/// Base URL for the FMP stable API.
const FMP_BASE_URL: &str = "https://financialmodelingprep.com/stable";

/// Calendar days requested beyond the lookback to cover holidays and listing gaps.
const CALENDAR_BUFFER_DAYS: i64 = 30;

/// Financial Modeling Prep API client.
#[derive(Debug, Clone)]
pub struct FmpClient {
    client: Client,
    api_key: String,
}

impl FmpClient {
    /// Create a new FMP client with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Create a new FMP client from the `FMP_API_KEY` environment variable.
    ///
    /// This will also load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment variable is not set.
    pub fn from_env() -> Result<Self> {
        // Try to load .env file (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_key = env::var("FMP_API_KEY").map_err(|_| FmpError::MissingApiKey)?;

        Ok(Self::new(api_key))
    }

    /// Build a URL with the API key.
    fn url(&self, endpoint: &str) -> String {
        if endpoint.contains('?') {
            format!("{FMP_BASE_URL}/{endpoint}&apikey={}", self.api_key)
        } else {
            format!("{FMP_BASE_URL}/{endpoint}?apikey={}", self.api_key)
        }
    }

    /// Make a GET request and parse the JSON response.
    async fn get<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = self.url(endpoint);
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FmpError::RateLimitExceeded);
        }

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(FmpError::Api(format!("HTTP {status}: {text}")));
        }

        let text = response.text().await?;

        // Check for error responses
        if text.contains("\"Error Message\"") || text.contains("\"error\"") {
            return Err(FmpError::Api(text));
        }

        Ok(serde_json::from_str(&text)?)
    }

    /// Get historical daily prices for a symbol.
    ///
    /// # Arguments
    ///
    /// * `symbol` - Ticker symbol
    /// * `from` - Start date (inclusive)
    /// * `to` - End date (inclusive)
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or no rows come back.
    pub async fn historical_prices(
        &self,
        symbol: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<HistoricalPrice>> {
        let endpoint = format!(
            "historical-price-eod/dividend-adjusted?symbol={}{}",
            symbol.to_uppercase(),
            date_params(from, to)
        );
        // The stable API returns a flat array, not a wrapped response
        let prices: Vec<HistoricalPrice> = self.get(&endpoint).await?;
        if prices.is_empty() {
            return Err(FmpError::NoData(symbol.to_uppercase()));
        }
        Ok(prices)
    }
}

fn date_params(from: Option<NaiveDate>, to: Option<NaiveDate>) -> String {
    let mut params = String::new();
    if let Some(f) = from {
        params.push_str(&format!("&from={}", f.format("%Y-%m-%d")));
    }
    if let Some(t) = to {
        params.push_str(&format!("&to={}", t.format("%Y-%m-%d")));
    }
    params
}

/// First calendar date needed to cover `years` of trading history ending `today`.
fn lookback_start(today: NaiveDate, years: u32) -> NaiveDate {
    today - Duration::days(i64::from(years) * 365 + CALENDAR_BUFFER_DAYS)
}

impl PriceHistoryProvider for FmpClient {
    async fn price_history(
        &self,
        symbol: &str,
        years: u32,
    ) -> markowitz_traits::Result<Vec<PricePoint>> {
        let today = Utc::now().date_naive();
        let rows = self
            .historical_prices(symbol, Some(lookback_start(today, years)), Some(today))
            .await?;

        let points: Vec<PricePoint> = rows
            .iter()
            .filter_map(HistoricalPrice::to_price_point)
            .collect();
        tracing::debug!(symbol, rows = rows.len(), parsed = points.len(), "fetched FMP history");
        Ok(points)
    }

    fn name(&self) -> &str {
        "fmp"
    }
}
