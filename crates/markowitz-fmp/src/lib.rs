//! Financial Modeling Prep (FMP) price-history provider for Markowitz.
//!
//! This crate provides a client for fetching dividend-adjusted daily prices
//! from the [Financial Modeling Prep](https://financialmodelingprep.com/) API
//! and exposes it through [`markowitz_traits::PriceHistoryProvider`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use markowitz_fmp::FmpClient;
//! use markowitz_traits::PriceHistoryProvider;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FmpClient::from_env()?;
//!
//!     // Five years of adjusted closes
//!     let points = client.price_history("VTI", 5).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Environment Variables
//!
//! Set `FMP_API_KEY` in your environment or `.env` file:
//!
//! ```bash
//! FMP_API_KEY=your_api_key_here
//! ```

mod client;
mod error;
mod types;

pub use client::FmpClient;
pub use error::FmpError;
pub use types::HistoricalPrice;

/// Result type for FMP operations.
pub type Result<T> = std::result::Result<T, FmpError>;
