//! Estimate command implementation.

use crate::{RunArgs, data};
use anyhow::Result;
use markowitz_optimize::RunConfig;
use markowitz_traits::TRADING_DAYS_PER_YEAR;

/// Print the estimated return vector and annualized volatilities.
pub(crate) async fn run_estimate(config: &RunConfig, args: &RunArgs) -> Result<()> {
    config.validate()?;
    let symbols = data::resolve_symbols(args)?;

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Return Estimates                          ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let estimate = data::load_estimate(config, &symbols).await?;
    data::print_exclusions(&estimate);
    let annualize = (TRADING_DAYS_PER_YEAR as f64).sqrt();

    println!("{:<10} {:>10} {:>12} {:>10}", "Symbol", "Return", "Volatility", "Override");
    println!("{}", "─".repeat(45));
    for (i, symbol) in estimate.universe.iter().enumerate() {
        let variance = estimate.covariance[[i, i]];
        let overridden = if config.return_overrides.contains_key(symbol) {
            "yes"
        } else {
            ""
        };
        println!(
            "{:<10} {:>9.2}% {:>11.2}% {:>10}",
            symbol,
            estimate.returns[i] * 100.0,
            annualize * variance.max(0.0).sqrt() * 100.0,
            overridden
        );
    }
    println!();

    Ok(())
}
