//! Data loading utilities for the Markowitz CLI.

use crate::RunArgs;
use anyhow::{Context, Result, anyhow, bail};
use markowitz_fmp::FmpClient;
use markowitz_optimize::RunConfig;
use markowitz_stats::{Estimate, PriceCache, StatisticsEstimator};
use markowitz_traits::{Candidate, CandidateFilter, Symbol};
use std::{fs, path::Path};

/// Reads run parameters from a JSON file, or the defaults without one.
pub(crate) fn load_config(path: Option<&Path>) -> Result<RunConfig> {
    let Some(path) = path else {
        return Ok(RunConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

/// Applies command-line flags on top of `config`.
pub(crate) fn merge_run_args(mut config: RunConfig, args: &RunArgs) -> Result<RunConfig> {
    if let Some(years) = args.years {
        config.years = years;
    }
    if let Some(principal) = args.principal {
        config.principal = principal;
    }
    for pair in &args.overrides {
        let (symbol, value) = parse_override(pair)?;
        config.return_overrides.insert(symbol, value);
    }
    Ok(config)
}

/// Parses `SYMBOL=RETURN`.
pub(crate) fn parse_override(pair: &str) -> Result<(Symbol, f64)> {
    let (symbol, value) = pair
        .split_once('=')
        .ok_or_else(|| anyhow!("override must look like SYMBOL=RETURN, got {pair:?}"))?;
    let symbol = symbol.trim();
    if symbol.is_empty() {
        bail!("override {pair:?} has no symbol");
    }
    let value: f64 = value
        .trim()
        .parse()
        .with_context(|| format!("override {pair:?} has no numeric return"))?;
    Ok((symbol.to_uppercase(), value))
}

/// Reads a JSON array of candidates.
pub(crate) fn load_candidates(path: &Path) -> Result<Vec<Candidate>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading candidates {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing candidates {}", path.display()))
}

/// Explicit symbols followed by screened candidates, deduplicated.
pub(crate) fn resolve_symbols(args: &RunArgs) -> Result<Vec<Symbol>> {
    let mut symbols: Vec<Symbol> = args
        .symbols
        .iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();

    if let Some(path) = &args.candidates {
        let candidates = load_candidates(path)?;
        let screened = CandidateFilter::default().apply(&candidates);
        tracing::info!(
            candidates = candidates.len(),
            screened = screened.len(),
            "screened candidate list"
        );
        symbols.extend(screened);
    }

    let mut seen = std::collections::HashSet::new();
    symbols.retain(|s| seen.insert(s.clone()));

    if symbols.is_empty() {
        bail!("no symbols given; pass --symbols or --candidates");
    }
    Ok(symbols)
}

/// Fetches price histories from FMP and estimates the statistics pair.
pub(crate) async fn load_estimate(config: &RunConfig, symbols: &[Symbol]) -> Result<Estimate> {
    let client = FmpClient::from_env()?;

    tracing::info!(
        years = config.years,
        symbols = symbols.len(),
        "fetching price histories"
    );
    let mut cache = PriceCache::new();
    cache.populate(&client, symbols, config.years).await;

    let estimate = StatisticsEstimator::default()
        .estimate(&cache, symbols, config.years)?
        .with_return_overrides(&config.return_overrides);
    Ok(estimate)
}

/// Prints the symbols the estimator dropped and any covariance sanitization.
pub(crate) fn print_exclusions(estimate: &Estimate) {
    if !estimate.excluded.is_empty() {
        println!("\nExcluded:");
        for exclusion in &estimate.excluded {
            println!("  {exclusion}");
        }
    }
    if estimate.sanitized_entries > 0 {
        println!(
            "\nNote: {} non-finite covariance entries were replaced by 1.0",
            estimate.sanitized_entries
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_override() {
        let (symbol, value) = parse_override("bnd=0.03").unwrap();
        assert_eq!(symbol, "BND");
        assert_eq!(value, 0.03);

        assert!(parse_override("BND").is_err());
        assert!(parse_override("=0.03").is_err());
        assert!(parse_override("BND=abc").is_err());
    }

    #[test]
    fn test_merge_run_args() {
        let args = RunArgs {
            years: Some(3),
            overrides: vec!["VTI=0.07".to_string()],
            ..Default::default()
        };
        let config = merge_run_args(RunConfig::default(), &args).unwrap();
        assert_eq!(config.years, 3);
        assert_eq!(config.principal, 10_000.0);
        assert_eq!(config.return_overrides.get("VTI"), Some(&0.07));
    }

    #[test]
    fn test_load_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"principal": 50000, "step_size": 0.02}}"#).unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.principal, 50_000.0);
        assert_eq!(config.step_size, 0.02);
        assert_eq!(config.years, 5);

        assert_eq!(load_config(None).unwrap(), RunConfig::default());
    }

    #[test]
    fn test_resolve_symbols_screens_candidates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"symbol": "VTI", "marketCap": 3.0e11, "expenseRatio": 0.0003}},
                {{"symbol": "TINY", "marketCap": 5.0e7, "expenseRatio": 0.001}},
                {{"symbol": "PRICY", "marketCap": 2.0e9, "expenseRatio": 0.0075}},
                {{"symbol": "BND", "marketCap": 1.0e11, "expenseRatio": 0.0003}}
            ]"#
        )
        .unwrap();

        let args = RunArgs {
            symbols: vec!["bnd".to_string(), "QQQ".to_string()],
            candidates: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let symbols = resolve_symbols(&args).unwrap();
        assert_eq!(symbols, vec!["BND", "QQQ", "VTI"]);
    }

    #[test]
    fn test_resolve_symbols_requires_input() {
        assert!(resolve_symbols(&RunArgs::default()).is_err());
    }
}
