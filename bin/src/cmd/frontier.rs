//! Frontier command implementation.

use crate::{RunArgs, data};
use anyhow::{Context, Result};
use markowitz_optimize::{FrontierAnalyzer, FrontierSweeper, FrontierTable, RunConfig, Tangency};
use markowitz_traits::{MarkowitzError, Symbol};
use polars::prelude::{CsvWriter, SerWriter};
use serde::Serialize;
use std::{fs::File, path::Path};

/// Machine-readable result of a frontier run.
#[derive(Debug, Serialize)]
struct FrontierReport<'a> {
    config: &'a RunConfig,
    universe: &'a [Symbol],
    excluded: Vec<String>,
    frontier: &'a FrontierTable,
    tangency: Option<Tangency>,
}

/// Sweep the efficient frontier and report the tangency portfolio.
pub(crate) async fn run_frontier(
    config: &RunConfig,
    args: &RunArgs,
    output: Option<&Path>,
    json: bool,
) -> Result<()> {
    config.validate()?;
    let symbols = data::resolve_symbols(args)?;

    if !json {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Efficient Frontier                        ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Symbols:   {}", symbols.join(", "));
        println!("Lookback:  {} years", config.years);
        println!("Principal: ${:.2}", config.principal);
        println!(
            "Targets:   {:.2}% to {:.2}% by {:.2}%",
            config.base_return * 100.0,
            config.desired_return * 100.0,
            config.step_size * 100.0
        );
    }

    let estimate = data::load_estimate(config, &symbols).await?;
    if !json {
        println!("Universe:  {}", estimate.universe.symbols().join(", "));
        data::print_exclusions(&estimate);
    }

    let table = FrontierSweeper::new().sweep(
        config.base_return,
        config.desired_return,
        config.step_size,
        &estimate.returns,
        &estimate.covariance,
        &estimate.universe,
        config.principal,
    )?;
    let pruned = table.pruned();

    let tangency = match FrontierAnalyzer::new().analyze(&table, config.risk_free_rate) {
        Ok(tangency) => Some(tangency),
        Err(MarkowitzError::InsufficientData(reason)) => {
            tracing::warn!(%reason, "frontier too short for a tangency fit");
            None
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(path) = output {
        let mut df = pruned.to_dataframe()?;
        let mut file =
            File::create(path).with_context(|| format!("creating {}", path.display()))?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(path = %path.display(), rows = df.height(), "wrote frontier table");
    }

    if json {
        let report = FrontierReport {
            config,
            universe: estimate.universe.symbols(),
            excluded: estimate.excluded.iter().map(ToString::to_string).collect(),
            frontier: &pruned,
            tangency,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_table(&pruned);
    print_tangency(tangency.as_ref(), config.risk_free_rate);

    if let Some(path) = output {
        println!("\nFrontier table written to {}", path.display());
    }
    println!();

    Ok(())
}

fn print_table(table: &FrontierTable) {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("FRONTIER ({} portfolios)", table.len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    if table.is_empty() {
        println!("No feasible portfolio in the requested return range.");
        return;
    }

    print!("{:>8} {:>8}", "Return", "Risk");
    for symbol in &table.symbols {
        print!(" {:>10}", symbol);
    }
    println!();
    println!("{}", "─".repeat(17 + 11 * table.symbols.len()));

    for row in &table.rows {
        print!(
            "{:>7.2}% {:>8.4}",
            row.expected_return * 100.0,
            row.risk
        );
        for amount in &row.amounts {
            print!(" {:>10.2}", amount);
        }
        println!();
    }
}

fn print_tangency(tangency: Option<&Tangency>, risk_free_rate: f64) {
    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("TANGENCY (risk-free rate {:.2}%)", risk_free_rate * 100.0);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    let Some(tangency) = tangency else {
        println!("Not enough feasible portfolios to fit the frontier.");
        return;
    };

    let fit = tangency.fit();
    println!(
        "Fit:      return = {:.4} + {:.4}·risk + {:.4}·risk²",
        fit.a, fit.b, fit.c
    );

    match tangency.point() {
        Some(point) => {
            println!("Risk:     {:.4}", point.risk);
            println!("Return:   {:.2}%", point.expected_return * 100.0);
            if let Some(sharpe) = point.sharpe_ratio() {
                println!("Sharpe:   {:.3}", sharpe);
            }
        }
        None => println!("No real tangency: the capital allocation line never touches the fit."),
    }
}
