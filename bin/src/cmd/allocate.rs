//! Allocate command implementation.

use crate::{RunArgs, data};
use anyhow::Result;
use markowitz_optimize::{AllocationOutcome, AllocationSolver, RunConfig};

/// Solve the minimum-variance allocation for one target return.
pub(crate) async fn run_allocate(config: &RunConfig, args: &RunArgs, target: f64) -> Result<()> {
    config.validate()?;
    let symbols = data::resolve_symbols(args)?;

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Portfolio Allocation                      ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Symbols:   {}", symbols.join(", "));
    println!("Target:    {:.2}%", target * 100.0);
    println!("Principal: ${:.2}", config.principal);

    let estimate = data::load_estimate(config, &symbols).await?;
    data::print_exclusions(&estimate);

    let outcome = AllocationSolver::new().solve(
        target,
        &estimate.returns,
        &estimate.covariance,
        &estimate.universe,
        config.principal,
    )?;

    let allocation = match outcome {
        AllocationOutcome::Feasible(allocation) => allocation,
        AllocationOutcome::Infeasible { reason, .. } => {
            println!(
                "No feasible portfolio reaches {:.2}% ({reason}).",
                target * 100.0
            );
            println!("Expected returns of the universe:");
            for (symbol, ret) in estimate.universe.iter().zip(estimate.returns.iter()) {
                println!("  {:<10} {:>7.2}%", symbol, ret * 100.0);
            }
            println!();
            return Ok(());
        }
    };

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("ALLOCATION");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    println!("{:<10} {:>10} {:>14}", "Symbol", "Weight", "Amount");
    println!("{}", "─".repeat(36));
    for asset in &allocation.assets {
        println!(
            "{:<10} {:>10.3} {:>14.2}",
            asset.symbol,
            asset.rounded_weight(),
            asset.amount
        );
    }
    println!("{}", "─".repeat(36));
    println!(
        "{:<10} {:>10.3} {:>14.2}",
        "Total",
        allocation.weights().sum(),
        allocation.amounts().sum()
    );

    println!(
        "\nExpected return: {:.2}%",
        allocation.expected_return(&estimate.returns) * 100.0
    );
    println!(
        "Annualized risk: {:.4}",
        allocation.annualized_risk(&estimate.covariance)
    );
    println!();

    Ok(())
}
