//! Markowitz CLI binary.
//!
//! Provides a command-line interface for the Markowitz portfolio optimizer.

mod cmd;
mod data;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::{path::PathBuf, process};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "markowitz")]
#[command(about = "Mean-variance portfolio optimization", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON file with run parameters; flags override its values
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct RunArgs {
    /// Ticker symbols
    #[arg(short, long, value_delimiter = ',')]
    pub(crate) symbols: Vec<String>,

    /// JSON file of candidates (`symbol`, `marketCap`, `expenseRatio`) to screen
    #[arg(long)]
    pub(crate) candidates: Option<PathBuf>,

    /// Lookback window in years
    #[arg(short, long)]
    pub(crate) years: Option<u32>,

    /// Capital to allocate
    #[arg(short, long)]
    pub(crate) principal: Option<f64>,

    /// Expected-return override, e.g. `BND=0.03` (repeatable)
    #[arg(long = "override", value_name = "SYMBOL=RETURN")]
    pub(crate) overrides: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sweep the efficient frontier and find the tangency portfolio
    Frontier {
        #[command(flatten)]
        run: RunArgs,

        /// First target return
        #[arg(long)]
        base: Option<f64>,

        /// Last target return
        #[arg(long)]
        desired: Option<f64>,

        /// Target-return step
        #[arg(long)]
        step: Option<f64>,

        /// Risk-free rate for the tangency portfolio
        #[arg(long)]
        risk_free_rate: Option<f64>,

        /// Write the frontier table as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print a JSON report instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Minimum-variance allocation for one target return
    Allocate {
        /// Target annual return
        target: f64,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Show estimated returns and volatilities
    Estimate {
        #[command(flatten)]
        run: RunArgs,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "markowitz=debug"
    } else {
        "markowitz=info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = data::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Frontier {
            run,
            base,
            desired,
            step,
            risk_free_rate,
            output,
            json,
        } => {
            let mut config = data::merge_run_args(config, &run)?;
            if let Some(base) = base {
                config.base_return = base;
            }
            if let Some(desired) = desired {
                config.desired_return = desired;
            }
            if let Some(step) = step {
                config.step_size = step;
            }
            if let Some(rate) = risk_free_rate {
                config.risk_free_rate = rate;
            }
            cmd::frontier::run_frontier(&config, &run, output.as_deref(), json).await?;
        }
        Commands::Allocate { target, run } => {
            let config = data::merge_run_args(config, &run)?;
            cmd::allocate::run_allocate(&config, &run, target).await?;
        }
        Commands::Estimate { run } => {
            let config = data::merge_run_args(config, &run)?;
            cmd::estimate::run_estimate(&config, &run).await?;
        }
    }

    Ok(())
}
