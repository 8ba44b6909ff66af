//! Portfolio construction for the Markowitz optimizer.
//!
//! This crate turns the statistics pair (expected returns and covariance)
//! into portfolios:
//!
//! - **Allocation**: long-only minimum-variance weights for one target return
//! - **Sweep**: the efficient frontier over a grid of target returns, solved in parallel
//! - **Analysis**: quadratic fit of the frontier and the tangency portfolio
//!
//! # Examples
//!
//! ```rust,no_run
//! use markowitz_optimize::{FrontierAnalyzer, FrontierSweeper};
//! use markowitz_traits::AssetUniverse;
//! use ndarray::array;
//!
//! let universe: AssetUniverse = ["VTI", "BND", "VXUS"].into_iter().collect();
//! let returns = array![0.05, 0.10, 0.08];
//! let covariance = array![[0.01, 0.0, 0.0], [0.0, 0.04, 0.0], [0.0, 0.0, 0.02]];
//!
//! let table = FrontierSweeper::new()
//!     .sweep(0.0, 0.10, 0.01, &returns, &covariance, &universe, 10_000.0)
//!     .unwrap();
//! let tangency = FrontierAnalyzer::new().analyze(&table, 0.04).unwrap();
//! println!("{:?}", tangency.point());
//! ```

mod allocation;
mod analyze;
mod config;
mod frontier;
mod sweep;

pub use allocation::{Allocation, AllocationOutcome, AllocationSolver, AssetAllocation, QpError};
pub use analyze::{CurveFit, FrontierAnalyzer, Tangency, TangencyPoint, quadratic_roots};
pub use config::RunConfig;
pub use frontier::{FrontierRow, FrontierTable, MIN_ALLOCATION_SHARE};
pub use sweep::{FrontierSweeper, MAX_GRID_POINTS};
