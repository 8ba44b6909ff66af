//! Minimum-variance allocation for a single target return.

use clarabel::algebra::CscMatrix;
use markowitz_traits::{
    AssetUniverse, MarkowitzError, Result, Symbol, TRADING_DAYS_PER_YEAR,
    numeric::{round_to, sanitize_non_finite},
};
use nalgebra::DMatrix;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of equality constraints (target return, full investment).
const EQUALITY_CONSTRAINTS: usize = 2;

/// Largest constraint residual accepted from the solver.
const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// Relative tolerance on the smallest covariance eigenvalue.
const PSD_TOLERANCE: f64 = 1e-10;

/// Interior-point iteration cap.
const MAX_ITERATIONS: u32 = 200;

/// Reasons the quadratic program produced no portfolio.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QpError {
    /// The covariance has a negative eigenvalue.
    #[error("covariance is not positive semidefinite")]
    NotPositiveSemidefinite,

    /// No long-only, fully invested portfolio reaches the target.
    #[error("constraints are infeasible")]
    Infeasible,

    /// The solver stopped on its iteration or time limit.
    #[error("solver stopped early: {0}")]
    IterationLimit(String),

    /// The solver ended in a numerical failure.
    #[error("solver failed: {0}")]
    Numerical(String),

    /// The problem could not be handed to the solver.
    #[error("solver setup failed: {0}")]
    Setup(String),
}

/// One asset's share of an allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetAllocation {
    /// Asset symbol.
    pub symbol: Symbol,
    /// Weight as returned by the quadratic solver.
    pub raw_weight: f64,
    /// Non-negative weight; the weights of an allocation sum to 1.
    ///
    /// Stored unrounded; see [`AssetAllocation::rounded_weight`] for the 3-decimal value.
    pub weight: f64,
    /// Dollar amount, `weight × principal`.
    pub amount: f64,
}

impl AssetAllocation {
    /// Weight rounded to 3 decimals for presentation.
    pub fn rounded_weight(&self) -> f64 {
        round_to(self.weight, 3)
    }
}

/// Per-asset weights and dollar amounts for one target return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// Target return the allocation was solved for.
    pub target_return: f64,
    /// Capital allocated.
    pub principal: f64,
    /// One entry per universe member, in universe order.
    pub assets: Vec<AssetAllocation>,
}

impl Allocation {
    /// The all-zero allocation that signals "no feasible portfolio".
    pub fn zero(universe: &AssetUniverse, target_return: f64, principal: f64) -> Self {
        Self {
            target_return,
            principal,
            assets: universe
                .iter()
                .map(|symbol| AssetAllocation {
                    symbol: symbol.clone(),
                    raw_weight: 0.0,
                    weight: 0.0,
                    amount: 0.0,
                })
                .collect(),
        }
    }

    /// Whether every weight and amount is zero.
    pub fn is_zero(&self) -> bool {
        self.assets
            .iter()
            .all(|a| a.raw_weight == 0.0 && a.weight == 0.0 && a.amount == 0.0)
    }

    /// Normalized weights in universe order.
    pub fn weights(&self) -> Array1<f64> {
        self.assets.iter().map(|a| a.weight).collect()
    }

    /// Dollar amounts in universe order.
    pub fn amounts(&self) -> Array1<f64> {
        self.assets.iter().map(|a| a.amount).collect()
    }

    /// Expected annual return `w · returns`.
    pub fn expected_return(&self, returns: &Array1<f64>) -> f64 {
        self.weights().dot(returns)
    }

    /// Annualized risk `√252 · √(wᵀ Σ w)` for a daily covariance `Σ`.
    pub fn annualized_risk(&self, covariance: &Array2<f64>) -> f64 {
        let w = self.weights();
        let variance = w.dot(&covariance.dot(&w)).max(0.0);
        (TRADING_DAYS_PER_YEAR as f64).sqrt() * variance.sqrt()
    }
}

/// Result of one allocation solve.
#[derive(Debug, Clone, PartialEq)]
pub enum AllocationOutcome {
    /// The quadratic program was solved.
    Feasible(Allocation),
    /// No feasible portfolio exists (or the solve failed); carries the zero sentinel.
    Infeasible {
        /// The all-zero allocation.
        sentinel: Allocation,
        /// Why the solve produced no portfolio.
        reason: QpError,
    },
}

impl AllocationOutcome {
    /// Whether a portfolio was found.
    pub const fn is_feasible(&self) -> bool {
        matches!(self, Self::Feasible(_))
    }

    /// Borrows the allocation (the sentinel when infeasible).
    pub const fn allocation(&self) -> &Allocation {
        match self {
            Self::Feasible(allocation) => allocation,
            Self::Infeasible { sentinel, .. } => sentinel,
        }
    }

    /// Returns the allocation (the sentinel when infeasible).
    pub fn into_allocation(self) -> Allocation {
        match self {
            Self::Feasible(allocation) => allocation,
            Self::Infeasible { sentinel, .. } => sentinel,
        }
    }
}

/// Solves the long-only, fully invested minimum-variance portfolio for a target return.
///
/// The program is
///
/// ```text
/// minimize    ½ wᵀ Σ w
/// subject to  w · returns = target
///             Σ w = 1
///             w ≥ 0
/// ```
///
/// and is handed to Clarabel's interior-point solver. Non-finite
/// covariance entries are replaced by 1.0 before solving. Solver weights
/// `s` are normalized as `|s| / ‖s‖₂`, then rescaled to sum to one.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationSolver;

impl AllocationSolver {
    /// Creates a solver.
    pub const fn new() -> Self {
        Self
    }

    /// Solves for `target_return`.
    ///
    /// Infeasible targets and solver failures yield
    /// [`AllocationOutcome::Infeasible`]; they are not errors.
    ///
    /// # Errors
    ///
    /// - [`MarkowitzError::DimensionMismatch`] if `returns` or `covariance`
    ///   do not match the universe size
    /// - [`MarkowitzError::InvalidInput`] for an empty universe, a
    ///   non-positive principal, or a non-finite target
    pub fn solve(
        &self,
        target_return: f64,
        returns: &Array1<f64>,
        covariance: &Array2<f64>,
        universe: &AssetUniverse,
        principal: f64,
    ) -> Result<AllocationOutcome> {
        validate_inputs(returns, covariance, universe)?;
        if !(principal.is_finite() && principal > 0.0) {
            return Err(MarkowitzError::InvalidInput(format!(
                "principal must be positive, got {principal}"
            )));
        }
        if !target_return.is_finite() {
            return Err(MarkowitzError::InvalidInput(format!(
                "target return must be finite, got {target_return}"
            )));
        }

        let mut covariance = covariance.clone();
        sanitize_non_finite(&mut covariance);

        let raw = match minimum_variance(&covariance, returns, target_return) {
            Ok(raw) => raw,
            Err(reason) => {
                tracing::debug!(target_return, %reason, "no feasible allocation");
                return Ok(AllocationOutcome::Infeasible {
                    sentinel: Allocation::zero(universe, target_return, principal),
                    reason,
                });
            }
        };

        let norm = raw.iter().map(|s| s * s).sum::<f64>().sqrt();
        if !(norm.is_finite() && norm > 0.0) {
            return Ok(AllocationOutcome::Infeasible {
                sentinel: Allocation::zero(universe, target_return, principal),
                reason: QpError::Infeasible,
            });
        }
        let scaled: Vec<f64> = raw.iter().map(|s| s.abs() / norm).collect();
        let total: f64 = scaled.iter().sum();

        let assets = universe
            .iter()
            .zip(raw.iter().zip(scaled.iter()))
            .map(|(symbol, (&raw_weight, &s))| {
                let weight = s / total;
                AssetAllocation {
                    symbol: symbol.clone(),
                    raw_weight,
                    weight,
                    amount: weight * principal,
                }
            })
            .collect();

        Ok(AllocationOutcome::Feasible(Allocation {
            target_return,
            principal,
            assets,
        }))
    }
}

/// Checks that the statistics pair matches the universe.
pub(crate) fn validate_inputs(
    returns: &Array1<f64>,
    covariance: &Array2<f64>,
    universe: &AssetUniverse,
) -> Result<()> {
    let n = universe.len();
    if n == 0 {
        return Err(MarkowitzError::InvalidInput(
            "asset universe is empty".to_string(),
        ));
    }
    if returns.len() != n {
        return Err(MarkowitzError::DimensionMismatch {
            expected: n,
            actual: returns.len(),
        });
    }
    if covariance.nrows() != n || covariance.ncols() != n {
        return Err(MarkowitzError::DimensionMismatch {
            expected: n,
            actual: if covariance.nrows() != n {
                covariance.nrows()
            } else {
                covariance.ncols()
            },
        });
    }
    Ok(())
}

/// Raw solver weights for one target, or the reason there are none.
///
/// Constraint rows are `[returnsᵀ; 1ᵀ; −I]` against the cones
/// `[Zero(2), Nonnegative(n)]`, so the two equalities come first.
fn minimum_variance(
    covariance: &Array2<f64>,
    returns: &Array1<f64>,
    target_return: f64,
) -> std::result::Result<Vec<f64>, QpError> {
    use clarabel::solver::*;

    let n = returns.len();
    check_semidefinite(covariance)?;

    let p = upper_triangle(covariance);
    let q = vec![0.0; n];
    let a = constraint_matrix(returns);
    let mut b = vec![target_return, 1.0];
    b.extend(std::iter::repeat_n(0.0, n));
    let cones = [ZeroConeT(EQUALITY_CONSTRAINTS), NonnegativeConeT(n)];

    let settings = DefaultSettingsBuilder::default()
        .max_iter(MAX_ITERATIONS)
        .verbose(false)
        .build()
        .map_err(|e| QpError::Setup(e.to_string()))?;
    let mut solver = DefaultSolver::new(&p, &q, &a, &b, &cones, settings)
        .map_err(|e| QpError::Setup(format!("{e:?}")))?;
    solver.solve();

    let status = solver.solution.status;
    match status {
        SolverStatus::Solved | SolverStatus::AlmostSolved => {}
        SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
            return Err(QpError::Infeasible);
        }
        SolverStatus::MaxIterations | SolverStatus::MaxTime => {
            return Err(QpError::IterationLimit(format!("{status:?}")));
        }
        other => return Err(QpError::Numerical(format!("{other:?}"))),
    }

    let x = solver.solution.x.clone();
    let achieved: f64 = x.iter().zip(returns.iter()).map(|(w, r)| w * r).sum();
    let invested: f64 = x.iter().sum();
    let lowest = x.iter().copied().fold(f64::INFINITY, f64::min);
    if (achieved - target_return).abs() > FEASIBILITY_TOLERANCE
        || (invested - 1.0).abs() > FEASIBILITY_TOLERANCE
        || lowest < -FEASIBILITY_TOLERANCE
    {
        return Err(QpError::Infeasible);
    }
    Ok(x)
}

/// Rejects a covariance with an eigenvalue below `−PSD_TOLERANCE · max|λ|`.
fn check_semidefinite(covariance: &Array2<f64>) -> std::result::Result<(), QpError> {
    let n = covariance.nrows();
    let matrix = DMatrix::from_fn(n, n, |i, j| covariance[[i, j]]);
    let eigenvalues = matrix.symmetric_eigenvalues();
    let scale = eigenvalues.amax();
    if eigenvalues.min() < -PSD_TOLERANCE * scale {
        return Err(QpError::NotPositiveSemidefinite);
    }
    Ok(())
}

/// Upper triangle of the covariance in compressed-column form.
fn upper_triangle(covariance: &Array2<f64>) -> CscMatrix<f64> {
    let n = covariance.nrows();
    let mut colptr = vec![0];
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();
    for j in 0..n {
        for i in 0..=j {
            let value = covariance[[i, j]];
            if value != 0.0 {
                rowval.push(i);
                nzval.push(value);
            }
        }
        colptr.push(nzval.len());
    }
    CscMatrix::new(n, n, colptr, rowval, nzval)
}

/// Target return row, full investment row, then `−w_j ≤ 0` per asset.
fn constraint_matrix(returns: &Array1<f64>) -> CscMatrix<f64> {
    let n = returns.len();
    let mut colptr = vec![0];
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();
    for (j, &r) in returns.iter().enumerate() {
        if r != 0.0 {
            rowval.push(0);
            nzval.push(r);
        }
        rowval.push(1);
        nzval.push(1.0);
        rowval.push(EQUALITY_CONSTRAINTS + j);
        nzval.push(-1.0);
        colptr.push(nzval.len());
    }
    CscMatrix::new(EQUALITY_CONSTRAINTS + n, n, colptr, rowval, nzval)
}
