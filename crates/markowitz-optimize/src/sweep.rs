//! Parallel sweep of the allocation solver over a target-return grid.

use crate::{
    allocation::{AllocationSolver, validate_inputs},
    frontier::{FrontierRow, FrontierTable},
};
use markowitz_traits::{
    AssetUniverse, MarkowitzError, Result,
    numeric::{FLOAT_TOLERANCE, round_to, sanitize_non_finite},
};
use ndarray::{Array1, Array2};
use rayon::prelude::*;

/// Upper bound on grid points in one sweep.
pub const MAX_GRID_POINTS: usize = 100_000;

/// Sweeps [`AllocationSolver`] across a grid of target returns.
///
/// Grid points are solved independently on the rayon thread pool and
/// gathered back in grid order, so the resulting table is the same
/// regardless of scheduling.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrontierSweeper {
    solver: AllocationSolver,
}

impl FrontierSweeper {
    /// Creates a sweeper.
    pub const fn new() -> Self {
        Self {
            solver: AllocationSolver::new(),
        }
    }

    /// Target returns `base + k·step` for `k = 0, 1, …` up to and including
    /// `desired` (within a small tolerance).
    ///
    /// # Errors
    ///
    /// Returns [`MarkowitzError::InvalidInput`] if any argument is not
    /// finite, `step` is not positive, `base > desired`, or the grid would
    /// exceed [`MAX_GRID_POINTS`].
    pub fn grid(base: f64, desired: f64, step: f64) -> Result<Vec<f64>> {
        if !(base.is_finite() && desired.is_finite() && step.is_finite()) {
            return Err(MarkowitzError::InvalidInput(
                "grid bounds and step must be finite".to_string(),
            ));
        }
        if step <= 0.0 {
            return Err(MarkowitzError::InvalidInput(format!(
                "step size must be positive, got {step}"
            )));
        }
        if base > desired {
            return Err(MarkowitzError::InvalidInput(format!(
                "base return {base} exceeds desired return {desired}"
            )));
        }

        let steps = ((desired - base) / step + FLOAT_TOLERANCE).floor();
        if steps >= MAX_GRID_POINTS as f64 {
            return Err(MarkowitzError::InvalidInput(format!(
                "grid would have more than {MAX_GRID_POINTS} points"
            )));
        }
        Ok((0..=steps as usize)
            .map(|k| base + k as f64 * step)
            .collect())
    }

    /// Solves every grid point between `base_return` and `desired_return`.
    ///
    /// # Arguments
    ///
    /// * `base_return`, `desired_return`, `step_size` - Grid definition, see [`Self::grid`]
    /// * `returns` - Annual expected return per asset
    /// * `covariance` - Daily covariance matrix, universe order
    /// * `universe` - Assets, in column order
    /// * `principal` - Capital allocated at each grid point
    ///
    /// # Errors
    ///
    /// Grid and dimension errors only; infeasible grid points become
    /// sentinel rows.
    #[allow(clippy::too_many_arguments)]
    pub fn sweep(
        &self,
        base_return: f64,
        desired_return: f64,
        step_size: f64,
        returns: &Array1<f64>,
        covariance: &Array2<f64>,
        universe: &AssetUniverse,
        principal: f64,
    ) -> Result<FrontierTable> {
        let grid = Self::grid(base_return, desired_return, step_size)?;
        self.sweep_grid(&grid, returns, covariance, universe, principal)
    }

    /// Solves every target in `grid`, keeping its order.
    ///
    /// # Errors
    ///
    /// See [`AllocationSolver::solve`].
    pub fn sweep_grid(
        &self,
        grid: &[f64],
        returns: &Array1<f64>,
        covariance: &Array2<f64>,
        universe: &AssetUniverse,
        principal: f64,
    ) -> Result<FrontierTable> {
        validate_inputs(returns, covariance, universe)?;
        let mut covariance = covariance.clone();
        sanitize_non_finite(&mut covariance);

        tracing::debug!(points = grid.len(), assets = universe.len(), "sweeping frontier");

        let rows = grid
            .par_iter()
            .map(|&target| {
                let outcome = self
                    .solver
                    .solve(target, returns, &covariance, universe, principal)?;
                let feasible = outcome.is_feasible();
                let allocation = outcome.into_allocation();

                let (expected_return, risk) = if feasible {
                    (
                        round_to(allocation.expected_return(returns), 2),
                        round_to(allocation.annualized_risk(&covariance), 4),
                    )
                } else {
                    (0.0, 0.0)
                };

                Ok(FrontierRow {
                    target_return: target,
                    expected_return,
                    risk,
                    feasible,
                    amounts: allocation.amounts().to_vec(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let feasible = rows.iter().filter(|r| r.feasible).count();
        tracing::info!(points = rows.len(), feasible, "frontier sweep complete");

        Ok(FrontierTable {
            symbols: universe.symbols().to_vec(),
            principal,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use markowitz_traits::TRADING_DAYS_PER_YEAR;
    use ndarray::array;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn annualization_factor() -> f64 {
        (TRADING_DAYS_PER_YEAR as f64).sqrt()
    }

    fn three_assets() -> (Array1<f64>, Array2<f64>, AssetUniverse) {
        let returns = array![0.05, 0.10, 0.08];
        let covariance = array![[0.01, 0.0, 0.0], [0.0, 0.04, 0.0], [0.0, 0.0, 0.02]];
        let universe: AssetUniverse = ["A", "B", "C"].into_iter().collect();
        (returns, covariance, universe)
    }

    #[test]
    fn test_grid_includes_endpoint() {
        let grid = FrontierSweeper::grid(0.0, 0.10, 0.05).unwrap();
        assert_eq!(grid.len(), 3);
        assert_abs_diff_eq!(grid[2], 0.10, epsilon = 1e-12);

        assert_eq!(FrontierSweeper::grid(0.0, 0.1, 0.01).unwrap().len(), 11);
        assert_eq!(FrontierSweeper::grid(0.03, 0.03, 0.01).unwrap(), vec![0.03]);
    }

    #[test]
    fn test_grid_rejects_bad_parameters() {
        assert!(FrontierSweeper::grid(0.0, 0.1, 0.0).is_err());
        assert!(FrontierSweeper::grid(0.0, 0.1, -0.01).is_err());
        assert!(FrontierSweeper::grid(0.2, 0.1, 0.01).is_err());
        assert!(FrontierSweeper::grid(0.0, f64::NAN, 0.01).is_err());
        assert!(FrontierSweeper::grid(0.0, 1.0, 1e-9).is_err());
    }

    #[test]
    fn test_three_point_sweep_has_increasing_risk() {
        let (returns, covariance, universe) = three_assets();
        let table = FrontierSweeper::new()
            .sweep(0.0, 0.10, 0.05, &returns, &covariance, &universe, 10_000.0)
            .unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.symbols, vec!["A", "B", "C"]);
        assert!(table.rows.windows(2).all(|w| w[1].risk > w[0].risk));

        // 0.0 is below every asset's return.
        assert!(!table.rows[0].feasible);
        assert!(table.rows[0].amounts.iter().all(|a| *a == 0.0));

        assert_abs_diff_eq!(table.rows[1].risk, round_to(annualization_factor() * 0.1, 4));
        assert_abs_diff_eq!(table.rows[2].risk, round_to(annualization_factor() * 0.2, 4));
        assert_abs_diff_eq!(table.rows[2].expected_return, 0.10);
    }

    /// Asserts risk falls to its minimum, then never decreases.
    fn assert_frontier_shape(rows: &[&FrontierRow]) {
        let lowest = rows
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.risk.total_cmp(&b.1.risk))
            .map(|(i, _)| i)
            .unwrap();
        assert!(rows[..=lowest].windows(2).all(|w| w[1].risk <= w[0].risk));
        assert!(rows[lowest..].windows(2).all(|w| w[1].risk >= w[0].risk));
    }

    #[test]
    fn test_risk_is_monotone_over_feasible_rows() {
        let (returns, covariance, universe) = three_assets();
        let table = FrontierSweeper::new()
            .sweep(0.0, 0.15, 0.005, &returns, &covariance, &universe, 10_000.0)
            .unwrap();

        let feasible: Vec<&FrontierRow> = table.feasible_rows().collect();
        assert!(feasible.len() >= 9);
        assert_frontier_shape(&feasible);

        // The minimum-variance portfolio returns 11.5/175; above it risk grows.
        let efficient: Vec<&FrontierRow> = feasible
            .iter()
            .copied()
            .filter(|r| r.target_return >= 0.07 - 1e-9)
            .collect();
        assert!(efficient.windows(2).all(|w| w[1].risk > w[0].risk));

        // Targets outside the asset returns are sentinel rows.
        assert!(
            table
                .rows
                .iter()
                .filter(|r| r.target_return > 0.10 + 1e-9 || r.target_return < 0.05 - 1e-9)
                .all(|r| !r.feasible)
        );
    }

    #[test]
    fn test_correlated_frontier_shape() {
        let mut rng = StdRng::seed_from_u64(11);
        let n = 5;
        let returns = Array1::from_shape_fn(n, |_| rng.gen_range(0.02..0.15));
        let loadings = Array2::from_shape_fn((n, 2), |_| rng.gen_range(-0.01..0.01));
        let mut covariance = loadings.dot(&loadings.t());
        for i in 0..n {
            covariance[[i, i]] += rng.gen_range(1e-5..1e-4);
        }
        let universe: AssetUniverse = (0..n).map(|i| format!("S{i}")).collect();
        let lo = returns.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = returns.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let table = FrontierSweeper::new()
            .sweep(0.0, 0.20, 0.0025, &returns, &covariance, &universe, 10_000.0)
            .unwrap();

        for row in &table.rows {
            let inside = row.target_return > lo + 1e-6 && row.target_return < hi - 1e-6;
            let outside = row.target_return > hi + 1e-6 || row.target_return < lo - 1e-6;
            if inside {
                assert!(row.feasible, "target {} inside [{lo}, {hi}]", row.target_return);
                assert_abs_diff_eq!(row.amounts.iter().sum::<f64>(), 10_000.0, epsilon = 1e-6);
            }
            if outside {
                assert!(!row.feasible, "target {} outside [{lo}, {hi}]", row.target_return);
                assert!(row.amounts.iter().all(|a| *a == 0.0));
            }
        }

        let feasible: Vec<&FrontierRow> = table.feasible_rows().collect();
        assert!(feasible.len() >= 5);
        assert_frontier_shape(&feasible);
    }

    #[test]
    fn test_amounts_sum_to_principal_on_feasible_rows() {
        let (returns, covariance, universe) = three_assets();
        let principal = 5_000.0;
        let table = FrontierSweeper::new()
            .sweep(0.05, 0.10, 0.01, &returns, &covariance, &universe, principal)
            .unwrap();

        for row in table.feasible_rows() {
            assert_abs_diff_eq!(row.amounts.iter().sum::<f64>(), principal, epsilon = 1e-6);
            assert!(row.amounts.iter().all(|a| *a >= 0.0));
        }
    }

    #[test]
    fn test_sweep_matches_sequential_solves() {
        let (returns, covariance, universe) = three_assets();
        let grid = FrontierSweeper::grid(0.04, 0.11, 0.01).unwrap();
        let table = FrontierSweeper::new()
            .sweep_grid(&grid, &returns, &covariance, &universe, 1_000.0)
            .unwrap();

        let solver = AllocationSolver::new();
        for (row, &target) in table.rows.iter().zip(&grid) {
            let expected = solver
                .solve(target, &returns, &covariance, &universe, 1_000.0)
                .unwrap()
                .into_allocation();
            assert_eq!(row.target_return, target);
            assert_eq!(row.amounts, expected.amounts().to_vec());
        }
    }

    #[test]
    fn test_pruned_sweep() {
        let (returns, covariance, universe) = three_assets();
        let pruned = FrontierSweeper::new()
            .sweep(0.0, 0.10, 0.05, &returns, &covariance, &universe, 10_000.0)
            .unwrap()
            .pruned();

        // Sentinel row dropped; B peaks at the last row, A at the first; C is
        // zero at both corners.
        assert_eq!(pruned.len(), 2);
        assert_eq!(pruned.symbols, vec!["B", "A"]);
    }
}
