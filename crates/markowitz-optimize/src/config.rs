//! Run parameters for one optimization.

use crate::sweep::FrontierSweeper;
use markowitz_traits::{MarkowitzError, Result, Symbol};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parameters fixed for one optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Lookback window in years.
    pub years: u32,

    /// Capital to allocate.
    pub principal: f64,

    /// First target return of the frontier grid.
    pub base_return: f64,

    /// Last target return of the frontier grid.
    pub desired_return: f64,

    /// Grid spacing.
    pub step_size: f64,

    /// Risk-free rate for the tangency portfolio.
    pub risk_free_rate: f64,

    /// Expected-return estimates that replace the estimator's, per symbol.
    pub return_overrides: BTreeMap<Symbol, f64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            years: 5,
            principal: 10_000.0,
            base_return: 0.0,
            desired_return: 0.20,
            step_size: 0.01,
            risk_free_rate: 0.04,
            return_overrides: BTreeMap::new(),
        }
    }
}

impl RunConfig {
    /// Checks the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`MarkowitzError::InvalidInput`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.years < 2 {
            return Err(MarkowitzError::InvalidInput(format!(
                "years must be at least 2, got {}",
                self.years
            )));
        }
        if !(self.principal.is_finite() && self.principal > 0.0) {
            return Err(MarkowitzError::InvalidInput(format!(
                "principal must be positive, got {}",
                self.principal
            )));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(MarkowitzError::InvalidInput(
                "risk-free rate must be finite".to_string(),
            ));
        }
        if let Some((symbol, value)) = self.return_overrides.iter().find(|(_, v)| !v.is_finite()) {
            return Err(MarkowitzError::InvalidInput(format!(
                "return override for {symbol} is not finite: {value}"
            )));
        }
        self.grid().map(|_| ())
    }

    /// Target-return grid described by this configuration.
    ///
    /// # Errors
    ///
    /// See [`FrontierSweeper::grid`].
    pub fn grid(&self) -> Result<Vec<f64>> {
        FrontierSweeper::grid(self.base_return, self.desired_return, self.step_size)
    }
}
