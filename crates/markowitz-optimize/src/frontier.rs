//! The frontier table and its presentation pruning.

use markowitz_traits::{Result, Symbol};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Share of principal at or below which an asset column is dropped from the
/// presentation table.
pub const MIN_ALLOCATION_SHARE: f64 = 0.01;

/// One swept target return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontierRow {
    /// Grid target return.
    pub target_return: f64,
    /// Achieved expected return, rounded to 2 decimals.
    pub expected_return: f64,
    /// Annualized risk, rounded to 4 decimals.
    pub risk: f64,
    /// Whether the solver found a portfolio at this target.
    pub feasible: bool,
    /// Dollar amount per symbol, aligned with [`FrontierTable::symbols`].
    pub amounts: Vec<f64>,
}

impl FrontierRow {
    fn is_zero(&self) -> bool {
        self.expected_return == 0.0 && self.risk == 0.0 && self.amounts.iter().all(|a| *a == 0.0)
    }
}

/// Frontier rows in grid order over a fixed set of symbols.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontierTable {
    /// Column symbols.
    pub symbols: Vec<Symbol>,
    /// Capital allocated at every row.
    pub principal: f64,
    /// Rows in ascending target-return order.
    pub rows: Vec<FrontierRow>,
}

impl FrontierTable {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows where the solver found a portfolio.
    pub fn feasible_rows(&self) -> impl Iterator<Item = &FrontierRow> {
        self.rows.iter().filter(|row| row.feasible)
    }

    /// Dollar amounts of `symbol` down the rows, if present.
    pub fn column(&self, symbol: &str) -> Option<Vec<f64>> {
        let j = self.symbols.iter().position(|s| s == symbol)?;
        Some(self.rows.iter().map(|row| row.amounts[j]).collect())
    }

    /// Presentation view of the table.
    ///
    /// Applied in order:
    ///
    /// 1. drop asset columns whose largest amount is at most 1% of principal
    /// 2. order the remaining columns by the row index of their largest
    ///    amount, descending; ties keep their current (universe) order and
    ///    the first row attaining the maximum counts
    /// 3. drop rows and columns that are zero throughout
    pub fn pruned(&self) -> Self {
        let threshold = MIN_ALLOCATION_SHARE * self.principal;

        let mut columns: Vec<(usize, usize)> = (0..self.symbols.len())
            .filter_map(|j| {
                let (max_row, max) = self.rows.iter().enumerate().fold(
                    (0, f64::NEG_INFINITY),
                    |(best_i, best), (i, row)| {
                        if row.amounts[j] > best {
                            (i, row.amounts[j])
                        } else {
                            (best_i, best)
                        }
                    },
                );
                (max > threshold).then_some((j, max_row))
            })
            .collect();
        columns.sort_by_key(|&(_, max_row)| Reverse(max_row));

        let columns: Vec<usize> = columns
            .into_iter()
            .map(|(j, _)| j)
            .filter(|&j| self.rows.iter().any(|row| row.amounts[j] != 0.0))
            .collect();

        let rows = self
            .rows
            .iter()
            .map(|row| FrontierRow {
                amounts: columns.iter().map(|&j| row.amounts[j]).collect(),
                ..row.clone()
            })
            .filter(|row| !row.is_zero())
            .collect();

        Self {
            symbols: columns.iter().map(|&j| self.symbols[j].clone()).collect(),
            principal: self.principal,
            rows,
        }
    }

    /// Converts the table to a [`DataFrame`] with columns `target_return`,
    /// `expected_return`, `risk`, then one column of dollar amounts per symbol.
    ///
    /// # Errors
    ///
    /// Returns [`MarkowitzError::Polars`](markowitz_traits::MarkowitzError::Polars)
    /// if two symbols collide with each other or with the metric columns.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let target: Vec<f64> = self.rows.iter().map(|r| r.target_return).collect();
        let expected: Vec<f64> = self.rows.iter().map(|r| r.expected_return).collect();
        let risk: Vec<f64> = self.rows.iter().map(|r| r.risk).collect();

        let mut df = df! {
            "target_return" => target,
            "expected_return" => expected,
            "risk" => risk,
        }?;

        for (j, symbol) in self.symbols.iter().enumerate() {
            let amounts: Vec<f64> = self.rows.iter().map(|r| r.amounts[j]).collect();
            df.with_column(Series::new(symbol.as_str().into(), amounts))?;
        }

        Ok(df)
    }
}
