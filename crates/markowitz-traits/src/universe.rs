//! Asset universes and candidate screening.

use crate::types::Symbol;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An ordered set of symbols with unique membership.
///
/// Index `i` of every return vector, covariance matrix and allocation
/// produced for a universe refers to `symbols()[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetUniverse {
    symbols: Vec<Symbol>,
}

impl AssetUniverse {
    /// Creates an empty universe.
    pub const fn new() -> Self {
        Self {
            symbols: Vec::new(),
        }
    }

    /// Appends a symbol if it is not already a member.
    ///
    /// Returns `true` if the symbol was added.
    pub fn push(&mut self, symbol: impl Into<Symbol>) -> bool {
        let symbol = symbol.into();
        if self.contains(&symbol) {
            return false;
        }
        self.symbols.push(symbol);
        true
    }

    /// Members in universe order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the universe has no members.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Whether `symbol` is a member.
    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    /// Position of `symbol` in universe order.
    pub fn index_of(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }

    /// Iterates over members in universe order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }
}

impl<S: Into<Symbol>> FromIterator<S> for AssetUniverse {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut universe = Self::new();
        for symbol in iter {
            universe.push(symbol);
        }
        universe
    }
}

/// A candidate fund with the attributes used for screening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Ticker symbol.
    pub symbol: Symbol,
    /// Market capitalization (or assets under management) in dollars.
    pub market_cap: f64,
    /// Annual expense ratio as a fraction (0.0003 = 3 bps).
    pub expense_ratio: f64,
}

/// Screening thresholds applied to the candidate list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CandidateFilter {
    /// Candidates must be strictly larger than this.
    pub min_market_cap: f64,
    /// Candidates must be strictly cheaper than this.
    pub max_expense_ratio: f64,
}

impl Default for CandidateFilter {
    fn default() -> Self {
        Self {
            min_market_cap: 100_000_000.0,
            max_expense_ratio: 0.006,
        }
    }
}

impl CandidateFilter {
    /// Returns the symbols passing the screen, deduplicated, in input order.
    pub fn apply(&self, candidates: &[Candidate]) -> Vec<Symbol> {
        let mut seen = HashSet::new();
        candidates
            .iter()
            .filter(|c| c.market_cap > self.min_market_cap && c.expense_ratio < self.max_expense_ratio)
            .filter(|c| seen.insert(c.symbol.clone()))
            .map(|c| c.symbol.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(symbol: &str, market_cap: f64, expense_ratio: f64) -> Candidate {
        Candidate {
            symbol: symbol.to_string(),
            market_cap,
            expense_ratio,
        }
    }

    #[test]
    fn test_universe_unique_membership() {
        let mut universe: AssetUniverse = ["VTI", "QQQ", "VTI"].into_iter().collect();
        assert_eq!(universe.len(), 2);
        assert!(!universe.push("QQQ"));
        assert!(universe.push("BND"));
        assert_eq!(universe.symbols(), &["VTI", "QQQ", "BND"]);
        assert_eq!(universe.index_of("BND"), Some(2));
        assert_eq!(universe.index_of("SPY"), None);
    }

    #[test]
    fn test_candidate_filter_thresholds() {
        let candidates = vec![
            candidate("VTI", 300e9, 0.0003),
            candidate("TINY", 50e6, 0.0010),
            candidate("PRICEY", 5e9, 0.0075),
            candidate("EDGE", 100e6, 0.0010),
            candidate("QQQ", 200e9, 0.0020),
            candidate("VTI", 300e9, 0.0003),
        ];

        let symbols = CandidateFilter::default().apply(&candidates);
        assert_eq!(symbols, vec!["VTI".to_string(), "QQQ".to_string()]);
    }
}
