//! Quadratic frontier fit and tangency portfolio.

use crate::frontier::FrontierTable;
use markowitz_traits::{MarkowitzError, Result};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Singular values below this are treated as zero in the least-squares solve.
const SVD_EPS: f64 = 1e-12;

/// Fitted curve `return = a + b·risk + c·risk²`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveFit {
    /// Intercept.
    pub a: f64,
    /// Linear coefficient.
    pub b: f64,
    /// Quadratic coefficient.
    pub c: f64,
}

impl CurveFit {
    /// Ordinary least-squares fit over `(risk, return)` points.
    ///
    /// # Errors
    ///
    /// Returns [`MarkowitzError::InsufficientData`] with fewer than three
    /// distinct risk values, or if the least-squares system cannot be solved.
    pub fn fit(points: &[(f64, f64)]) -> Result<Self> {
        let mut risks: Vec<f64> = points.iter().map(|(risk, _)| *risk).collect();
        risks.sort_by(f64::total_cmp);
        risks.dedup_by(|x, y| (*x - *y).abs() <= f64::EPSILON);
        if risks.len() < 3 {
            return Err(MarkowitzError::InsufficientData(format!(
                "quadratic fit needs 3 distinct risk values, got {}",
                risks.len()
            )));
        }

        let x = DMatrix::from_fn(points.len(), 3, |i, k| points[i].0.powi(k as i32));
        let y = DVector::from_iterator(points.len(), points.iter().map(|(_, ret)| *ret));
        let coefficients = x
            .svd(true, true)
            .solve(&y, SVD_EPS)
            .map_err(|e| MarkowitzError::InsufficientData(e.to_string()))?;

        Ok(Self {
            a: coefficients[0],
            b: coefficients[1],
            c: coefficients[2],
        })
    }

    /// Fitted return at `risk`.
    pub fn evaluate(&self, risk: f64) -> f64 {
        self.a + self.b * risk + self.c * risk * risk
    }

    /// Slope of the fitted curve at `risk`.
    pub fn slope(&self, risk: f64) -> f64 {
        self.b + 2.0 * self.c * risk
    }
}

/// Tangency point of the capital allocation line with the fitted frontier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TangencyPoint {
    /// Annualized risk at tangency.
    pub risk: f64,
    /// Fitted return at tangency.
    pub expected_return: f64,
    /// Curve the point lies on.
    pub fit: CurveFit,
    /// Risk-free rate anchoring the line.
    pub risk_free_rate: f64,
}

impl TangencyPoint {
    /// `(expected_return − risk_free_rate) / risk`, or `None` at zero risk.
    pub fn sharpe_ratio(&self) -> Option<f64> {
        (self.risk != 0.0).then(|| (self.expected_return - self.risk_free_rate) / self.risk)
    }
}

/// Outcome of the tangency search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Tangency {
    /// The line touches the curve.
    Found(TangencyPoint),
    /// The tangency equation has no real root.
    NotFound {
        /// The fitted curve.
        fit: CurveFit,
    },
}

impl Tangency {
    /// The tangency point, if any.
    pub const fn point(&self) -> Option<&TangencyPoint> {
        match self {
            Self::Found(point) => Some(point),
            Self::NotFound { .. } => None,
        }
    }

    /// The fitted curve.
    pub const fn fit(&self) -> &CurveFit {
        match self {
            Self::Found(point) => &point.fit,
            Self::NotFound { fit } => fit,
        }
    }
}

/// Real roots of `a·x² + b·x + c = 0`, larger first.
///
/// Returns `None` for a negative discriminant or `a == 0`; a double root is
/// returned twice.
pub fn quadratic_roots(a: f64, b: f64, c: f64) -> Option<(f64, f64)> {
    if a == 0.0 {
        return None;
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 || !discriminant.is_finite() {
        return None;
    }
    let sqrt = discriminant.sqrt();
    let r1 = (-b + sqrt) / (2.0 * a);
    let r2 = (-b - sqrt) / (2.0 * a);
    Some((r1.max(r2), r1.min(r2)))
}

/// Fits the frontier and locates the tangency portfolio.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrontierAnalyzer;

impl FrontierAnalyzer {
    /// Creates an analyzer.
    pub const fn new() -> Self {
        Self
    }

    /// Fits `return = a + b·risk + c·risk²` over the feasible rows of
    /// `frontier` and solves for the tangency point against `risk_free_rate`.
    ///
    /// The line `rf + m·risk` is tangent where it meets the curve with the
    /// curve's slope `m = b + 2c·risk`, which reduces to
    /// `c·risk² + (rf − a) = 0`. Of two real roots the larger is taken.
    ///
    /// # Errors
    ///
    /// Returns [`MarkowitzError::InsufficientData`] if the feasible rows
    /// carry fewer than three distinct risk values.
    pub fn analyze(&self, frontier: &FrontierTable, risk_free_rate: f64) -> Result<Tangency> {
        let points: Vec<(f64, f64)> = frontier
            .feasible_rows()
            .map(|row| (row.risk, row.expected_return))
            .collect();
        let fit = CurveFit::fit(&points)?;
        tracing::debug!(a = fit.a, b = fit.b, c = fit.c, "fitted frontier curve");

        Ok(Self::tangency(fit, risk_free_rate))
    }

    /// Tangency point of `fit` against `risk_free_rate`.
    pub fn tangency(fit: CurveFit, risk_free_rate: f64) -> Tangency {
        match quadratic_roots(fit.c, 0.0, risk_free_rate - fit.a) {
            Some((risk, _)) => Tangency::Found(TangencyPoint {
                risk,
                expected_return: fit.evaluate(risk),
                fit,
                risk_free_rate,
            }),
            None => {
                tracing::debug!(risk_free_rate, "no real tangency");
                Tangency::NotFound { fit }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontier::FrontierRow;
    use approx::assert_abs_diff_eq;

    fn synthetic_frontier(fit: CurveFit) -> FrontierTable {
        let rows = (1..=10)
            .map(|i| {
                let risk = 0.05 * i as f64;
                FrontierRow {
                    target_return: fit.evaluate(risk),
                    expected_return: fit.evaluate(risk),
                    risk,
                    feasible: true,
                    amounts: vec![1.0],
                }
            })
            .collect();
        FrontierTable {
            symbols: vec!["X".into()],
            principal: 1.0,
            rows,
        }
    }

    const CURVE: CurveFit = CurveFit {
        a: 0.02,
        b: 0.5,
        c: -0.3,
    };

    #[test]
    fn test_fit_recovers_coefficients() {
        let tangency = FrontierAnalyzer::new()
            .analyze(&synthetic_frontier(CURVE), 0.025)
            .unwrap();
        let fit = tangency.fit();

        assert_abs_diff_eq!(fit.a, 0.02, epsilon = 1e-3);
        assert_abs_diff_eq!(fit.b, 0.5, epsilon = 1e-3);
        assert_abs_diff_eq!(fit.c, -0.3, epsilon = 1e-3);
    }

    #[test]
    fn test_tangency_matches_analytic_root() {
        let rf = 0.025;
        let tangency = FrontierAnalyzer::new()
            .analyze(&synthetic_frontier(CURVE), rf)
            .unwrap();
        let point = tangency.point().unwrap();

        let expected_risk = ((CURVE.a - rf) / CURVE.c).sqrt();
        assert_abs_diff_eq!(point.risk, expected_risk, epsilon = 1e-3);
        assert_abs_diff_eq!(point.expected_return, CURVE.evaluate(expected_risk), epsilon = 1e-3);

        // Line from (0, rf) through the point has the curve's slope there.
        let line_slope = (point.expected_return - rf) / point.risk;
        assert_abs_diff_eq!(line_slope, point.fit.slope(point.risk), epsilon = 1e-6);
        assert_abs_diff_eq!(point.sharpe_ratio().unwrap(), line_slope, epsilon = 1e-12);
    }

    #[test]
    fn test_no_tangency_when_discriminant_negative() {
        // Concave curve with the risk-free rate below its intercept.
        let tangency = FrontierAnalyzer::tangency(CURVE, 0.01);
        assert!(matches!(tangency, Tangency::NotFound { .. }));
        assert!(tangency.point().is_none());
    }

    #[test]
    fn test_linear_fit_has_no_tangency() {
        let line = CurveFit {
            a: 0.01,
            b: 0.3,
            c: 0.0,
        };
        assert!(FrontierAnalyzer::tangency(line, 0.02).point().is_none());
    }

    #[test]
    fn test_double_root() {
        let tangency = FrontierAnalyzer::tangency(CURVE, CURVE.a);
        let point = tangency.point().unwrap();
        assert_eq!(point.risk, 0.0);
        assert_eq!(point.sharpe_ratio(), None);
    }

    #[test]
    fn test_quadratic_roots_larger_first() {
        let (hi, lo) = quadratic_roots(1.0, -3.0, 2.0).unwrap();
        assert_abs_diff_eq!(hi, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(lo, 1.0, epsilon = 1e-12);

        let (hi, lo) = quadratic_roots(-1.0, 0.0, 4.0).unwrap();
        assert_abs_diff_eq!(hi, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(lo, -2.0, epsilon = 1e-12);

        assert!(quadratic_roots(1.0, 0.0, 1.0).is_none());
    }

    #[test]
    fn test_too_few_points() {
        let mut frontier = synthetic_frontier(CURVE);
        frontier.rows.truncate(2);
        assert!(matches!(
            FrontierAnalyzer::new().analyze(&frontier, 0.02),
            Err(MarkowitzError::InsufficientData(_))
        ));

        // Infeasible rows do not count.
        let mut frontier = synthetic_frontier(CURVE);
        for row in frontier.rows.iter_mut().skip(2) {
            row.feasible = false;
        }
        assert!(FrontierAnalyzer::new().analyze(&frontier, 0.02).is_err());
    }
}
