//! Numeric utility functions shared by the estimator and the optimizer.
//!
//! This module provides decimal rounding, evenly spaced ramps and the
//! covariance stabilization that replaces non-finite entries.

use ndarray::Array2;

/// Value written over non-finite covariance entries.
///
/// Near-constant or degenerate price series can yield NaN or infinite
/// covariances. Overwriting them with 1.0 keeps the quadratic program
/// well-posed at the cost of distorting that entry; the substitution is
/// lossy and reported by the caller.
pub const NON_FINITE_SENTINEL: f64 = 1.0;

/// Tolerance used when comparing weights and grid points.
pub const FLOAT_TOLERANCE: f64 = 1e-9;

/// Rounds `value` to `decimals` decimal places (half away from zero).
///
/// # Examples
///
/// ```
/// use markowitz_traits::numeric::round_to;
///
/// assert_eq!(round_to(0.12345, 3), 0.123);
/// assert_eq!(round_to(-1.5, 0), -2.0);
/// ```
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Returns `n` evenly spaced values over `[start, end]`.
///
/// Matches the usual `linspace` conventions: `n == 0` yields nothing,
/// `n == 1` yields only `start`.
///
/// # Examples
///
/// ```
/// use markowitz_traits::numeric::linspace;
///
/// assert_eq!(linspace(0.75, 1.25, 3), vec![0.75, 1.0, 1.25]);
/// assert_eq!(linspace(0.75, 1.25, 1), vec![0.75]);
/// ```
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Overwrites every NaN or infinite entry of `matrix` with [`NON_FINITE_SENTINEL`].
///
/// Returns the number of entries replaced.
pub fn sanitize_non_finite(matrix: &mut Array2<f64>) -> usize {
    let mut replaced = 0;
    for value in matrix.iter_mut() {
        if !value.is_finite() {
            *value = NON_FINITE_SENTINEL;
            replaced += 1;
        }
    }
    replaced
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_round_to() {
        assert_relative_eq!(round_to(0.08349, 2), 0.08);
        assert_relative_eq!(round_to(1.23456, 4), 1.2346);
        assert_relative_eq!(round_to(0.0005, 3), 0.001);
    }

    #[test]
    fn test_linspace_endpoints() {
        let ramp = linspace(0.75, 1.25, 5);
        assert_eq!(ramp.len(), 5);
        assert_relative_eq!(ramp[0], 0.75);
        assert_relative_eq!(ramp[2], 1.0);
        assert_relative_eq!(ramp[4], 1.25);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_sanitize_non_finite() {
        let mut m = array![[0.01, f64::NAN], [f64::INFINITY, 0.04]];
        let replaced = sanitize_non_finite(&mut m);

        assert_eq!(replaced, 2);
        assert_relative_eq!(m[[0, 1]], NON_FINITE_SENTINEL);
        assert_relative_eq!(m[[1, 0]], NON_FINITE_SENTINEL);
        assert_relative_eq!(m[[0, 0]], 0.01);
    }

    #[test]
    fn test_sanitize_clean_matrix_untouched() {
        let mut m = array![[1.0, 0.5], [0.5, 2.0]];
        assert_eq!(sanitize_non_finite(&mut m), 0);
        assert_eq!(m, array![[1.0, 0.5], [0.5, 2.0]]);
    }
}
