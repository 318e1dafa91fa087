//! Fourth-order five-point stencil
//!
//!   d[i] = (−y[i+2] + 8·y[i+1] − 8·y[i−1] + y[i−2]) / (12·Δx)
//!
//! Exact for polynomials up to degree 4 on an equally spaced grid (the
//! truncation error is O(Δx⁴)). Δx is taken locally as
//! `(x[i+2] − x[i−2]) / 4`, which equals the grid step when spacing is
//! uniform. Uniform spacing is assumed and not checked; on irregular grids the
//! result is only an approximation.

use thermocurve_core::{Algorithm, Curve, Error, Result};

/// Five-point stencil algorithm
#[derive(Debug, Clone, Default)]
pub struct FivePointStencil;

impl Algorithm for FivePointStencil {
    type Input = Curve;
    type Output = Curve;
    type Params = ();
    type Error = Error;

    fn name(&self) -> &'static str {
        "Five-point stencil"
    }

    fn description(&self) -> &'static str {
        "Fourth-order finite difference on an equally spaced grid"
    }

    fn execute(&self, input: Self::Input, _params: Self::Params) -> Result<Self::Output> {
        five_point_stencil(&input)
    }
}

/// Compute the five-point stencil derivative
///
/// Requires at least 5 samples and strictly increasing x. Two samples are
/// dropped at each end.
pub fn five_point_stencil(curve: &Curve) -> Result<Curve> {
    let n = curve.len();
    if n < 5 {
        return Err(Error::InsufficientData { got: n, min: 5 });
    }
    curve.ensure_increasing()?;

    let x = curve.x();
    let y = curve.y();

    let (out_x, out_y) = (2..n - 2)
        .map(|i| {
            let dx = (x[i + 2] - x[i - 2]) / 4.0;
            let num = -y[i + 2] + 8.0 * y[i + 1] - 8.0 * y[i - 1] + y[i - 2];
            (x[i], num / (12.0 * dx))
        })
        .unzip();

    Curve::from_xy(out_x, out_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cubic_is_exact() {
        // f(x) = x³ − 2x² + x + 1, f'(x) = 3x² − 4x + 1
        let curve = Curve::sampled(-2.0, 0.5, 12, |x| x.powi(3) - 2.0 * x * x + x + 1.0);
        let result = five_point_stencil(&curve).unwrap();
        assert_eq!(result.len(), 8);

        for s in result.samples() {
            let expected = 3.0 * s.x * s.x - 4.0 * s.x + 1.0;
            assert!(
                (s.y - expected).abs() < 1e-9,
                "At x={}: expected {}, got {}",
                s.x,
                expected,
                s.y
            );
        }
    }

    #[test]
    fn test_too_short() {
        let curve = Curve::sampled(0.0, 1.0, 4, |x| x);
        assert_eq!(
            five_point_stencil(&curve).unwrap_err(),
            Error::InsufficientData { got: 4, min: 5 }
        );
    }

    #[test]
    fn test_minimum_length_gives_one_sample() {
        let curve = Curve::sampled(0.0, 0.1, 5, |x| x * x);
        let result = five_point_stencil(&curve).unwrap();
        assert_eq!(result.len(), 1);
        assert!((result.y()[0] - 0.4).abs() < 1e-12);
    }
}
