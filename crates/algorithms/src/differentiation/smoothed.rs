//! Smooth-then-differentiate
//!
//! Applies a centered moving average to y, then a central difference. Useful
//! on noisy curves where a plain central difference amplifies jitter.

use thermocurve_core::{Algorithm, Curve, Error, Result};

use super::central::central_difference;
use crate::smoothing::{smooth_curve, SmoothingParams};

/// Parameters for smooth-then-differentiate
#[derive(Debug, Clone, Copy)]
pub struct SmoothedDerivativeParams {
    /// Moving-average window in samples (default 5)
    pub smooth_window: usize,
}

impl Default for SmoothedDerivativeParams {
    fn default() -> Self {
        Self { smooth_window: 5 }
    }
}

/// Smooth-then-differentiate algorithm
#[derive(Debug, Clone, Default)]
pub struct SmoothedDerivative;

impl Algorithm for SmoothedDerivative {
    type Input = Curve;
    type Output = Curve;
    type Params = SmoothedDerivativeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Smoothed derivative"
    }

    fn description(&self) -> &'static str {
        "Moving-average smoothing followed by a central difference"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        smoothed_derivative(&input, params)
    }
}

/// Smooth y with a moving average, then take the central difference
///
/// Output length is `n − 2` (smoothing itself preserves length).
pub fn smoothed_derivative(curve: &Curve, params: SmoothedDerivativeParams) -> Result<Curve> {
    let smoothed = smooth_curve(
        curve,
        SmoothingParams {
            window: params.smooth_window,
        },
    )?;
    central_difference(&smoothed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_length() {
        let curve = Curve::sampled(0.0, 1.0, 30, |x| x.sin());
        let result = smoothed_derivative(&curve, SmoothedDerivativeParams { smooth_window: 7 }).unwrap();
        assert_eq!(result.len(), 28);
    }

    #[test]
    fn test_window_one_equals_central_difference() {
        let curve = Curve::sampled(0.0, 0.2, 25, |x| (2.0 * x).cos());
        let smoothed = smoothed_derivative(&curve, SmoothedDerivativeParams { smooth_window: 1 }).unwrap();
        let plain = central_difference(&curve).unwrap();
        assert_eq!(smoothed, plain);
    }

    #[test]
    fn test_interior_slope_of_line() {
        // Moving average keeps a line intact away from the edges
        let curve = Curve::sampled(0.0, 1.0, 20, |x| 2.0 * x - 1.0);
        let result = smoothed_derivative(&curve, SmoothedDerivativeParams { smooth_window: 5 }).unwrap();
        for &v in &result.y()[3..result.len() - 3] {
            assert!((v - 2.0).abs() < 1e-10, "got {}", v);
        }
    }

    #[test]
    fn test_shorter_than_window() {
        let curve = Curve::sampled(0.0, 1.0, 4, |x| x);
        let err = smoothed_derivative(&curve, SmoothedDerivativeParams { smooth_window: 5 }).unwrap_err();
        assert_eq!(err, Error::InsufficientData { got: 4, min: 5 });
    }
}
