//! Centered moving average
//!
//! Each output sample is the mean of the samples within `window / 2` positions
//! of it. Near the ends the window is clipped to the available samples rather
//! than padded, so the output has the same length as the input and no
//! synthetic values enter the mean.

use thermocurve_core::{Algorithm, Curve, Error, Result};

/// Parameters for moving-average smoothing
#[derive(Debug, Clone, Copy)]
pub struct SmoothingParams {
    /// Window size in samples (default 5). Odd sizes give a symmetric window.
    pub window: usize,
}

impl Default for SmoothingParams {
    fn default() -> Self {
        Self { window: 5 }
    }
}

/// Moving-average smoothing algorithm
#[derive(Debug, Clone, Default)]
pub struct MovingAverage;

impl Algorithm for MovingAverage {
    type Input = Curve;
    type Output = Curve;
    type Params = SmoothingParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Moving average"
    }

    fn description(&self) -> &'static str {
        "Centered moving average with shrinking windows at the ends"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        smooth_curve(&input, params)
    }
}

/// Smooth a raw value sequence with a centered moving average
///
/// `window == 1` returns the input unchanged. A non-finite value only affects
/// the outputs whose window contains it.
pub fn moving_average(values: &[f64], window: usize) -> Result<Vec<f64>> {
    if window == 0 {
        return Err(Error::invalid_parameter("window", window, "must be >= 1"));
    }

    let n = values.len();
    let half = window / 2;
    if half == 0 || n == 0 {
        return Ok(values.to_vec());
    }

    let smoothed = (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half).min(n - 1);
            values[lo..=hi].iter().sum::<f64>() / (hi - lo + 1) as f64
        })
        .collect();

    Ok(smoothed)
}

/// Smooth the y values of a curve, keeping x untouched
///
/// Requires at least `params.window` samples.
pub fn smooth_curve(curve: &Curve, params: SmoothingParams) -> Result<Curve> {
    if params.window == 0 {
        return Err(Error::invalid_parameter("window", params.window, "must be >= 1"));
    }
    if curve.len() < params.window {
        return Err(Error::InsufficientData {
            got: curve.len(),
            min: params.window,
        });
    }
    let y = moving_average(curve.y(), params.window)?;
    curve.with_y(y)
}
