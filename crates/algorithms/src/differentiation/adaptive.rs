//! Noise-adaptive windowed central difference
//!
//! Picks the DTG half-window from the curve's estimated noise (see
//! [`crate::noise`]) and then runs the DTG estimator with it.

use thermocurve_core::{Algorithm, Curve, Error, Result};
use tracing::debug;

use super::dtg::{dtg, DtgParams};
use crate::noise::select_half_window;

/// Parameters for the adaptive estimator
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveParams {
    /// Smallest half-window considered (default 1)
    pub min_half_window: usize,
    /// Largest half-window considered (default 25)
    pub max_half_window: usize,
    /// Virtual step for DTG; `None` uses the curve's mean x spacing
    pub window_time: Option<f64>,
}

impl Default for AdaptiveParams {
    fn default() -> Self {
        Self {
            min_half_window: 1,
            max_half_window: 25,
            window_time: None,
        }
    }
}

/// Derivative together with the window that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveDerivative {
    pub curve: Curve,
    pub half_window: usize,
    pub noise_ratio: f64,
}

/// Adaptive-window algorithm
#[derive(Debug, Clone, Default)]
pub struct AdaptiveDtg;

impl Algorithm for AdaptiveDtg {
    type Input = Curve;
    type Output = AdaptiveDerivative;
    type Params = AdaptiveParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Adaptive DTG"
    }

    fn description(&self) -> &'static str {
        "Windowed central difference with the window chosen from estimated noise"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        adaptive_dtg(&input, params)
    }
}

/// Select a half-window from the curve's noise and compute the DTG derivative
pub fn adaptive_dtg(curve: &Curve, params: AdaptiveParams) -> Result<AdaptiveDerivative> {
    let n = curve.len();
    if n < 3 {
        return Err(Error::InsufficientData { got: n, min: 3 });
    }

    let selection = select_half_window(curve, params.min_half_window, params.max_half_window)?;

    let window_time = match params.window_time {
        Some(t) => t,
        None => curve
            .mean_step()
            .filter(|s| s.is_finite() && *s > 0.0)
            .ok_or_else(|| {
                Error::invalid_parameter(
                    "window_time",
                    "auto",
                    "mean x spacing is not positive; supply window_time explicitly",
                )
            })?,
    };

    debug!(
        half_window = selection.half_window,
        noise_ratio = selection.noise_ratio,
        window_time,
        "adaptive window selected"
    );

    let derivative = dtg(
        curve,
        DtgParams {
            half_window: selection.half_window,
            window_time,
        },
    )?;

    Ok(AdaptiveDerivative {
        curve: derivative,
        half_window: selection.half_window,
        noise_ratio: selection.noise_ratio,
    })
}
