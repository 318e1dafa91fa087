//! Noise estimation and adaptive window selection
//!
//! The noise level of a curve is estimated from its second differences: on a
//! smooth signal `y[i+1] − 2y[i] + y[i−1]` is small, while sample-to-sample
//! jitter makes it large. Dividing the mean magnitude by the signal range gives
//! a dimensionless noise-to-signal ratio.
//!
//! The ratio is mapped monotonically onto a half-window range: quiet curves get
//! the narrowest window (best resolution), noisy curves the widest (most
//! averaging). The upper bound is clamped so the chosen window always fits the
//! DTG length precondition.

use thermocurve_core::{Curve, Error, Result};

use crate::differentiation::dtg_min_len;

/// Noise ratio at which the widest window is chosen
pub const NOISE_SATURATION: f64 = 0.05;

/// Outcome of [`select_half_window`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSelection {
    /// Chosen half-window in samples
    pub half_window: usize,
    /// Estimated noise-to-signal ratio that drove the choice
    pub noise_ratio: f64,
}

/// Estimate the noise-to-signal ratio of a value sequence
///
/// Returns `None` for fewer than 3 samples and `Some(0.0)` for a flat signal.
/// Non-finite values are ignored: they are left out of the range, and every
/// second difference touching one is skipped. `None` when no second
/// difference remains.
pub fn estimate_noise(values: &[f64]) -> Option<f64> {
    if values.len() < 3 {
        return None;
    }

    let (sum, count) = values
        .windows(3)
        .filter(|w| w.iter().all(|v| v.is_finite()))
        .fold((0.0, 0usize), |(sum, count), w| {
            (sum + (w[2] - 2.0 * w[1] + w[0]).abs(), count + 1)
        });
    if count == 0 {
        return None;
    }

    let (lo, hi) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = hi - lo;
    if !(range > 0.0) || !range.is_finite() {
        return Some(0.0);
    }

    Some(sum / count as f64 / range)
}

/// Choose a DTG half-window in `[min_half_window, max_half_window]` from the
/// curve's estimated noise
///
/// The upper bound is lowered to `(n − 1) / 2` when the curve is too short for
/// it. When no noise estimate exists (every second difference touches a
/// non-finite sample) the narrowest window is chosen and the ratio is 0. Fails with [`Error::InsufficientData`] when even `min_half_window` does
/// not fit.
pub fn select_half_window(
    curve: &Curve,
    min_half_window: usize,
    max_half_window: usize,
) -> Result<WindowSelection> {
    if min_half_window == 0 {
        return Err(Error::invalid_parameter(
            "min_half_window",
            min_half_window,
            "must be >= 1",
        ));
    }
    if max_half_window < min_half_window {
        return Err(Error::invalid_parameter(
            "max_half_window",
            max_half_window,
            format!("must be >= min_half_window ({})", min_half_window),
        ));
    }

    let n = curve.len();
    let min_len = dtg_min_len(min_half_window).max(3);
    if n < min_len {
        return Err(Error::InsufficientData { got: n, min: min_len });
    }

    let limit = max_half_window.min((n - 1) / 2);
    let noise_ratio = estimate_noise(curve.y()).unwrap_or(0.0);

    let t = (noise_ratio / NOISE_SATURATION).clamp(0.0, 1.0);
    let half_window = min_half_window + (t * (limit - min_half_window) as f64).round() as usize;

    Ok(WindowSelection {
        half_window,
        noise_ratio,
    })
}
