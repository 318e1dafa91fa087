//! Peak and valley detection on derivative sequences
//!
//! A sample is a peak when it is strictly greater than both neighbours and at
//! least `threshold · max|d|`; a valley is strictly smaller than both
//! neighbours and at most `−threshold · max|d|`. The first and last samples
//! have only one neighbour and are never reported.

use serde::{Deserialize, Serialize};
use thermocurve_core::{Curve, Error, Result};

/// Parameters for extrema detection
#[derive(Debug, Clone, Copy)]
pub struct ExtremaParams {
    /// Minimum height relative to the largest |d|, in [0, 1] (default 0.1)
    pub threshold: f64,
}

impl Default for ExtremaParams {
    fn default() -> Self {
        Self { threshold: 0.1 }
    }
}

/// One detected extremum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extremum {
    /// Index into the derivative sequence
    pub index: usize,
    pub x: f64,
    pub value: f64,
}

/// Peaks and valleys in input order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Extrema {
    pub peaks: Vec<Extremum>,
    pub valleys: Vec<Extremum>,
}

impl Extrema {
    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty() && self.valleys.is_empty()
    }

    pub fn peak_xs(&self) -> Vec<f64> {
        self.peaks.iter().map(|e| e.x).collect()
    }

    pub fn peak_values(&self) -> Vec<f64> {
        self.peaks.iter().map(|e| e.value).collect()
    }

    pub fn valley_xs(&self) -> Vec<f64> {
        self.valleys.iter().map(|e| e.x).collect()
    }

    pub fn valley_values(&self) -> Vec<f64> {
        self.valleys.iter().map(|e| e.value).collect()
    }
}

/// Find local maxima and minima of a derivative sequence
///
/// Empty input yields empty lists. `threshold` must lie in [0, 1].
pub fn find_extrema(derivative: &Curve, params: ExtremaParams) -> Result<Extrema> {
    let threshold = params.threshold;
    if !(0.0..=1.0).contains(&threshold) {
        return Err(Error::invalid_parameter(
            "threshold",
            threshold,
            "must be within [0, 1]",
        ));
    }

    let d = derivative.y();
    let x = derivative.x();
    let n = d.len();
    let mut extrema = Extrema::default();
    if n < 3 {
        return Ok(extrema);
    }

    let peak_magnitude = d
        .iter()
        .filter(|v| !v.is_nan())
        .fold(0.0_f64, |m, v| m.max(v.abs()));
    let cutoff = threshold * peak_magnitude;

    for i in 1..n - 1 {
        let (prev, cur, next) = (d[i - 1], d[i], d[i + 1]);
        if cur > prev && cur > next && cur >= cutoff {
            extrema.peaks.push(Extremum { index: i, x: x[i], value: cur });
        } else if cur < prev && cur < next && cur <= -cutoff {
            extrema.valleys.push(Extremum { index: i, x: x[i], value: cur });
        }
    }

    Ok(extrema)
}
