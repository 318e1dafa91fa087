//! Windowed central difference (DTG)
//!
//! The classic derivative used for thermogravimetric curves. For each center
//! sample the `h` samples after it are summed and the `h` samples before it
//! are subtracted:
//!
//!   d[i] = (Σ_{j=1..h} y[i+j] − Σ_{j=1..h} y[i−j]) / (window_time · h)
//!
//! `window_time` is a virtual step supplied by the caller; x is only used to
//! label the output. The `h` samples at each end have no complete window and
//! are dropped, so the output holds `n − 2h` samples.

use thermocurve_core::{Algorithm, Curve, Error, Result};

/// Parameters for the windowed central difference
#[derive(Debug, Clone, Copy)]
pub struct DtgParams {
    /// Half-width of the differencing window in samples (default 5)
    pub half_window: usize,
    /// Virtual time step dividing the window difference (default 1.0)
    pub window_time: f64,
}

impl Default for DtgParams {
    fn default() -> Self {
        Self {
            half_window: 5,
            window_time: 1.0,
        }
    }
}

/// Windowed central-difference algorithm
#[derive(Debug, Clone, Default)]
pub struct Dtg;

impl Algorithm for Dtg {
    type Input = Curve;
    type Output = Curve;
    type Params = DtgParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "DTG"
    }

    fn description(&self) -> &'static str {
        "Windowed central difference with a caller-supplied virtual step"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        dtg(&input, params)
    }
}

/// Minimum number of samples the DTG estimator needs for `half_window`
pub fn dtg_min_len(half_window: usize) -> usize {
    2 * half_window + 1
}

/// Compute the windowed central-difference derivative
///
/// # Arguments
/// * `curve` - Input sample sequence
/// * `params` - Window half-width and virtual step
///
/// # Returns
/// Derivative sequence of length `n − 2·half_window`, labelled with the
/// x of each center sample
pub fn dtg(curve: &Curve, params: DtgParams) -> Result<Curve> {
    let h = params.half_window;
    if h == 0 {
        return Err(Error::invalid_parameter("half_window", h, "must be >= 1"));
    }
    if !params.window_time.is_finite() || params.window_time <= 0.0 {
        return Err(Error::invalid_parameter(
            "window_time",
            params.window_time,
            "must be positive and finite",
        ));
    }

    let n = curve.len();
    let min = dtg_min_len(h);
    if n < min {
        return Err(Error::InsufficientData { got: n, min });
    }

    let x = curve.x();
    let y = curve.y();
    let scale = params.window_time * h as f64;

    let mut out_x = Vec::with_capacity(n - 2 * h);
    let mut out_y = Vec::with_capacity(n - 2 * h);

    // Each window is summed on its own so a non-finite sample only reaches
    // the outputs whose window contains it.
    for i in h..n - h {
        let before: f64 = y[i - h..i].iter().sum();
        let after: f64 = y[i + 1..=i + h].iter().sum();
        out_x.push(x[i]);
        out_y.push((after - before) / scale);
    }

    Curve::from_xy(out_x, out_y)
}
