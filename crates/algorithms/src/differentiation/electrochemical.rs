//! Asymmetric window difference for electrochemical curves
//!
//! The window of `w` samples is split in two halves of `w / 2` samples. The
//! front half starts at the center sample, the back half ends just before it:
//!
//!   after  = Σ_{j=0..half−1} y[i+j]
//!   before = Σ_{j=1..half}   y[i−j]
//!   d[i]   = (after − before) × norm
//!
//! `norm` is an empirical scale correction, conventionally `(w − 1) / w`.
//! Centers run over `[half, n − half]`, giving `n − 2·half + 1` outputs.

use thermocurve_core::{Algorithm, Curve, Error, Result};

/// Parameters for the asymmetric window difference
#[derive(Debug, Clone, Copy)]
pub struct ElectrochemicalParams {
    /// Total window size in samples (default 10, must be >= 2)
    pub window_size: usize,
    /// Scale correction; `None` uses `(window_size − 1) / window_size`
    pub norm_factor: Option<f64>,
}

impl Default for ElectrochemicalParams {
    fn default() -> Self {
        Self {
            window_size: 10,
            norm_factor: None,
        }
    }
}

impl ElectrochemicalParams {
    /// The scale correction actually applied
    pub fn effective_norm(&self) -> f64 {
        self.norm_factor.unwrap_or_else(|| {
            let w = self.window_size as f64;
            (w - 1.0) / w
        })
    }
}

/// Asymmetric window difference algorithm
#[derive(Debug, Clone, Default)]
pub struct Electrochemical;

impl Algorithm for Electrochemical {
    type Input = Curve;
    type Output = Curve;
    type Params = ElectrochemicalParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Electrochemical derivative"
    }

    fn description(&self) -> &'static str {
        "Asymmetric window difference scaled by an empirical normalization factor"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        electrochemical_derivative(&input, params)
    }
}

/// Compute the asymmetric window difference
pub fn electrochemical_derivative(curve: &Curve, params: ElectrochemicalParams) -> Result<Curve> {
    let w = params.window_size;
    if w < 2 {
        return Err(Error::invalid_parameter("window_size", w, "must be >= 2"));
    }
    let norm = params.effective_norm();
    if !norm.is_finite() {
        return Err(Error::invalid_parameter("norm_factor", norm, "must be finite"));
    }

    let n = curve.len();
    if n < w + 1 {
        return Err(Error::InsufficientData { got: n, min: w + 1 });
    }

    let half = w / 2;
    let x = curve.x();
    let y = curve.y();

    let count = n - 2 * half + 1;
    let mut out_x = Vec::with_capacity(count);
    let mut out_y = Vec::with_capacity(count);

    for i in half..=n - half {
        let before: f64 = y[i - half..i].iter().sum();
        let after: f64 = y[i..i + half].iter().sum();
        out_x.push(x[i]);
        out_y.push((after - before) * norm);
    }

    Curve::from_xy(out_x, out_y)
}
