//! Second-order central difference on arbitrary (increasing) x
//!
//!   d[i] = (y[i+1] − y[i−1]) / (x[i+1] − x[i−1])
//!
//! Exact for straight lines and tolerant of non-uniform spacing.

use thermocurve_core::{Algorithm, Curve, Error, Result};

/// Central difference algorithm
#[derive(Debug, Clone, Default)]
pub struct CentralDifference;

impl Algorithm for CentralDifference {
    type Input = Curve;
    type Output = Curve;
    type Params = ();
    type Error = Error;

    fn name(&self) -> &'static str {
        "Central difference"
    }

    fn description(&self) -> &'static str {
        "Second-order central difference using neighbouring x spacing"
    }

    fn execute(&self, input: Self::Input, _params: Self::Params) -> Result<Self::Output> {
        central_difference(&input)
    }
}

/// Compute the central-difference derivative
///
/// Requires at least 3 samples and strictly increasing x. The first and last
/// samples are dropped.
pub fn central_difference(curve: &Curve) -> Result<Curve> {
    let n = curve.len();
    if n < 3 {
        return Err(Error::InsufficientData { got: n, min: 3 });
    }
    curve.ensure_increasing()?;

    let x = curve.x();
    let y = curve.y();

    let (out_x, out_y) = (1..n - 1)
        .map(|i| (x[i], (y[i + 1] - y[i - 1]) / (x[i + 1] - x[i - 1])))
        .unzip();

    Curve::from_xy(out_x, out_y)
}
