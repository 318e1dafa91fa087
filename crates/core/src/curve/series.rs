//! Main Curve type

use serde::{Deserialize, Serialize};

use crate::curve::Sample;
use crate::error::{Error, Result};

/// An ordered sequence of (x, y) samples.
///
/// `Curve` stores x and y in two parallel vectors of equal length. Producers
/// are responsible for ordering x; the curve itself never sorts. Derivative
/// sequences use the same type, with `y` holding dy/dx.
///
/// # Example
///
/// ```
/// use thermocurve_core::Curve;
///
/// let curve = Curve::from_xy(vec![0.0, 1.0, 2.0], vec![10.0, 9.5, 9.0])?;
/// assert_eq!(curve.len(), 3);
/// assert_eq!(curve.get(1).map(|s| s.y), Some(9.5));
/// # Ok::<(), thermocurve_core::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "CurveRepr")]
pub struct Curve {
    x: Vec<f64>,
    y: Vec<f64>,
}

/// Unchecked wire form; lengths are verified on conversion.
#[derive(Deserialize)]
struct CurveRepr {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl TryFrom<CurveRepr> for Curve {
    type Error = Error;

    fn try_from(repr: CurveRepr) -> Result<Self> {
        Curve::from_xy(repr.x, repr.y)
    }
}

impl Curve {
    /// Create an empty curve
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a curve from parallel x and y vectors
    pub fn from_xy(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        if x.len() != y.len() {
            return Err(Error::LengthMismatch {
                x_len: x.len(),
                y_len: y.len(),
            });
        }
        Ok(Self { x, y })
    }

    /// Create a curve from a sequence of samples
    pub fn from_samples<I>(samples: I) -> Self
    where
        I: IntoIterator<Item = Sample>,
    {
        let (x, y) = samples.into_iter().map(|s| (s.x, s.y)).unzip();
        Self { x, y }
    }

    /// Sample `f` on a uniform grid `x0, x0 + step, …` (`n` points)
    pub fn sampled<F>(x0: f64, step: f64, n: usize, f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        let x: Vec<f64> = (0..n).map(|i| x0 + step * i as f64).collect();
        let y = x.iter().map(|&xi| f(xi)).collect();
        Self { x, y }
    }

    // Dimensions

    /// Number of samples
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Check if the curve has no samples
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    // Access

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Sample at `index`, or `None` when out of bounds
    pub fn get(&self, index: usize) -> Option<Sample> {
        Some(Sample::new(*self.x.get(index)?, *self.y.get(index)?))
    }

    /// Iterate over samples in order
    pub fn samples(&self) -> impl ExactSizeIterator<Item = Sample> + '_ {
        self.x
            .iter()
            .zip(self.y.iter())
            .map(|(&x, &y)| Sample::new(x, y))
    }

    /// Consume the curve, returning its x and y vectors
    pub fn into_xy(self) -> (Vec<f64>, Vec<f64>) {
        (self.x, self.y)
    }

    /// Append a sample at the end
    pub fn push(&mut self, sample: Sample) {
        self.x.push(sample.x);
        self.y.push(sample.y);
    }

    // Ordering

    /// Index of the first sample whose x does not exceed its predecessor's.
    ///
    /// Returns `None` when x is strictly increasing (always the case for
    /// fewer than two samples). NaN compares as non-increasing.
    pub fn first_non_increasing(&self) -> Option<usize> {
        self.x
            .windows(2)
            .position(|w| !(w[1] > w[0]))
            .map(|i| i + 1)
    }

    /// Fail with [`Error::NonMonotonic`] unless x is strictly increasing
    pub fn ensure_increasing(&self) -> Result<()> {
        match self.first_non_increasing() {
            Some(index) => Err(Error::NonMonotonic { index }),
            None => Ok(()),
        }
    }

    /// Average x spacing, `(x[n-1] - x[0]) / (n - 1)`; `None` below two samples
    pub fn mean_step(&self) -> Option<f64> {
        let n = self.len();
        if n < 2 {
            return None;
        }
        Some((self.x[n - 1] - self.x[0]) / (n - 1) as f64)
    }

    /// Range of y values as `(min, max)`, ignoring NaN
    pub fn y_range(&self) -> Option<(f64, f64)> {
        let mut iter = self.y.iter().copied().filter(|v| !v.is_nan());
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    // Transformations

    /// Samples whose x lies in the closed interval spanned by `a` and `b`.
    ///
    /// The bounds may be given in either order.
    pub fn slice_x_range(&self, a: f64, b: f64) -> Curve {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        Curve::from_samples(self.samples().filter(|s| s.x >= lo && s.x <= hi))
    }

    /// Copy of the curve with `f` applied to every y value
    pub fn map_y<F>(&self, f: F) -> Curve
    where
        F: Fn(f64) -> f64,
    {
        Curve {
            x: self.x.clone(),
            y: self.y.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Copy of the curve with its y replaced by `y`
    pub fn with_y(&self, y: Vec<f64>) -> Result<Curve> {
        Curve::from_xy(self.x.clone(), y)
    }
}

impl FromIterator<Sample> for Curve {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        Curve::from_samples(iter)
    }
}
