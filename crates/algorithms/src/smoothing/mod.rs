//! Curve smoothing

mod moving_average;

pub use moving_average::{moving_average, smooth_curve, MovingAverage, SmoothingParams};
