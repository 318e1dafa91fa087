//! # Thermocurve Algorithms
//!
//! Numerical analysis of thermal-analysis curves.
//!
//! ## Available Algorithm Categories
//!
//! - **differentiation**: DTG, electrochemical, central difference, five-point
//!   stencil, adaptive DTG, smoothed derivative, max-rate point
//! - **smoothing**: Centered moving average
//! - **noise**: Noise estimation and adaptive window selection
//! - **extrema**: Peak and valley detection on derivatives
//! - **batch**: One estimator over many curves, optionally in parallel

pub mod batch;
pub mod differentiation;
pub mod extrema;
pub mod noise;
pub mod smoothing;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::batch::{derive_batch, num_threads, ProcessingMode};
    pub use crate::differentiation::{
        adaptive_dtg, central_difference, dtg, electrochemical_derivative,
        find_max_derivative_point, five_point_stencil, smoothed_derivative,
        AdaptiveDerivative, AdaptiveDtg, AdaptiveParams, CentralDifference, Dtg, DtgParams,
        Electrochemical, ElectrochemicalParams, FivePointStencil, SmoothedDerivative,
        SmoothedDerivativeParams,
    };
    pub use crate::extrema::{find_extrema, Extrema, ExtremaParams, Extremum};
    pub use crate::noise::{estimate_noise, select_half_window, WindowSelection};
    pub use crate::smoothing::{moving_average, smooth_curve, MovingAverage, SmoothingParams};
    pub use thermocurve_core::prelude::*;
}
