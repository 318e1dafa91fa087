//! Numerical differentiation of sample sequences
//!
//! Estimators, trading order of accuracy against noise sensitivity:
//! - DTG: windowed central difference with a virtual step
//! - Electrochemical: asymmetric window difference with a scale correction
//! - Central difference: second order, any increasing x
//! - Five-point stencil: fourth order, equally spaced x
//! - Adaptive DTG: window chosen from estimated noise
//! - Smoothed derivative: moving average, then central difference
//!
//! Every estimator trims the samples it cannot resolve at the ends; nothing is
//! extrapolated. Output x values are the x of the center sample.

mod adaptive;
mod central;
mod dtg;
mod electrochemical;
mod five_point;
mod max_point;
mod smoothed;

pub use adaptive::{adaptive_dtg, AdaptiveDerivative, AdaptiveDtg, AdaptiveParams};
pub use central::{central_difference, CentralDifference};
pub use dtg::{dtg, dtg_min_len, Dtg, DtgParams};
pub use electrochemical::{electrochemical_derivative, Electrochemical, ElectrochemicalParams};
pub use five_point::{five_point_stencil, FivePointStencil};
pub use max_point::find_max_derivative_point;
pub use smoothed::{smoothed_derivative, SmoothedDerivative, SmoothedDerivativeParams};
