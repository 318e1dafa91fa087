//! # thermocurve core
//!
//! Core types shared by the thermocurve crates.
//!
//! This crate provides:
//! - `Curve` / `Sample`: ordered (x, y) sample sequences
//! - `Error` / `Result`: the error model used across the workspace
//! - `Algorithm`: common trait for curve estimators

pub mod curve;
pub mod error;

pub use curve::{Curve, Sample};
pub use error::{Error, Result};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::curve::{Curve, Sample};
    pub use crate::error::{Error, Result};
    pub use crate::Algorithm;
}

/// Core trait for all algorithms in thermocurve.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
