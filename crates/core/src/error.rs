//! Error types for thermocurve

use thiserror::Error;

/// Main error type for thermocurve operations
///
/// The type is `Clone` so a failed coordination can keep the error in its
/// terminal state while also returning it to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Algorithm not registered: {name}")]
    NotFound { name: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Insufficient data: got {got} samples, need at least {min}")]
    InsufficientData { got: usize, min: usize },

    #[error("x is not strictly increasing at index {index}")]
    NonMonotonic { index: usize },

    #[error("Length mismatch: x has {x_len} values, y has {y_len}")]
    LengthMismatch { x_len: usize, y_len: usize },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Cannot {action} while {state}")]
    InvalidTransition { state: String, action: &'static str },

    #[error("Interaction cancelled: {0}")]
    Cancelled(String),

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with a formatted message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Shorthand for [`Error::InvalidParameter`].
    pub fn invalid_parameter(
        name: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for thermocurve operations
pub type Result<T> = std::result::Result<T, Error>;
