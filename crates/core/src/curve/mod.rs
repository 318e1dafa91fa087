//! Sample-sequence data structures

mod sample;
mod series;

pub use sample::Sample;
pub use series::Curve;
