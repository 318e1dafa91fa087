//! Execution context: the typed key/value map passed to an engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thermocurve_algorithms::extrema::Extrema;
use thermocurve_core::{Curve, Error, Result, Sample};

use crate::parameter::ParamValue;

/// Input curve supplied by the caller.
pub const INPUT_CURVE: &str = "input.curve";
/// Points picked during the points stage.
pub const POINTS: &str = "points";
/// Identifier of the curve picked during the curve stage.
pub const SELECTED_CURVE_ID: &str = "curve.selected.id";
/// Samples of the curve picked during the curve stage.
pub const SELECTED_CURVE: &str = "curve.selected";
pub const RESULT_DERIVATIVE: &str = "result.derivative";
pub const RESULT_CURVE: &str = "result.curve";
pub const RESULT_EXTREMA: &str = "result.extrema";
pub const RESULT_HALF_WINDOW: &str = "result.half_window";
pub const RESULT_MAX_POINT: &str = "result.max_point";

/// Prefix of parameter keys.
pub const PARAM_PREFIX: &str = "param.";

/// Context key for parameter `name`.
pub fn param_key(name: &str) -> String {
    format!("{}{}", PARAM_PREFIX, name)
}

/// A value stored in the execution context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ContextValue {
    Param(ParamValue),
    Points(Vec<Sample>),
    CurveRef(String),
    Curve(Curve),
    Extrema(Extrema),
    Sample(Sample),
    Count(usize),
}

impl ContextValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Param(_) => "parameter",
            Self::Points(_) => "points",
            Self::CurveRef(_) => "curve reference",
            Self::Curve(_) => "curve",
            Self::Extrema(_) => "extrema",
            Self::Sample(_) => "sample",
            Self::Count(_) => "count",
        }
    }
}

impl From<ParamValue> for ContextValue {
    fn from(v: ParamValue) -> Self {
        Self::Param(v)
    }
}

impl From<Curve> for ContextValue {
    fn from(v: Curve) -> Self {
        Self::Curve(v)
    }
}

impl From<Vec<Sample>> for ContextValue {
    fn from(v: Vec<Sample>) -> Self {
        Self::Points(v)
    }
}

impl From<Extrema> for ContextValue {
    fn from(v: Extrema) -> Self {
        Self::Extrema(v)
    }
}

impl From<Sample> for ContextValue {
    fn from(v: Sample) -> Self {
        Self::Sample(v)
    }
}

impl From<usize> for ContextValue {
    fn from(v: usize) -> Self {
        Self::Count(v)
    }
}

/// Typed key/value map assembled by the coordinator and extended by engines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionContext {
    values: BTreeMap<String, ContextValue>,
}

/// Generates a typed getter that fails on a missing key or a wrong variant.
macro_rules! typed_getter {
    ($(#[$doc:meta])* $fn:ident, $variant:ident, $ty:ty) => {
        $(#[$doc])*
        pub fn $fn(&self, key: &str) -> Result<&$ty> {
            match self.require(key)? {
                ContextValue::$variant(v) => Ok(v),
                other => Err(mismatch(key, stringify!($fn), other)),
            }
        }
    };
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context holding only the input curve.
    pub fn with_input(curve: Curve) -> Self {
        let mut ctx = Self::new();
        ctx.insert(INPUT_CURVE, curve);
        ctx
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Option<ContextValue> {
        self.values.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.values.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ContextValue> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContextValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Move every entry of `other` into `self`, overwriting on collision.
    pub fn merge(&mut self, other: ExecutionContext) {
        self.values.extend(other.values);
    }

    fn require(&self, key: &str) -> Result<&ContextValue> {
        self.values
            .get(key)
            .ok_or_else(|| Error::validation(format!("context has no `{}`", key)))
    }

    typed_getter!(curve, Curve, Curve);
    typed_getter!(extrema, Extrema, Extrema);
    typed_getter!(sample, Sample, Sample);
    typed_getter!(count, Count, usize);
    typed_getter!(
        /// Picked points stored under `key`.
        points,
        Points,
        Vec<Sample>
    );
    typed_getter!(curve_ref, CurveRef, String);

    /// Value of parameter `name` (stored as `param.<name>`).
    pub fn param(&self, name: &str) -> Result<&ParamValue> {
        let key = param_key(name);
        match self.require(&key)? {
            ContextValue::Param(v) => Ok(v),
            other => Err(mismatch(&key, "param", other)),
        }
    }

    /// Value of parameter `name`, or `None` when it was not resolved.
    pub fn param_opt(&self, name: &str) -> Option<&ParamValue> {
        match self.values.get(&param_key(name)) {
            Some(ContextValue::Param(v)) => Some(v),
            _ => None,
        }
    }
}

fn mismatch(key: &str, expected: &str, found: &ContextValue) -> Error {
    Error::validation(format!(
        "context key `{}` holds {}, expected {}",
        key,
        found.kind_name(),
        expected.replace('_', " ")
    ))
}
