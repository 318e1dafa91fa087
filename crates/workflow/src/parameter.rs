//! Declarative parameter definitions.
//!
//! Each algorithm declares its inputs as `ParameterDescriptor`s. The
//! `ParamKind` carries both the type tag and the constraint for that type, so
//! a descriptor can never hold an integer constraint on a double parameter.
//! Values supplied by a caller arrive as `ParamValue` and are checked against
//! the descriptor before they reach the execution context.

use std::fmt;

use serde::{Deserialize, Serialize};
use thermocurve_core::{Error, Result};

/// Relative tolerance for step checks on doubles.
const STEP_REL_TOL: f64 = 1e-9;
/// Absolute floor for step checks on doubles.
const STEP_ABS_TOL: f64 = 1e-12;

/// Type tag of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    Integer,
    Double,
    Boolean,
    String,
    Enum,
    DoubleRange,
    /// Filled by the point-selection stage, never by a value.
    PointsOnChart,
}

impl ParamType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Double => "double",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Enum => "enum",
            Self::DoubleRange => "double range",
            Self::PointsOnChart => "points on chart",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bounds for an integer parameter. `step == 0` disables the step check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntConstraint {
    pub min: i64,
    pub max: i64,
    pub step: i64,
}

impl IntConstraint {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max, step: 0 }
    }

    pub fn with_step(mut self, step: i64) -> Self {
        self.step = step;
        self
    }
}

/// Bounds for a double parameter. `step == 0.0` disables the step check.
#[derive(Debug, Clone, PartialEq)]
pub struct DoubleConstraint {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub unit: Option<String>,
}

impl DoubleConstraint {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            step: 0.0,
            unit: None,
        }
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }
}

/// One choice of an enum parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumOption {
    pub value: String,
    pub label: String,
}

impl EnumOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// The kind of a parameter together with its constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    Integer { constraint: Option<IntConstraint> },
    Double { constraint: Option<DoubleConstraint> },
    Boolean,
    String,
    /// Non-empty ordered list of options.
    Enum { options: Vec<EnumOption> },
    /// Both ends are checked against the same constraint.
    DoubleRange { constraint: Option<DoubleConstraint> },
    PointsOnChart,
}

impl ParamKind {
    pub fn param_type(&self) -> ParamType {
        match self {
            Self::Integer { .. } => ParamType::Integer,
            Self::Double { .. } => ParamType::Double,
            Self::Boolean => ParamType::Boolean,
            Self::String => ParamType::String,
            Self::Enum { .. } => ParamType::Enum,
            Self::DoubleRange { .. } => ParamType::DoubleRange,
            Self::PointsOnChart => ParamType::PointsOnChart,
        }
    }
}

/// Runtime parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamValue {
    Integer(i64),
    Double(f64),
    Boolean(bool),
    String(String),
    Enum(String),
    DoubleRange(f64, f64),
}

impl ParamValue {
    pub fn param_type(&self) -> ParamType {
        match self {
            Self::Integer(_) => ParamType::Integer,
            Self::Double(_) => ParamType::Double,
            Self::Boolean(_) => ParamType::Boolean,
            Self::String(_) => ParamType::String,
            Self::Enum(_) => ParamType::Enum,
            Self::DoubleRange(..) => ParamType::DoubleRange,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer value as a count; `None` for negative values.
    pub fn as_usize(&self) -> Option<usize> {
        self.as_i64().and_then(|v| usize::try_from(v).ok())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&str> {
        match self {
            Self::Enum(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_range(&self) -> Option<(f64, f64)> {
        match self {
            Self::DoubleRange(lo, hi) => Some((*lo, *hi)),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{}", v),
            Self::Double(v) => write!(f, "{}", v),
            Self::Boolean(v) => write!(f, "{}", v),
            Self::String(v) | Self::Enum(v) => f.write_str(v),
            Self::DoubleRange(lo, hi) => write!(f, "{}..{}", lo, hi),
        }
    }
}

/// Definition of a single algorithm parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    /// Unique within the algorithm; stored in the context as `param.<name>`.
    pub name: String,
    pub label: String,
    pub kind: ParamKind,
    pub default: Option<ParamValue>,
    pub required: bool,
}

impl ParameterDescriptor {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            default: None,
            required: false,
        }
    }

    pub fn integer(name: impl Into<String>, label: impl Into<String>, constraint: IntConstraint) -> Self {
        Self::new(name, label, ParamKind::Integer { constraint: Some(constraint) })
    }

    pub fn double(name: impl Into<String>, label: impl Into<String>, constraint: DoubleConstraint) -> Self {
        Self::new(name, label, ParamKind::Double { constraint: Some(constraint) })
    }

    pub fn double_range(
        name: impl Into<String>,
        label: impl Into<String>,
        constraint: DoubleConstraint,
    ) -> Self {
        Self::new(name, label, ParamKind::DoubleRange { constraint: Some(constraint) })
    }

    pub fn choice(name: impl Into<String>, label: impl Into<String>, options: Vec<EnumOption>) -> Self {
        Self::new(name, label, ParamKind::Enum { options })
    }

    pub fn points_on_chart(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, ParamKind::PointsOnChart)
    }

    pub fn with_default(mut self, value: ParamValue) -> Self {
        self.default = Some(value);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn param_type(&self) -> ParamType {
        self.kind.param_type()
    }

    /// True for placeholders filled by the point-selection stage.
    pub fn is_chart_placeholder(&self) -> bool {
        matches!(self.kind, ParamKind::PointsOnChart)
    }

    /// Context key this parameter is stored under.
    pub fn context_key(&self) -> String {
        crate::context::param_key(&self.name)
    }

    /// Check a value against the type and constraint of this parameter.
    pub fn validate_value(&self, value: &ParamValue) -> Result<()> {
        let expected = self.param_type();
        if expected == ParamType::PointsOnChart {
            return Err(self.reject(value, "is filled by point selection and takes no value"));
        }
        if value.param_type() != expected {
            return Err(self.reject(value, &format!("expected {}, got {}", expected, value.param_type())));
        }

        match (&self.kind, value) {
            (ParamKind::Integer { constraint: Some(c) }, ParamValue::Integer(v)) => {
                if *v < c.min || *v > c.max {
                    return Err(self.reject(value, &format!("outside [{}, {}]", c.min, c.max)));
                }
                if c.step > 0 {
                    let base = self.default.as_ref().and_then(ParamValue::as_i64).unwrap_or(c.min);
                    // i128 so bounds near the ends of i64 cannot overflow
                    if (i128::from(*v) - i128::from(base)) % i128::from(c.step) != 0 {
                        return Err(self.reject(value, &format!("not {} plus a multiple of {}", base, c.step)));
                    }
                }
            }
            (ParamKind::Double { constraint }, ParamValue::Double(v)) => {
                if v.is_nan() {
                    return Err(self.reject(value, "not a number"));
                }
                if let Some(c) = constraint {
                    if !c.contains(*v) {
                        return Err(self.reject(value, &format!("outside [{}, {}]", c.min, c.max)));
                    }
                    if c.step > 0.0 {
                        let base = self.default.as_ref().and_then(ParamValue::as_f64).unwrap_or(c.min);
                        if !on_step(*v, base, c.step) {
                            return Err(self.reject(value, &format!("not {} plus a multiple of {}", base, c.step)));
                        }
                    }
                }
            }
            (ParamKind::Enum { options }, ParamValue::Enum(v)) => {
                if !options.iter().any(|o| &o.value == v) {
                    let allowed: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
                    return Err(self.reject(value, &format!("expected one of {}", allowed.join(", "))));
                }
            }
            (ParamKind::DoubleRange { constraint }, ParamValue::DoubleRange(lo, hi)) => {
                if lo.is_nan() || hi.is_nan() || lo > hi {
                    return Err(self.reject(value, "range start must not exceed its end"));
                }
                if let Some(c) = constraint {
                    if !c.contains(*lo) || !c.contains(*hi) {
                        return Err(self.reject(value, &format!("outside [{}, {}]", c.min, c.max)));
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Resolve the value stored for this parameter.
    ///
    /// Supplied value, then default. A required parameter with neither fails;
    /// an optional one resolves to `None` and is left out of the context.
    pub fn resolve(&self, supplied: Option<&ParamValue>) -> Result<Option<ParamValue>> {
        match supplied.or(self.default.as_ref()) {
            Some(value) => {
                self.validate_value(value)?;
                Ok(Some(value.clone()))
            }
            None if self.required => Err(Error::validation(format!(
                "missing required parameter `{}`",
                self.name
            ))),
            None => Ok(None),
        }
    }

    /// Parse a textual value according to this parameter's type.
    ///
    /// Ranges are written `lo,hi` or `lo..hi`. The result is validated.
    pub fn parse_value(&self, raw: &str) -> Result<ParamValue> {
        let raw = raw.trim();
        let bad = |what: &str| {
            Error::validation(format!("parameter `{}`: cannot parse `{}` as {}", self.name, raw, what))
        };

        let value = match self.param_type() {
            ParamType::Integer => ParamValue::Integer(raw.parse().map_err(|_| bad("integer"))?),
            ParamType::Double => ParamValue::Double(raw.parse().map_err(|_| bad("double"))?),
            ParamType::Boolean => match raw.to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => ParamValue::Boolean(true),
                "false" | "no" | "0" => ParamValue::Boolean(false),
                _ => return Err(bad("boolean")),
            },
            ParamType::String => ParamValue::String(raw.to_string()),
            ParamType::Enum => ParamValue::Enum(raw.to_string()),
            ParamType::DoubleRange => {
                let (lo, hi) = raw
                    .split_once("..")
                    .or_else(|| raw.split_once(','))
                    .ok_or_else(|| bad("range"))?;
                let lo = lo.trim().parse().map_err(|_| bad("range"))?;
                let hi = hi.trim().parse().map_err(|_| bad("range"))?;
                ParamValue::DoubleRange(lo, hi)
            }
            ParamType::PointsOnChart => {
                return Err(Error::validation(format!(
                    "parameter `{}` is filled by point selection",
                    self.name
                )))
            }
        };

        self.validate_value(&value)?;
        Ok(value)
    }

    /// Check the definition itself: constraint bounds, enum options, default.
    pub fn validate_definition(&self) -> Result<()> {
        let invalid = |msg: String| Error::validation(format!("parameter `{}`: {}", self.name, msg));

        match &self.kind {
            ParamKind::Integer { constraint: Some(c) } => {
                if c.min > c.max || c.step < 0 {
                    return Err(invalid(format!("bad integer constraint {:?}", c)));
                }
            }
            ParamKind::Double { constraint: Some(c) } | ParamKind::DoubleRange { constraint: Some(c) } => {
                if !(c.min <= c.max) || !(c.step >= 0.0) {
                    return Err(invalid(format!("bad double constraint {:?}", c)));
                }
            }
            ParamKind::Enum { options } if options.is_empty() => {
                return Err(invalid("enum without options".into()));
            }
            ParamKind::PointsOnChart if self.default.is_some() => {
                return Err(invalid("chart placeholder cannot carry a default".into()));
            }
            _ => {}
        }

        if let Some(default) = &self.default {
            self.validate_value(default)?;
        }
        Ok(())
    }

    fn reject(&self, value: &ParamValue, reason: &str) -> Error {
        Error::validation(format!("parameter `{}` = {}: {}", self.name, value, reason))
    }
}

/// Whether `v − base` is an integer multiple of `step`, within tolerance.
fn on_step(v: f64, base: f64, step: f64) -> bool {
    let diff = v - base;
    let k = (diff / step).round();
    let err = (diff - k * step).abs();
    err <= (STEP_REL_TOL * diff.abs().max(step)).max(STEP_ABS_TOL)
}
