//! Algorithm descriptors.
//!
//! An `AlgorithmDescriptor` is the static description of one algorithm: its
//! parameters, which interaction stages it needs, the context keys it reads
//! and writes, and free-form metadata. Descriptors are built once at startup
//! and never change afterwards.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use thermocurve_core::{Error, Result, Sample};

use crate::parameter::ParameterDescriptor;

/// Metadata key holding the [`OutputPolicy`].
pub const OUTPUT_POLICY_KEY: &str = "output";
/// Metadata key holding the prompt shown for curve selection.
pub const CURVE_HINT_KEY: &str = "curve_hint";

/// Category of algorithms (maps to the listing tree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AlgoCategory {
    Derivative,
    Smoothing,
    Features,
}

impl AlgoCategory {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Derivative => "Derivative",
            Self::Smoothing => "Smoothing",
            Self::Features => "Features",
        }
    }

    pub const ALL: &[AlgoCategory] = &[Self::Derivative, Self::Smoothing, Self::Features];
}

impl FromStr for AlgoCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::validation(format!("unknown category `{}`", s)))
    }
}

impl fmt::Display for AlgoCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How many chart points an algorithm needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointSelectionSpec {
    pub min_count: usize,
    /// `None` means unbounded.
    pub max_count: Option<usize>,
    pub hint: String,
}

impl PointSelectionSpec {
    pub fn new(min_count: usize, max_count: Option<usize>) -> Self {
        Self {
            min_count,
            max_count,
            hint: String::new(),
        }
    }

    /// Exactly `n` points.
    pub fn exactly(n: usize) -> Self {
        Self::new(n, Some(n))
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = hint.into();
        self
    }

    /// A spec that asks for nothing passes without interaction.
    ///
    /// Any spec with `min_count == 0` counts, so optional picks
    /// (`max_count > 0`) are never requested and `points` is stored empty.
    pub fn is_vacuous(&self) -> bool {
        self.min_count == 0
    }

    pub fn validate(&self) -> Result<()> {
        match self.max_count {
            Some(max) if max < self.min_count => Err(Error::validation(format!(
                "point selection max {} is below min {}",
                max, self.min_count
            ))),
            _ => Ok(()),
        }
    }

    /// Check a set of picks against the bounds.
    pub fn check(&self, points: &[Sample]) -> Result<()> {
        let n = points.len();
        if n < self.min_count {
            return Err(Error::validation(format!(
                "need at least {} point(s), got {}",
                self.min_count, n
            )));
        }
        if let Some(max) = self.max_count {
            if n > max {
                return Err(Error::validation(format!("need at most {} point(s), got {}", max, n)));
            }
        }
        if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(Error::validation("point coordinates must be finite"));
        }
        Ok(())
    }
}

/// One unit of user input the coordinator can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionStage {
    Parameters,
    Points,
    Curve,
}

impl InteractionStage {
    /// Order used when a descriptor does not declare one.
    pub const DEFAULT_ORDER: [InteractionStage; 3] = [Self::Parameters, Self::Points, Self::Curve];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parameters => "parameters",
            Self::Points => "points",
            Self::Curve => "curve",
        }
    }
}

impl FromStr for InteractionStage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "parameters" => Ok(Self::Parameters),
            "points" => Ok(Self::Points),
            "curve" => Ok(Self::Curve),
            other => Err(Error::validation(format!("unknown interaction stage `{}`", other))),
        }
    }
}

impl fmt::Display for InteractionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a front end does with a produced curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputPolicy {
    /// Show the result next to the input.
    AppendCurve,
    /// Replace the input with the result.
    ReplaceCurve,
}

impl OutputPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AppendCurve => "AppendCurve",
            Self::ReplaceCurve => "ReplaceCurve",
        }
    }
}

impl FromStr for OutputPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "AppendCurve" => Ok(Self::AppendCurve),
            "ReplaceCurve" => Ok(Self::ReplaceCurve),
            other => Err(Error::validation(format!("unknown output policy `{}`", other))),
        }
    }
}

/// Static description of one algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct AlgorithmDescriptor {
    /// Stable identifier, also the registry key.
    pub name: String,
    pub display_name: String,
    pub category: AlgoCategory,
    pub description: String,
    pub parameters: Vec<ParameterDescriptor>,
    pub point_selection: Option<PointSelectionSpec>,
    pub needs_curve_selection: bool,
    /// Stage tags; empty means [`InteractionStage::DEFAULT_ORDER`].
    pub interaction_order: Vec<String>,
    /// Context keys read from the inbound context.
    pub prerequisites: Vec<String>,
    /// Context keys the engine must write.
    pub produces: Vec<String>,
    pub metadata: BTreeMap<String, String>,
}

impl AlgorithmDescriptor {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>, category: AlgoCategory) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            category,
            description: String::new(),
            parameters: Vec::new(),
            point_selection: None,
            needs_curve_selection: false,
            interaction_order: Vec::new(),
            prerequisites: Vec::new(),
            produces: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_point_selection(mut self, spec: PointSelectionSpec) -> Self {
        self.point_selection = Some(spec);
        self
    }

    pub fn with_curve_selection(mut self) -> Self {
        self.needs_curve_selection = true;
        self
    }

    pub fn with_interaction_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interaction_order = order.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_prerequisite(mut self, key: impl Into<String>) -> Self {
        self.prerequisites.push(key.into());
        self
    }

    pub fn with_produces(mut self, key: impl Into<String>) -> Self {
        self.produces.push(key.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_output_policy(self, policy: OutputPolicy) -> Self {
        self.with_metadata(OUTPUT_POLICY_KEY, policy.as_str())
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Output policy from metadata; `AppendCurve` when absent.
    pub fn output_policy(&self) -> Result<OutputPolicy> {
        self.metadata
            .get(OUTPUT_POLICY_KEY)
            .map_or(Ok(OutputPolicy::AppendCurve), |s| s.parse())
    }

    /// Whether `stage` needs to run for this algorithm.
    pub fn requires_stage(&self, stage: InteractionStage) -> bool {
        match stage {
            InteractionStage::Parameters => !self.parameters.is_empty(),
            InteractionStage::Points => self.point_selection.is_some(),
            InteractionStage::Curve => self.needs_curve_selection,
        }
    }

    /// Effective stage order.
    ///
    /// The declared order (or the default) filtered to the stages this
    /// algorithm requires. Required stages missing from a declared order run
    /// after the declared ones, in default order.
    pub fn resolved_stages(&self) -> Result<Vec<InteractionStage>> {
        let mut declared = Vec::with_capacity(self.interaction_order.len());
        for token in &self.interaction_order {
            let stage: InteractionStage = token.parse()?;
            if declared.contains(&stage) {
                return Err(Error::validation(format!(
                    "interaction stage `{}` listed twice for `{}`",
                    token, self.name
                )));
            }
            declared.push(stage);
        }

        let mut stages: Vec<InteractionStage> = declared
            .iter()
            .copied()
            .filter(|s| self.requires_stage(*s))
            .collect();
        for stage in InteractionStage::DEFAULT_ORDER {
            if self.requires_stage(stage) && !stages.contains(&stage) {
                stages.push(stage);
            }
        }
        Ok(stages)
    }

    /// Check internal consistency of the descriptor.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("algorithm name is empty"));
        }

        let mut seen = HashSet::new();
        for p in &self.parameters {
            if !seen.insert(p.name.as_str()) {
                return Err(Error::validation(format!(
                    "duplicate parameter `{}` in `{}`",
                    p.name, self.name
                )));
            }
            p.validate_definition()?;
        }

        if let Some(spec) = &self.point_selection {
            spec.validate()?;
        }
        self.resolved_stages()?;
        self.output_policy()?;
        Ok(())
    }
}
