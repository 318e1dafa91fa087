//! Interaction coordinator.
//!
//! Drives one algorithm invocation through its interaction stages:
//!
//! ```text
//! NotStarted ─start─▶ Collecting{Parameters,Points,Curve} ─submit─▶ … ─▶ Ready
//!     Ready ─execute─▶ Executing ─▶ Completed
//! ```
//!
//! Any validation or engine error moves the coordinator to `Failed`, which is
//! terminal. Input is requested through an [`InteractionProvider`]; the
//! numeric work is delegated to an [`AnalysisEngine`].

use std::collections::HashMap;
use std::fmt;

use thermocurve_core::{Curve, Error, Result, Sample};
use tracing::{debug, warn};

use crate::context::{
    ContextValue, ExecutionContext, POINTS, SELECTED_CURVE, SELECTED_CURVE_ID,
};
use crate::descriptor::{AlgorithmDescriptor, InteractionStage, PointSelectionSpec, CURVE_HINT_KEY};
use crate::parameter::{ParamValue, ParameterDescriptor};

const DEFAULT_CURVE_HINT: &str = "Select a reference curve";

/// Coordinator lifecycle state.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinatorState {
    NotStarted,
    CollectingParameters,
    CollectingPoints,
    CollectingCurve,
    Ready,
    Executing,
    Completed,
    Failed(Error),
}

impl CoordinatorState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::NotStarted => "NotStarted",
            Self::CollectingParameters => "CollectingParameters",
            Self::CollectingPoints => "CollectingPoints",
            Self::CollectingCurve => "CollectingCurve",
            Self::Ready => "Ready",
            Self::Executing => "Executing",
            Self::Completed => "Completed",
            Self::Failed(_) => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed(_))
    }

    fn collecting(stage: InteractionStage) -> Self {
        match stage {
            InteractionStage::Parameters => Self::CollectingParameters,
            InteractionStage::Points => Self::CollectingPoints,
            InteractionStage::Curve => Self::CollectingCurve,
        }
    }
}

impl fmt::Display for CoordinatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the coordinator asks the provider for.
#[derive(Debug, Clone, PartialEq)]
pub enum StageRequest {
    /// Editable parameters (chart placeholders excluded).
    Parameters(Vec<ParameterDescriptor>),
    Points(PointSelectionSpec),
    Curve { hint: String },
}

impl StageRequest {
    pub fn stage(&self) -> InteractionStage {
        match self {
            Self::Parameters(_) => InteractionStage::Parameters,
            Self::Points(_) => InteractionStage::Points,
            Self::Curve { .. } => InteractionStage::Curve,
        }
    }
}

/// A curve picked during the curve stage.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveChoice {
    pub id: String,
    pub curve: Curve,
}

impl CurveChoice {
    pub fn new(id: impl Into<String>, curve: Curve) -> Self {
        Self { id: id.into(), curve }
    }
}

/// Input supplied for one stage.
#[derive(Debug, Clone, PartialEq)]
pub enum StageInput {
    Parameters(HashMap<String, ParamValue>),
    Points(Vec<Sample>),
    Curve(Vec<CurveChoice>),
}

impl StageInput {
    pub fn stage(&self) -> InteractionStage {
        match self {
            Self::Parameters(_) => InteractionStage::Parameters,
            Self::Points(_) => InteractionStage::Points,
            Self::Curve(_) => InteractionStage::Curve,
        }
    }
}

/// Source of user input for interaction stages.
///
/// Returning `None` declines the stage and cancels the invocation.
pub trait InteractionProvider {
    fn request(&mut self, request: &StageRequest) -> Option<StageInput>;
}

impl<F> InteractionProvider for F
where
    F: FnMut(&StageRequest) -> Option<StageInput>,
{
    fn request(&mut self, request: &StageRequest) -> Option<StageInput> {
        self(request)
    }
}

/// Numeric back end invoked once all input is collected.
///
/// Returns only the entries it produced; the coordinator merges the
/// descriptor's `produces` keys into the final context.
pub trait AnalysisEngine {
    fn run(&self, descriptor: &AlgorithmDescriptor, context: &ExecutionContext) -> Result<ExecutionContext>;
}

impl<F> AnalysisEngine for F
where
    F: Fn(&AlgorithmDescriptor, &ExecutionContext) -> Result<ExecutionContext>,
{
    fn run(&self, descriptor: &AlgorithmDescriptor, context: &ExecutionContext) -> Result<ExecutionContext> {
        self(descriptor, context)
    }
}

/// State machine for one algorithm invocation.
#[derive(Debug)]
pub struct InteractionCoordinator {
    descriptor: AlgorithmDescriptor,
    state: CoordinatorState,
    stages: Vec<InteractionStage>,
    cursor: usize,
    context: ExecutionContext,
}

impl InteractionCoordinator {
    pub fn new(descriptor: &AlgorithmDescriptor) -> Self {
        Self {
            descriptor: descriptor.clone(),
            state: CoordinatorState::NotStarted,
            stages: Vec::new(),
            cursor: 0,
            context: ExecutionContext::new(),
        }
    }

    pub fn state(&self) -> &CoordinatorState {
        &self.state
    }

    pub fn descriptor(&self) -> &AlgorithmDescriptor {
        &self.descriptor
    }

    /// Stages that will run, resolved by [`start`](Self::start).
    pub fn stages(&self) -> &[InteractionStage] {
        &self.stages
    }

    /// Stage currently waiting for input.
    pub fn current_stage(&self) -> Option<InteractionStage> {
        match self.state {
            CoordinatorState::CollectingParameters
            | CoordinatorState::CollectingPoints
            | CoordinatorState::CollectingCurve => self.stages.get(self.cursor).copied(),
            _ => None,
        }
    }

    /// Request to hand to a provider for the current stage.
    pub fn current_request(&self) -> Option<StageRequest> {
        self.current_stage().map(|stage| self.request_for(stage))
    }

    /// Resolve the stages and advance to the first one that needs input.
    ///
    /// Prerequisites present in `inbound` are copied into the context.
    /// Returns `None` when the coordinator went straight to `Ready`.
    pub fn start(&mut self, inbound: &ExecutionContext) -> Result<Option<InteractionStage>> {
        self.expect_state(CoordinatorState::NotStarted, "start")?;

        if let Err(e) = self.descriptor.validate() {
            return Err(self.fail(e));
        }
        self.stages = match self.descriptor.resolved_stages() {
            Ok(stages) => stages,
            Err(e) => return Err(self.fail(e)),
        };

        for key in &self.descriptor.prerequisites {
            if let Some(value) = inbound.get(key) {
                self.context.insert(key.clone(), value.clone());
            } else {
                debug!(algorithm = %self.descriptor.name, key = %key, "prerequisite absent from inbound context");
            }
        }

        self.cursor = 0;
        Ok(self.advance())
    }

    /// Validate and store input for the current stage, then advance.
    pub fn submit(&mut self, input: StageInput) -> Result<Option<InteractionStage>> {
        let stage = match self.current_stage() {
            Some(stage) => stage,
            None => {
                return Err(Error::InvalidTransition {
                    state: self.state.name().to_string(),
                    action: "submit",
                })
            }
        };

        if input.stage() != stage {
            return Err(self.fail(Error::validation(format!(
                "expected {} input, got {}",
                stage,
                input.stage()
            ))));
        }

        let collected = match self.collect(input) {
            Ok(collected) => collected,
            Err(e) => return Err(self.fail(e)),
        };
        self.context.merge(collected);

        self.cursor += 1;
        Ok(self.advance())
    }

    /// Run the engine on the collected context.
    ///
    /// On success the returned context holds the inbound prerequisites, the
    /// collected values and every key listed in `produces`.
    pub fn execute(&mut self, engine: &dyn AnalysisEngine) -> Result<ExecutionContext> {
        self.expect_state(CoordinatorState::Ready, "execute")?;
        self.transition(CoordinatorState::Executing);

        let mut output = match engine.run(&self.descriptor, &self.context) {
            Ok(output) => output,
            Err(e) => return Err(self.fail(e)),
        };

        let mut context = std::mem::take(&mut self.context);
        let produces = self.descriptor.produces.clone();
        for key in &produces {
            match output.remove(key) {
                Some(value) => {
                    context.insert(key.as_str(), value);
                }
                None => {
                    let err = Error::Algorithm(format!(
                        "`{}` did not produce `{}`",
                        self.descriptor.name, key
                    ));
                    return Err(self.fail(err));
                }
            }
        }
        for key in output.keys() {
            warn!(algorithm = %self.descriptor.name, key = %key, "dropping undeclared engine output");
        }

        self.transition(CoordinatorState::Completed);
        Ok(context)
    }

    /// Drive every stage through `provider`, then execute.
    pub fn run(
        &mut self,
        provider: &mut dyn InteractionProvider,
        engine: &dyn AnalysisEngine,
        inbound: &ExecutionContext,
    ) -> Result<ExecutionContext> {
        let mut pending = self.start(inbound)?;

        while let Some(stage) = pending {
            let request = self.request_for(stage);
            let input = match provider.request(&request) {
                Some(input) => input,
                None => {
                    let err = Error::Cancelled(format!(
                        "{} stage of `{}` declined",
                        stage, self.descriptor.name
                    ));
                    return Err(self.fail(err));
                }
            };
            pending = self.submit(input)?;
        }

        self.execute(engine)
    }

    fn request_for(&self, stage: InteractionStage) -> StageRequest {
        match stage {
            InteractionStage::Parameters => StageRequest::Parameters(self.editable_parameters().cloned().collect()),
            InteractionStage::Points => {
                StageRequest::Points(self.descriptor.point_selection.clone().unwrap_or_default())
            }
            InteractionStage::Curve => StageRequest::Curve {
                hint: self
                    .descriptor
                    .metadata
                    .get(CURVE_HINT_KEY)
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_CURVE_HINT.to_string()),
            },
        }
    }

    fn editable_parameters(&self) -> impl Iterator<Item = &ParameterDescriptor> {
        self.descriptor.parameters.iter().filter(|p| !p.is_chart_placeholder())
    }

    /// Skip vacuous stages; stop at the next stage needing input or at Ready.
    fn advance(&mut self) -> Option<InteractionStage> {
        while let Some(&stage) = self.stages.get(self.cursor) {
            if self.is_vacuous(stage) {
                debug!(algorithm = %self.descriptor.name, stage = %stage, "stage satisfied without input");
                if stage == InteractionStage::Points {
                    self.context.insert(POINTS, Vec::<Sample>::new());
                }
                self.cursor += 1;
                continue;
            }
            self.transition(CoordinatorState::collecting(stage));
            return Some(stage);
        }
        self.transition(CoordinatorState::Ready);
        None
    }

    fn is_vacuous(&self, stage: InteractionStage) -> bool {
        match stage {
            InteractionStage::Parameters => self.editable_parameters().next().is_none(),
            InteractionStage::Points => self
                .descriptor
                .point_selection
                .as_ref()
                .map_or(true, PointSelectionSpec::is_vacuous),
            InteractionStage::Curve => false,
        }
    }

    fn collect(&self, input: StageInput) -> Result<ExecutionContext> {
        let mut collected = ExecutionContext::new();
        match input {
            StageInput::Parameters(values) => {
                for name in values.keys() {
                    match self.descriptor.parameter(name) {
                        None => {
                            return Err(Error::validation(format!(
                                "`{}` has no parameter `{}`",
                                self.descriptor.name, name
                            )))
                        }
                        Some(p) if p.is_chart_placeholder() => {
                            return Err(Error::validation(format!(
                                "parameter `{}` is filled by point selection",
                                name
                            )))
                        }
                        Some(_) => {}
                    }
                }
                for p in self.editable_parameters() {
                    if let Some(value) = p.resolve(values.get(&p.name))? {
                        collected.insert(p.context_key(), value);
                    }
                }
            }
            StageInput::Points(points) => {
                if let Some(spec) = &self.descriptor.point_selection {
                    spec.check(&points)?;
                }
                collected.insert(POINTS, points);
            }
            StageInput::Curve(mut choices) => {
                if choices.len() != 1 {
                    return Err(Error::validation(format!(
                        "exactly one curve must be selected, got {}",
                        choices.len()
                    )));
                }
                let CurveChoice { id, curve } = choices.remove(0);
                collected.insert(SELECTED_CURVE_ID, ContextValue::CurveRef(id));
                collected.insert(SELECTED_CURVE, curve);
            }
        }
        Ok(collected)
    }

    fn expect_state(&self, expected: CoordinatorState, action: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(Error::InvalidTransition {
                state: self.state.name().to_string(),
                action,
            })
        }
    }

    fn transition(&mut self, next: CoordinatorState) {
        debug!(
            algorithm = %self.descriptor.name,
            from = %self.state,
            to = %next,
            "coordinator transition"
        );
        self.state = next;
    }

    fn fail(&mut self, err: Error) -> Error {
        self.context = ExecutionContext::new();
        self.transition(CoordinatorState::Failed(err.clone()));
        err
    }
}
