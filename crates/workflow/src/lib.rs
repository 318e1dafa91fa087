//! # Thermocurve Workflow
//!
//! Declarative algorithm descriptions and the machinery that runs them.
//!
//! This crate provides:
//! - `parameter` / `descriptor`: typed parameter model and algorithm descriptors
//! - `registry`: name → descriptor lookup, plain or behind a lock
//! - `context`: the typed key/value map handed to an engine
//! - `coordinator`: the stage-by-stage interaction state machine
//! - `builtin` / `executor`: the built-in catalogue and its engine
//! - `channel`: coordination on a background thread over crossbeam channels

pub mod builtin;
pub mod channel;
pub mod context;
pub mod coordinator;
pub mod descriptor;
pub mod executor;
pub mod messages;
pub mod parameter;
pub mod registry;

pub use builtin::{builtin_descriptors, default_registry};
pub use channel::{spawn_coordination, ChannelProvider, CoordinationHandle};
pub use context::{ContextValue, ExecutionContext};
pub use coordinator::{
    AnalysisEngine, CoordinatorState, CurveChoice, InteractionCoordinator, InteractionProvider,
    StageInput, StageRequest,
};
pub use descriptor::{AlgoCategory, AlgorithmDescriptor, InteractionStage, OutputPolicy, PointSelectionSpec};
pub use executor::BuiltinEngine;
pub use messages::{AnalysisMessage, LogEntry, LogLevel};
pub use parameter::{
    DoubleConstraint, EnumOption, IntConstraint, ParamKind, ParamType, ParamValue, ParameterDescriptor,
};
pub use registry::{DescriptorRegistry, SharedRegistry};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::context::*;
    pub use crate::coordinator::{
        AnalysisEngine, CoordinatorState, CurveChoice, InteractionCoordinator, InteractionProvider,
        StageInput, StageRequest,
    };
    pub use crate::descriptor::{AlgoCategory, AlgorithmDescriptor, InteractionStage, OutputPolicy, PointSelectionSpec};
    pub use crate::executor::BuiltinEngine;
    pub use crate::parameter::{ParamValue, ParameterDescriptor};
    pub use crate::registry::{DescriptorRegistry, SharedRegistry};
    pub use crate::{default_registry, spawn_coordination};
    pub use thermocurve_core::prelude::*;
}
