// src/lib.rs

//! Crewline: an async request router and role-based inference pipeline for Rust.
//!
//! A free-form request is classified by one inference call, turned into a short
//! chain of stages, and executed against a pluggable `InferenceGateway`:
//!  - Named roles (persona + goal) shared by every stage that uses them.
//!  - Classification into a research or a style intent, with a fallback
//!    pipeline when the classifier's reply cannot be read.
//!  - Strictly sequential stages, each fed the outputs of the stages it
//!    depends on.
//!  - Before/after stage hooks for progress reporting.
//!  - A `Crew` facade that owns one `PipelineRun` per request and can dispatch
//!    runs onto their own tasks.

pub mod core;
pub mod crew;
pub mod error;
pub mod gateway;
pub mod pipeline;
pub mod registry;
pub mod routing;

// --- Re-exports for the Public API ---

pub use crate::core::{FinalOutput, Role, RunState, Stage, StageId, StageResult};

pub use crate::crew::{Crew, PipelineRun};

pub use crate::error::{CrewError, CrewResult, GatewayError};

pub use crate::gateway::{GatewayCall, InferenceGateway, ScriptedGateway};

pub use crate::pipeline::{ExecutionReport, Executor, Pipeline, PipelineKind, StageEvent, StageHooks, StageStatus};

pub use crate::registry::{role_names, RoleRegistry};

pub use crate::routing::{stage_ids, PipelineBuilder, RoutingDecision, Router};

/*
    Request flow:
    1. `Router::classify` sends one classification stage to the gateway and
       maps the reply to a `RoutingDecision` (never an error).
    2. `PipelineBuilder::build` turns the decision into a `Pipeline`:
       style → [style], research → [research, analysis, writing],
       unparsable → [research] on the raw request.
    3. `Executor::run` invokes each stage in order and stops at the first failure.
    4. `Crew` records all of it in a `PipelineRun` and shapes the `FinalOutput`.
*/
