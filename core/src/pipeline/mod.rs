// crewline/src/pipeline/mod.rs

//! Defines the `Pipeline` stage chain, its execution, and stage hooks.

pub mod definition;
pub mod execution;
pub mod hooks;

pub use definition::{Pipeline, PipelineKind};
pub use execution::{ExecutionReport, Executor};
pub use hooks::{StageEvent, StageHooks, StageStatus};
