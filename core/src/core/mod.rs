pub mod control;
pub mod role;
pub mod stage;

// Re-export key types for easier access from other crewline modules (and lib.rs)
pub use control::{FinalOutput, RunState, StageResult};
pub use role::Role;
pub use stage::{Stage, StageId};
