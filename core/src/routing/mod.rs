// crewline/src/routing/mod.rs

//! Intent routing: classify a request, then pick the builder branch for it.
//!
//! The `Router` issues one classification stage and parses the reply into a
//! `RoutingDecision`. The `PipelineBuilder` maps every decision variant,
//! including `Unparsable`, to a stage chain with an exhaustive `match`.

pub mod builder;
pub mod decision;
pub mod router;

pub use builder::{stage_ids, PipelineBuilder};
pub use decision::{parse_style_changes, RoutingDecision};
pub use router::Router;
