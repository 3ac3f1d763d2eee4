// tests/common/mod.rs
#![allow(dead_code)] // Not every test file uses every helper

use crewline::{role_names, Crew, ScriptedGateway, StageEvent, StageHooks};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::Level;

// --- Canned classifier replies ---
pub const RESEARCH_DECISION: &str = r#"{"type":"research","query":"fusion energy"}"#;
pub const STYLE_DECISION: &str = r#"{"type":"style","instructions":"make the button red","elements":"button"}"#;
pub const PROSE_DECISION: &str = "I think this is about research, probably.";

pub const RESEARCH_FINDINGS: &str = "R: fusion is hard";
pub const ANALYSIS_REPORT: &str = "A: key insight";
pub const WRITTEN_ANSWER: &str = "W: final answer";

/// A gateway scripted for every non-router role of the research pipeline.
pub fn research_crew_gateway(decision: &str) -> ScriptedGateway {
  ScriptedGateway::new()
    .reply(role_names::ROUTER, decision)
    .reply(role_names::RESEARCHER, RESEARCH_FINDINGS)
    .reply(role_names::ANALYST, ANALYSIS_REPORT)
    .reply(role_names::WRITER, WRITTEN_ANSWER)
}

/// Builds a standard crew around `gateway`, keeping a handle for call inspection.
pub fn crew_with(gateway: ScriptedGateway) -> (Arc<Crew>, Arc<ScriptedGateway>) {
  let gateway = Arc::new(gateway);
  let crew = Crew::with_standard_roles(gateway.clone()).expect("standard roles resolve");
  (Arc::new(crew), gateway)
}

/// Hooks that record every stage event, before and after, in firing order.
pub fn recording_hooks() -> (StageHooks, Arc<Mutex<Vec<StageEvent>>>) {
  let events = Arc::new(Mutex::new(Vec::new()));
  let mut hooks = StageHooks::new();
  let before = events.clone();
  let after = events.clone();
  hooks
    .before_stage(move |event| before.lock().push(event.clone()))
    .after_stage(move |event| after.lock().push(event.clone()));
  (hooks, events)
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
