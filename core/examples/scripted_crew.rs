// crewline/examples/scripted_crew.rs

use crewline::{role_names, Crew, CrewResult, FinalOutput, ScriptedGateway, StageHooks};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> CrewResult<()> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Scripted Crew Example ---");

  // 1. A gateway with canned replies stands in for a real model.
  let gateway = ScriptedGateway::new()
    .reply(role_names::ROUTER, r#"{"type":"style","instructions":"make the header navy","elements":"header"}"#)
    .reply(role_names::ROUTER, r#"{"type":"research","query":"tides"}"#)
    .reply(role_names::ROUTER, "Hmm, hard to say.")
    .reply(role_names::STYLIST, r#"{"background-color":"navy","color":"white"}"#)
    .reply(role_names::RESEARCHER, "Tides are driven by the Moon's gravity.")
    .reply(role_names::ANALYST, "The Moon dominates; the Sun modulates (spring/neap).")
    .reply(role_names::WRITER, "Tides come mostly from the Moon's pull, with the Sun adding spring and neap cycles.");

  // 2. Assemble the crew with the standard roles.
  let crew = Arc::new(Crew::with_standard_roles(Arc::new(gateway))?);

  // 3. Report stage progress as it happens.
  for request in ["Make the header navy", "Why are there tides?", "Tides?"] {
    let mut hooks = StageHooks::new();
    hooks
      .before_stage(|e| info!(stage = %e.stage_id, "{}/{} started", e.index + 1, e.total))
      .after_stage(|e| info!(stage = %e.stage_id, status = e.status.as_str(), "stage finished"));

    let run = crew.dispatch(request.to_string(), hooks).await.map_err(|e| crewline::CrewError::Worker(e.to_string()))?;

    info!(request, state = %run.state(), sender = run.sender(), "run finished");
    match run.final_output() {
      Some(FinalOutput::StyleChanges { summary, changes }) => info!(%summary, ?changes, "style"),
      Some(output) => info!("answer: {}", output.message()),
      None => {}
    }
  }

  Ok(())
}
