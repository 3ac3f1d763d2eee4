// tests/crew_scenarios_tests.rs
mod common;

use common::*;
use crewline::{
  role_names, stage_ids, FinalOutput, PipelineKind, RoutingDecision, RunState, ScriptedGateway, StageHooks,
};
use serial_test::serial;
use std::time::{Duration, Instant};

#[tokio::test]
#[serial]
async fn test_research_request_runs_three_stages() {
  setup_tracing();
  let (crew, gateway) = crew_with(research_crew_gateway(
    r#"{"type":"research","query":"capital of France"}"#,
  ));

  let run = crew.handle("What is the capital of France?").await;

  assert_eq!(run.state(), RunState::Succeeded);
  assert_eq!(run.kind(), Some(PipelineKind::Research));
  assert_eq!(run.sender(), "crew");
  assert_eq!(
    run.decision(),
    Some(&RoutingDecision::Research {
      query: "What is the capital of France?".into()
    })
  );
  let ids: Vec<&str> = run.stages().iter().map(|s| s.id().as_str()).collect();
  assert_eq!(ids, vec![stage_ids::RESEARCH, stage_ids::ANALYSIS, stage_ids::WRITING]);
  assert_eq!(
    run.final_output(),
    Some(&FinalOutput::Answer {
      text: WRITTEN_ANSWER.into()
    })
  );
  // One classification call plus one per stage.
  assert_eq!(gateway.call_count(), 1 + run.stages().len());
}

#[tokio::test]
#[serial]
async fn test_style_request_yields_style_changes() {
  setup_tracing();
  let (crew, gateway) = crew_with(
    ScriptedGateway::new()
      .reply(
        role_names::ROUTER,
        r#"{"type":"style","instructions":"change button color to red","elements":"button"}"#,
      )
      .reply(role_names::STYLIST, r#"{"color": "red"}"#),
  );

  let run = crew.handle("make the button red").await;

  assert_eq!(run.state(), RunState::Succeeded);
  assert_eq!(run.kind(), Some(PipelineKind::Style));
  assert_eq!(run.sender(), "style");
  match run.final_output() {
    Some(FinalOutput::StyleChanges { summary, changes }) => {
      assert_eq!(changes.get("color").map(String::as_str), Some("red"));
      assert!(summary.contains("color"));
    }
    other => panic!("expected style changes, got {other:?}"),
  }
  assert_eq!(gateway.roles_called(), vec![role_names::ROUTER, role_names::STYLIST]);
  assert!(gateway.calls_for(role_names::STYLIST)[0]
    .prompt
    .contains("change button color to red"));
}

#[tokio::test]
#[serial]
async fn test_prose_classification_runs_fallback() {
  setup_tracing();
  let (crew, gateway) = crew_with(research_crew_gateway("I'm not sure"));

  let run = crew.handle("Tell me about tides").await;

  assert_eq!(run.state(), RunState::Degraded);
  assert_eq!(run.kind(), Some(PipelineKind::Fallback));
  assert_eq!(run.sender(), "crew");
  assert!(run.decision().is_some_and(RoutingDecision::is_unparsable));
  assert_eq!(run.stages().len(), 1);
  assert!(run.stages()[0].instruction().contains("Tell me about tides"));
  assert_eq!(
    run.final_output(),
    Some(&FinalOutput::Answer {
      text: RESEARCH_FINDINGS.into()
    })
  );
  assert_eq!(gateway.roles_called(), vec![role_names::ROUTER, role_names::RESEARCHER]);
}

#[tokio::test]
#[serial]
async fn test_analysis_failure_fails_run_without_writing() {
  setup_tracing();
  let (crew, gateway) = crew_with(
    ScriptedGateway::new()
      .reply(role_names::ROUTER, RESEARCH_DECISION)
      .reply(role_names::RESEARCHER, RESEARCH_FINDINGS)
      .fail(role_names::ANALYST, "model overloaded")
      .reply(role_names::WRITER, WRITTEN_ANSWER),
  );

  let run = crew.handle("What is fusion energy?").await;

  assert_eq!(run.state(), RunState::Failed);
  let output = run.final_output().expect("failed runs still carry an output");
  assert!(output.is_error());
  assert!(output.message().starts_with("Sorry, an error occurred while processing your message"));
  assert!(run.error().is_some_and(|e| e.contains("analysis")));
  assert!(gateway.calls_for(role_names::WRITER).is_empty());
  assert_eq!(run.results().len(), 2);
}

#[tokio::test]
#[serial]
async fn test_fallback_failure_is_failed_not_degraded() {
  let (crew, _gateway) = crew_with(ScriptedGateway::new().fail(role_names::ROUTER, "down").fail(role_names::RESEARCHER, "down"));

  let run = crew.handle("anything").await;

  assert_eq!(run.kind(), Some(PipelineKind::Fallback));
  assert_eq!(run.state(), RunState::Failed);
}

#[tokio::test]
#[serial]
async fn test_unreadable_stylist_output_is_surfaced_raw() {
  let (crew, _gateway) = crew_with(
    ScriptedGateway::new()
      .reply(role_names::ROUTER, STYLE_DECISION)
      .reply(role_names::STYLIST, "Make it a warm red, like a fire truck."),
  );

  let run = crew.handle("Make the button red").await;

  assert_eq!(run.state(), RunState::Succeeded);
  match run.final_output() {
    Some(output @ FinalOutput::StyleUnavailable { raw_text }) => {
      assert_eq!(raw_text, "Make it a warm red, like a fire truck.");
      assert!(output.message().ends_with(raw_text.as_str()));
      assert!(!output.is_error());
    }
    other => panic!("expected raw stylist output, got {other:?}"),
  }
}

#[tokio::test]
#[serial]
async fn test_call_count_matches_stage_count() {
  let cases = [
    (RESEARCH_DECISION, 3),
    (PROSE_DECISION, 1),
  ];
  for (decision, stages) in cases {
    let (crew, gateway) = crew_with(research_crew_gateway(decision));
    let run = crew.handle("question").await;
    assert_eq!(run.stages().len(), stages);
    assert_eq!(gateway.call_count(), 1 + stages, "decision {decision}");
  }
}

#[tokio::test]
#[serial]
async fn test_runs_get_distinct_ids_and_terminal_states() {
  let (crew, _gateway) = crew_with(research_crew_gateway(RESEARCH_DECISION));
  let first = crew.handle("one").await;
  let second = crew.handle("two").await;
  assert_ne!(first.id(), second.id());
  assert!(first.state().is_terminal() && second.state().is_terminal());
  assert_eq!(second.request_text(), "two");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
async fn test_dispatched_runs_proceed_concurrently() {
  setup_tracing();
  let latency = Duration::from_millis(50);
  let (crew, gateway) = crew_with(research_crew_gateway(RESEARCH_DECISION).with_latency(latency));

  let started = Instant::now();
  let handles: Vec<_> = (0..4)
    .map(|i| crew.dispatch(format!("question {i}"), StageHooks::default()))
    .collect();
  let mut runs = Vec::new();
  for handle in handles {
    runs.push(handle.await.expect("run task completes"));
  }
  let elapsed = started.elapsed();

  assert!(runs.iter().all(|r| r.state() == RunState::Succeeded));
  assert_eq!(gateway.call_count(), 4 * 4);
  // Four sequential runs would need 16 round-trips.
  assert!(elapsed < latency * 12, "runs were serialised: {elapsed:?}");
}

#[tokio::test]
#[serial]
async fn test_dispatch_forwards_hooks() {
  let (crew, _gateway) = crew_with(research_crew_gateway(RESEARCH_DECISION));
  let (hooks, events) = recording_hooks();

  let run = crew.dispatch("What is fusion?".into(), hooks).await.unwrap();

  assert_eq!(run.state(), RunState::Succeeded);
  assert_eq!(events.lock().len(), 2 * run.stages().len());
}
