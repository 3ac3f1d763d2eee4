// tests/pipeline_building_tests.rs
mod common;

use common::*;
use crewline::{
  role_names, stage_ids, CrewError, Pipeline, PipelineBuilder, PipelineKind, Role, RoleRegistry, RoutingDecision,
  Stage,
};
use std::sync::Arc;

fn builder() -> PipelineBuilder {
  PipelineBuilder::new(&RoleRegistry::standard()).unwrap()
}

#[test]
fn test_style_decision_builds_single_stylist_stage() {
  setup_tracing();
  let decision = RoutingDecision::Style {
    instructions: "make the button red".into(),
    target_elements: vec!["button".into()],
  };

  let pipeline = builder().build(&decision, "Make the button red").unwrap();

  assert_eq!(pipeline.kind(), PipelineKind::Style);
  assert_eq!(pipeline.stage_ids(), vec![stage_ids::STYLE]);
  let stage = &pipeline.stages()[0];
  assert_eq!(stage.role().name, role_names::STYLIST);
  assert!(stage.depends_on().is_empty());
  assert!(stage.instruction().contains("make the button red"));
  assert!(stage.instruction().contains("button"));
}

#[test]
fn test_research_decision_builds_three_stage_chain() {
  let decision = RoutingDecision::Research {
    query: "What is fusion?".into(),
  };

  let pipeline = builder().build(&decision, "What is fusion?").unwrap();

  assert_eq!(pipeline.kind(), PipelineKind::Research);
  assert_eq!(
    pipeline.stage_ids(),
    vec![stage_ids::RESEARCH, stage_ids::ANALYSIS, stage_ids::WRITING]
  );
  let roles: Vec<&str> = pipeline.stages().iter().map(|s| s.role().name.as_str()).collect();
  assert_eq!(roles, vec![role_names::RESEARCHER, role_names::ANALYST, role_names::WRITER]);

  let research = pipeline.stage(stage_ids::RESEARCH).unwrap();
  assert!(research.instruction().contains("What is fusion?"));
  assert!(research.depends_on().is_empty());

  let analysis = pipeline.stage(stage_ids::ANALYSIS).unwrap();
  assert_eq!(analysis.depends_on(), [stage_ids::RESEARCH]);

  let writing = pipeline.stage(stage_ids::WRITING).unwrap();
  assert_eq!(writing.depends_on(), [stage_ids::RESEARCH, stage_ids::ANALYSIS]);
  assert!(pipeline.depends_transitively(stage_ids::WRITING, stage_ids::RESEARCH));
}

#[test]
fn test_unparsable_decision_builds_fallback_on_request_text() {
  let decision = RoutingDecision::Unparsable {
    raw_text: "gibberish".into(),
  };

  let pipeline = builder().build(&decision, "Tell me about tides").unwrap();

  assert_eq!(pipeline.kind(), PipelineKind::Fallback);
  assert_eq!(pipeline.stage_ids(), vec![stage_ids::RESEARCH]);
  let stage = &pipeline.stages()[0];
  assert_eq!(stage.role().name, role_names::RESEARCHER);
  assert!(stage.instruction().contains("Tell me about tides"));
  assert!(!stage.instruction().contains("gibberish"));
}

#[test]
fn test_every_stage_dependency_precedes_it() {
  let decisions = [
    RoutingDecision::Research { query: "q".into() },
    RoutingDecision::Style {
      instructions: "i".into(),
      target_elements: vec![],
    },
    RoutingDecision::Unparsable { raw_text: "r".into() },
  ];
  for decision in decisions {
    let pipeline = builder().build(&decision, "q").unwrap();
    assert!(!pipeline.is_empty());
    for (idx, stage) in pipeline.stages().iter().enumerate() {
      for dependency in stage.depends_on() {
        let position = pipeline.stage_ids().iter().position(|id| *id == dependency.as_str());
        assert!(matches!(position, Some(p) if p < idx), "{} -> {}", stage.id(), dependency);
      }
    }
  }
}

#[test]
fn test_forward_dependency_is_rejected() {
  let role = Arc::new(Role::new("writer", "g", "p", false));
  let result = Pipeline::from_stages(
    PipelineKind::Research,
    [
      Stage::new("a", role.clone(), "do a", "a").after("b"),
      Stage::new("b", role, "do b", "b"),
    ],
  );
  assert!(matches!(
    result,
    Err(CrewError::InvalidDependency { ref stage_id, ref dependency }) if stage_id == "a" && dependency == "b"
  ));
}

#[test]
fn test_self_dependency_is_rejected() {
  let role = Arc::new(Role::new("writer", "g", "p", false));
  let result = Pipeline::from_stages(PipelineKind::Research, [Stage::new("a", role, "do a", "a").after("a")]);
  assert!(matches!(result, Err(CrewError::InvalidDependency { .. })));
}

#[test]
fn test_duplicate_stage_id_is_rejected() {
  let role = Arc::new(Role::new("writer", "g", "p", false));
  let mut pipeline = Pipeline::new(PipelineKind::Research);
  pipeline.push_stage(Stage::new("a", role.clone(), "x", "x")).unwrap();
  let err = pipeline.push_stage(Stage::new("a", role, "y", "y")).unwrap_err();
  assert!(matches!(err, CrewError::DuplicateStage { ref stage_id } if stage_id == "a"));
  assert_eq!(pipeline.len(), 1);
}
