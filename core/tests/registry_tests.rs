// tests/registry_tests.rs
mod common;

use common::*;
use crewline::{role_names, Crew, CrewError, Role, RoleRegistry, ScriptedGateway};
use std::sync::Arc;

#[test]
fn test_standard_registry_holds_every_crew_role() {
  setup_tracing();
  let registry = RoleRegistry::standard();

  assert_eq!(registry.len(), role_names::ALL.len());
  for name in role_names::ALL {
    assert!(registry.contains(name), "missing role {name}");
  }
  assert_eq!(
    registry.names(),
    vec!["analyst", "researcher", "router", "stylist", "writer"]
  );
}

#[test]
fn test_resolve_shares_one_role_instance() {
  let registry = RoleRegistry::standard();
  let first = registry.resolve(role_names::WRITER).unwrap();
  let second = registry.resolve(role_names::WRITER).unwrap();

  assert!(Arc::ptr_eq(&first, &second));
  assert!(first.delegation_allowed);
  assert_eq!(first.goal, "Communicate insights clearly and effectively");
}

#[test]
fn test_resolve_unknown_role_fails() {
  let registry = RoleRegistry::standard();
  let err = registry.resolve("poet").unwrap_err();
  assert!(matches!(err, CrewError::UnknownRole { ref name } if name == "poet"));
}

#[test]
fn test_duplicate_role_names_are_rejected() {
  let result = RoleRegistry::new([
    Role::new("writer", "g1", "p1", true),
    Role::new("writer", "g2", "p2", false),
  ]);
  assert!(matches!(result, Err(CrewError::DuplicateRole { ref name }) if name == "writer"));
}

#[test]
fn test_crew_refuses_registry_without_stylist() {
  setup_tracing();
  let registry = RoleRegistry::new(
    RoleRegistry::standard()
      .names()
      .into_iter()
      .filter(|name| *name != role_names::STYLIST)
      .map(|name| Role::new(name, "goal", "persona", false)),
  )
  .unwrap();

  let err = Crew::new(Arc::new(ScriptedGateway::new()), registry).unwrap_err();
  assert!(matches!(err, CrewError::UnknownRole { ref name } if name == role_names::STYLIST));
}

#[test]
fn test_system_prompt_mentions_persona_and_goal() {
  let role = Role::new("analyst", "Extract insights", "You read data closely.", true);
  let prompt = role.system_prompt();
  assert!(prompt.contains("analyst"));
  assert!(prompt.contains("You read data closely."));
  assert!(prompt.contains("Extract insights"));
}
