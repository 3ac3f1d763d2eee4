// crewline/src/core/role.rs

//! Defines `Role`: the persona/goal configuration applied to an inference call.

/// A named persona applied to a generative-inference call.
///
/// Roles are defined once at startup and shared (behind `Arc`) by every stage
/// that uses them. They are never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
  pub name: String,
  pub goal: String,
  pub persona: String,
  pub delegation_allowed: bool,
}

impl Role {
  pub fn new(
    name: impl Into<String>,
    goal: impl Into<String>,
    persona: impl Into<String>,
    delegation_allowed: bool,
  ) -> Self {
    Self {
      name: name.into(),
      goal: goal.into(),
      persona: persona.into(),
      delegation_allowed,
    }
  }

  /// Text a gateway sends as the system instruction for this role.
  pub fn system_prompt(&self) -> String {
    format!("You are the {}. {}\nYour goal: {}", self.name, self.persona, self.goal)
  }
}
