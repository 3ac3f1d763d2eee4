// crewline/src/core/stage.rs

//! Defines the structure for a single stage within a pipeline.

use super::Role;
use std::fmt;
use std::sync::Arc;

/// Identifier of a stage, unique within one pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StageId(String);

impl StageId {
  pub fn new(id: impl Into<String>) -> Self {
    StageId(id.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for StageId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for StageId {
  fn from(id: &str) -> Self {
    StageId::new(id)
  }
}

impl PartialEq<str> for StageId {
  fn eq(&self, other: &str) -> bool {
    self.0 == other
  }
}

impl PartialEq<&str> for StageId {
  fn eq(&self, other: &&str) -> bool {
    self.0 == *other
  }
}

/// One role-bound unit of generative work.
///
/// A stage names the stages whose outputs it needs (`depends_on`) by id only.
/// The executor resolves those ids to recorded results when the stage runs,
/// so a stage never holds a reference to another stage.
///
/// Fields are private: once a stage has been handed to a `Pipeline` it cannot
/// change.
#[derive(Clone)]
pub struct Stage {
  id: StageId,
  role: Arc<Role>,
  instruction: String,
  depends_on: Vec<StageId>,
  expected_output: String,
}

impl Stage {
  pub fn new(
    id: impl Into<String>,
    role: Arc<Role>,
    instruction: impl Into<String>,
    expected_output: impl Into<String>,
  ) -> Self {
    Self {
      id: StageId::new(id),
      role,
      instruction: instruction.into(),
      depends_on: Vec::new(),
      expected_output: expected_output.into(),
    }
  }

  /// Adds an upstream dependency. Order of calls is the order in which
  /// upstream outputs are concatenated into this stage's context.
  pub fn after(mut self, upstream: impl Into<String>) -> Self {
    self.depends_on.push(StageId::new(upstream));
    self
  }

  pub fn id(&self) -> &StageId {
    &self.id
  }

  pub fn role(&self) -> &Arc<Role> {
    &self.role
  }

  pub fn instruction(&self) -> &str {
    &self.instruction
  }

  pub fn depends_on(&self) -> &[StageId] {
    &self.depends_on
  }

  pub fn expected_output(&self) -> &str {
    &self.expected_output
  }
}

// Role carries long persona text; keep Debug output to the wiring.
impl fmt::Debug for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Stage")
      .field("id", &self.id)
      .field("role", &self.role.name)
      .field("depends_on", &self.depends_on)
      .finish()
  }
}
