// crewline/src/pipeline/definition.rs

//! Contains the `Pipeline` struct: an ordered chain of stages built for one
//! classified intent, and the checks that keep its dependency wiring acyclic.

use crate::core::stage::{Stage, StageId};
use crate::error::{CrewError, CrewResult};
use std::fmt;

/// Which builder branch produced a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineKind {
  /// research → analysis → writing
  Research,
  /// single stylist stage
  Style,
  /// single research stage, used when classification was unparsable
  Fallback,
}

impl PipelineKind {
  pub fn as_str(self) -> &'static str {
    match self {
      PipelineKind::Research => "research",
      PipelineKind::Style => "style",
      PipelineKind::Fallback => "fallback",
    }
  }

  /// Sender label used for this pipeline's answers.
  pub fn sender(self) -> &'static str {
    match self {
      PipelineKind::Research | PipelineKind::Fallback => "crew",
      PipelineKind::Style => "style",
    }
  }
}

impl fmt::Display for PipelineKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// An ordered list of stages.
///
/// Every stage's `depends_on` may only name stages that were pushed before it,
/// so the chain can never contain a forward or cyclic reference. Stage ids
/// are unique within the pipeline.
#[derive(Debug, Clone)]
pub struct Pipeline {
  kind: PipelineKind,
  stages: Vec<Stage>,
}

impl Pipeline {
  pub fn new(kind: PipelineKind) -> Self {
    Self {
      kind,
      stages: Vec::new(),
    }
  }

  /// Builds a pipeline from `stages` in order, checking each as it is added.
  pub fn from_stages(kind: PipelineKind, stages: impl IntoIterator<Item = Stage>) -> CrewResult<Self> {
    let mut pipeline = Self::new(kind);
    for stage in stages {
      pipeline.push_stage(stage)?;
    }
    Ok(pipeline)
  }

  /// Appends `stage` at the end of the chain.
  pub fn push_stage(&mut self, stage: Stage) -> CrewResult<()> {
    self.ensure_stage_not_exists(stage.id())?;
    for dependency in stage.depends_on() {
      if !self.contains(dependency) {
        return Err(CrewError::InvalidDependency {
          stage_id: stage.id().to_string(),
          dependency: dependency.to_string(),
        });
      }
    }
    self.stages.push(stage);
    Ok(())
  }

  fn ensure_stage_not_exists(&self, id: &StageId) -> CrewResult<()> {
    if self.contains(id) {
      return Err(CrewError::DuplicateStage {
        stage_id: id.to_string(),
      });
    }
    Ok(())
  }

  pub fn contains(&self, id: &StageId) -> bool {
    self.stages.iter().any(|s| s.id() == id)
  }

  pub fn kind(&self) -> PipelineKind {
    self.kind
  }

  pub fn stages(&self) -> &[Stage] {
    &self.stages
  }

  pub fn stage(&self, id: &str) -> Option<&Stage> {
    self.stages.iter().find(|s| s.id() == id)
  }

  pub fn stage_ids(&self) -> Vec<&str> {
    self.stages.iter().map(|s| s.id().as_str()).collect()
  }

  pub fn len(&self) -> usize {
    self.stages.len()
  }

  pub fn is_empty(&self) -> bool {
    self.stages.is_empty()
  }

  /// True when `stage` transitively depends on `upstream`.
  pub fn depends_transitively(&self, stage: &str, upstream: &str) -> bool {
    let Some(start) = self.stage(stage) else {
      return false;
    };
    let mut pending: Vec<&StageId> = start.depends_on().iter().collect();
    let mut seen: Vec<&StageId> = Vec::new();
    while let Some(id) = pending.pop() {
      if id == upstream {
        return true;
      }
      if seen.contains(&id) {
        continue;
      }
      seen.push(id);
      if let Some(s) = self.stage(id.as_str()) {
        pending.extend(s.depends_on().iter());
      }
    }
    false
  }
}
