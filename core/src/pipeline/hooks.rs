// crewline/src/pipeline/hooks.rs

//! Observers for stage execution. Hooks registered with `before_stage` fire
//! right before a stage's gateway call, `after_stage` hooks right after its
//! result is recorded. Hooks observe only; they cannot change control flow.

use crate::core::stage::Stage;
use crate::core::StageResult;

/// Status carried by a `StageEvent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
  Started,
  Succeeded,
  Failed,
}

impl StageStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      StageStatus::Started => "active",
      StageStatus::Succeeded => "completed",
      StageStatus::Failed => "failed",
    }
  }
}

/// Snapshot of a stage transition, owned so hooks can forward it freely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageEvent {
  pub stage_id: String,
  pub role: String,
  /// Zero-based position in the pipeline.
  pub index: usize,
  pub total: usize,
  pub status: StageStatus,
}

impl StageEvent {
  pub(crate) fn started(stage: &Stage, index: usize, total: usize) -> Self {
    Self {
      stage_id: stage.id().to_string(),
      role: stage.role().name.clone(),
      index,
      total,
      status: StageStatus::Started,
    }
  }

  pub(crate) fn finished(stage: &Stage, result: &StageResult, index: usize, total: usize) -> Self {
    Self {
      status: if result.succeeded() {
        StageStatus::Succeeded
      } else {
        StageStatus::Failed
      },
      ..Self::started(stage, index, total)
    }
  }
}

pub type StageHook = Box<dyn Fn(&StageEvent) + Send + Sync>;

#[derive(Default)]
pub struct StageHooks {
  before: Vec<StageHook>,
  after: Vec<StageHook>,
}

impl StageHooks {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers a hook fired before each stage runs.
  pub fn before_stage(&mut self, hook: impl Fn(&StageEvent) + Send + Sync + 'static) -> &mut Self {
    self.before.push(Box::new(hook));
    self
  }

  /// Registers a hook fired after each stage's result is recorded.
  pub fn after_stage(&mut self, hook: impl Fn(&StageEvent) + Send + Sync + 'static) -> &mut Self {
    self.after.push(Box::new(hook));
    self
  }

  pub fn is_empty(&self) -> bool {
    self.before.is_empty() && self.after.is_empty()
  }

  pub(crate) fn fire_before(&self, event: &StageEvent) {
    for hook in &self.before {
      hook(event);
    }
  }

  pub(crate) fn fire_after(&self, event: &StageEvent) {
    for hook in &self.after {
      hook(event);
    }
  }
}

impl std::fmt::Debug for StageHooks {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StageHooks")
      .field("before", &self.before.len())
      .field("after", &self.after.len())
      .finish()
  }
}
