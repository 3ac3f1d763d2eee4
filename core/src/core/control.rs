// crewline/src/core/control.rs

//! Defines the outcome of a single stage and the lifecycle of a pipeline run.

use super::StageId;
use std::collections::BTreeMap;
use std::fmt;

/// Recorded outcome of one stage invocation.
///
/// `error_detail` is present exactly when the stage did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageResult {
  stage_id: StageId,
  output_text: String,
  error_detail: Option<String>,
}

impl StageResult {
  pub fn success(stage_id: StageId, output_text: impl Into<String>) -> Self {
    Self {
      stage_id,
      output_text: output_text.into(),
      error_detail: None,
    }
  }

  pub fn failure(stage_id: StageId, error_detail: impl Into<String>) -> Self {
    Self {
      stage_id,
      output_text: String::new(),
      error_detail: Some(error_detail.into()),
    }
  }

  pub fn stage_id(&self) -> &StageId {
    &self.stage_id
  }

  pub fn output_text(&self) -> &str {
    &self.output_text
  }

  pub fn succeeded(&self) -> bool {
    self.error_detail.is_none()
  }

  pub fn error_detail(&self) -> Option<&str> {
    self.error_detail.as_deref()
  }
}

/// Lifecycle of one pipeline run.
///
/// `Created → Routing → Building → Executing → {Succeeded | Degraded | Failed}`.
/// `Degraded` means the fallback pipeline completed; `Failed` means a stage
/// errored, whichever pipeline was running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
  Created,
  Routing,
  Building,
  Executing,
  Succeeded,
  Degraded,
  Failed,
}

impl RunState {
  pub fn is_terminal(self) -> bool {
    matches!(self, RunState::Succeeded | RunState::Degraded | RunState::Failed)
  }

  /// Whether `self → next` is an edge of the run lifecycle.
  /// Any non-terminal state may jump to `Failed`.
  pub fn can_advance_to(self, next: RunState) -> bool {
    use RunState::*;
    match (self, next) {
      (Created, Routing) | (Routing, Building) | (Building, Executing) => true,
      (Executing, Succeeded) | (Executing, Degraded) => true,
      (from, Failed) => !from.is_terminal(),
      _ => false,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      RunState::Created => "created",
      RunState::Routing => "routing",
      RunState::Building => "building",
      RunState::Executing => "executing",
      RunState::Succeeded => "succeeded",
      RunState::Degraded => "degraded",
      RunState::Failed => "failed",
    }
  }
}

impl fmt::Display for RunState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// What a finished run hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalOutput {
  /// Plain text answer (research and fallback pipelines).
  Answer { text: String },
  /// Style pipeline output interpreted as visual-property changes.
  StyleChanges {
    summary: String,
    changes: BTreeMap<String, String>,
  },
  /// Style pipeline output that could not be read as a property mapping.
  StyleUnavailable { raw_text: String },
  /// The run failed; `message` is meant for the caller.
  Error { message: String },
}

impl FinalOutput {
  pub fn is_error(&self) -> bool {
    matches!(self, FinalOutput::Error { .. })
  }

  /// Caller-facing message text.
  pub fn message(&self) -> String {
    match self {
      FinalOutput::Answer { text } => text.clone(),
      FinalOutput::StyleChanges { summary, .. } => summary.clone(),
      FinalOutput::StyleUnavailable { raw_text } => format!(
        "The style changes could not be read as structured properties; raw stylist output follows.\n\n{}",
        raw_text
      ),
      FinalOutput::Error { message } => message.clone(),
    }
  }
}
