// crewline/src/pipeline/execution.rs

//! Contains the `Executor`, which runs a pipeline's stages in order against an
//! inference gateway, feeding each stage the outputs of the stages it depends on.

use crate::core::stage::Stage;
use crate::core::StageResult;
use crate::error::{CrewError, CrewResult};
use crate::gateway::InferenceGateway;
use crate::pipeline::definition::Pipeline;
use crate::pipeline::hooks::{StageEvent, StageHooks};

use std::sync::Arc;
use tracing::{event, instrument, span, Instrument, Level};

/// Results of executing one pipeline.
///
/// `results` holds one entry per stage that was attempted, in order. When a
/// stage fails, its (failed) result is the last entry and `error` says why.
#[derive(Debug)]
pub struct ExecutionReport {
  pub results: Vec<StageResult>,
  pub error: Option<CrewError>,
}

impl ExecutionReport {
  pub fn succeeded(&self) -> bool {
    self.error.is_none()
  }

  /// Output of the last stage, only when every stage succeeded.
  pub fn final_text(&self) -> Option<&str> {
    if !self.succeeded() {
      return None;
    }
    self.results.last().map(StageResult::output_text)
  }

  fn aborted(results: Vec<StageResult>, error: CrewError) -> Self {
    Self {
      results,
      error: Some(error),
    }
  }
}

/// Runs stages strictly sequentially: stage N+1 is not started before the
/// result of stage N is recorded. The first failure aborts the run and no
/// later stage is invoked.
#[derive(Clone)]
pub struct Executor {
  gateway: Arc<dyn InferenceGateway>,
}

impl Executor {
  pub fn new(gateway: Arc<dyn InferenceGateway>) -> Self {
    Self { gateway }
  }

  pub fn gateway(&self) -> &Arc<dyn InferenceGateway> {
    &self.gateway
  }

  #[instrument(
        name = "Executor::run",
        skip_all,
        fields(
            pipeline = %pipeline.kind(),
            num_stages = pipeline.len(),
            gateway = %self.gateway.name(),
        )
    )]
  pub async fn run(&self, pipeline: &Pipeline, hooks: &StageHooks) -> ExecutionReport {
    event!(Level::DEBUG, "Pipeline execution starting.");
    if pipeline.is_empty() {
      event!(Level::ERROR, "Pipeline has no stages.");
      return ExecutionReport::aborted(
        Vec::new(),
        CrewError::Internal(format!("{} pipeline has no stages", pipeline.kind())),
      );
    }

    let total = pipeline.len();
    let mut results: Vec<StageResult> = Vec::with_capacity(total);

    for (stage_idx, stage) in pipeline.stages().iter().enumerate() {
      let stage_span = span!(
        Level::INFO,
        "pipeline_stage_execution",
        stage_id = %stage.id(),
        role = %stage.role().name,
        stage_index = stage_idx,
      );

      let context = match assemble_context(stage, &results) {
        Ok(context) => context,
        Err(e) => {
          event!(parent: &stage_span, Level::ERROR, error = %e, "Could not assemble stage context.");
          results.push(StageResult::failure(stage.id().clone(), e.to_string()));
          return ExecutionReport::aborted(results, e);
        }
      };
      let prompt = compose_prompt(stage, &context);

      hooks.fire_before(&StageEvent::started(stage, stage_idx, total));
      event!(parent: &stage_span, Level::DEBUG, context_len = context.len(), "Invoking gateway.");

      let outcome = self.gateway.infer(stage.role(), &prompt).instrument(stage_span.clone()).await;

      let (result, failure) = match outcome {
        Ok(text) if text.trim().is_empty() => (
          StageResult::failure(stage.id().clone(), "stage produced empty output"),
          Some(CrewError::EmptyOutput {
            stage_id: stage.id().to_string(),
          }),
        ),
        Ok(text) => (StageResult::success(stage.id().clone(), text.trim()), None),
        Err(source) => (
          StageResult::failure(stage.id().clone(), source.to_string()),
          Some(CrewError::GatewayFailure {
            stage_id: stage.id().to_string(),
            source,
          }),
        ),
      };

      hooks.fire_after(&StageEvent::finished(stage, &result, stage_idx, total));
      results.push(result);

      if let Some(e) = failure {
        event!(parent: &stage_span, Level::ERROR, error = %e, "Stage failed; skipping remaining stages.");
        return ExecutionReport::aborted(results, e);
      }
      event!(parent: &stage_span, Level::DEBUG, "Stage finished successfully.");
    }

    event!(Level::DEBUG, "Pipeline execution completed successfully.");
    ExecutionReport { results, error: None }
  }
}

/// Concatenates the outputs of `stage`'s dependencies, in the order listed.
pub fn assemble_context(stage: &Stage, results: &[StageResult]) -> CrewResult<String> {
  let mut parts = Vec::with_capacity(stage.depends_on().len());
  for dependency in stage.depends_on() {
    let upstream = results
      .iter()
      .find(|r| r.stage_id() == dependency && r.succeeded())
      .ok_or_else(|| {
        CrewError::Internal(format!(
          "stage '{}' needs the output of '{}', which has not been recorded",
          stage.id(),
          dependency
        ))
      })?;
    parts.push(upstream.output_text());
  }
  Ok(parts.join("\n\n"))
}

/// The text sent to the gateway for `stage`.
pub fn compose_prompt(stage: &Stage, context: &str) -> String {
  let mut prompt = format!(
    "{}\n\nExpected output: {}",
    stage.instruction(),
    stage.expected_output()
  );
  if !context.is_empty() {
    prompt.push_str("\n\nContext from earlier stages:\n");
    prompt.push_str(context);
  }
  prompt
}
