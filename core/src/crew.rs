// crewline/src/crew.rs

//! Defines `Crew`, the entry point that drives one `PipelineRun` per request:
//! route, build, execute, and shape the final output.

use crate::core::{FinalOutput, RunState, Stage, StageResult};
use crate::error::{CrewError, CrewResult};
use crate::gateway::InferenceGateway;
use crate::pipeline::{Executor, Pipeline, PipelineKind, StageHooks};
use crate::registry::RoleRegistry;
use crate::routing::{parse_style_changes, PipelineBuilder, Router, RoutingDecision};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{event, instrument, Level};

/// Everything one request produced. Owned by the task that processed it.
#[derive(Debug)]
pub struct PipelineRun {
  id: u64,
  request_text: String,
  state: RunState,
  decision: Option<RoutingDecision>,
  pipeline: Option<Pipeline>,
  results: Vec<StageResult>,
  final_output: Option<FinalOutput>,
  error: Option<String>,
}

impl PipelineRun {
  fn new(id: u64, request_text: &str) -> Self {
    Self {
      id,
      request_text: request_text.to_string(),
      state: RunState::Created,
      decision: None,
      pipeline: None,
      results: Vec::new(),
      final_output: None,
      error: None,
    }
  }

  fn advance(&mut self, next: RunState) {
    debug_assert!(
      self.state.can_advance_to(next),
      "illegal run transition {} -> {}",
      self.state,
      next
    );
    event!(Level::DEBUG, run_id = self.id, from = %self.state, to = %next, "Run state changed.");
    self.state = next;
  }

  fn fail(&mut self, error: CrewError) {
    event!(Level::ERROR, run_id = self.id, error = %error, "Run failed.");
    self.final_output = Some(FinalOutput::Error {
      message: format!("Sorry, an error occurred while processing your message: {}", error),
    });
    self.error = Some(error.to_string());
    self.advance(RunState::Failed);
  }

  pub fn id(&self) -> u64 {
    self.id
  }

  pub fn request_text(&self) -> &str {
    &self.request_text
  }

  pub fn state(&self) -> RunState {
    self.state
  }

  pub fn decision(&self) -> Option<&RoutingDecision> {
    self.decision.as_ref()
  }

  pub fn pipeline(&self) -> Option<&Pipeline> {
    self.pipeline.as_ref()
  }

  pub fn kind(&self) -> Option<PipelineKind> {
    self.pipeline.as_ref().map(Pipeline::kind)
  }

  pub fn stages(&self) -> &[Stage] {
    self.pipeline.as_ref().map(Pipeline::stages).unwrap_or_default()
  }

  pub fn results(&self) -> &[StageResult] {
    &self.results
  }

  pub fn final_output(&self) -> Option<&FinalOutput> {
    self.final_output.as_ref()
  }

  /// Description of the failure, for `Failed` runs.
  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  /// Sender label for the run's answer.
  pub fn sender(&self) -> &'static str {
    self.kind().map_or("crew", PipelineKind::sender)
  }
}

/// Routes requests and runs the resulting pipelines.
///
/// `Crew` is shared behind an `Arc`; each call to `handle`/`dispatch` creates
/// its own `PipelineRun`, so concurrent runs never share mutable state.
pub struct Crew {
  gateway: Arc<dyn InferenceGateway>,
  roles: RoleRegistry,
  router: Router,
  builder: PipelineBuilder,
  executor: Executor,
  next_run_id: AtomicU64,
}

impl Crew {
  /// Resolves every role the router and builder need. A missing role is a
  /// startup error (`UnknownRole`), never a per-request one.
  pub fn new(gateway: Arc<dyn InferenceGateway>, roles: RoleRegistry) -> CrewResult<Self> {
    let router = Router::new(&roles)?;
    let builder = PipelineBuilder::new(&roles)?;
    event!(Level::INFO, gateway = %gateway.name(), roles = ?roles.names(), "Crew assembled.");
    Ok(Self {
      executor: Executor::new(gateway.clone()),
      gateway,
      roles,
      router,
      builder,
      next_run_id: AtomicU64::new(1),
    })
  }

  pub fn with_standard_roles(gateway: Arc<dyn InferenceGateway>) -> CrewResult<Self> {
    Self::new(gateway, RoleRegistry::standard())
  }

  pub fn roles(&self) -> &RoleRegistry {
    &self.roles
  }

  pub fn router(&self) -> &Router {
    &self.router
  }

  pub fn builder(&self) -> &PipelineBuilder {
    &self.builder
  }

  pub fn gateway(&self) -> &Arc<dyn InferenceGateway> {
    &self.gateway
  }

  pub async fn handle(&self, request_text: &str) -> PipelineRun {
    self.handle_with_hooks(request_text, &StageHooks::default()).await
  }

  /// Processes one request to a terminal state. Always returns a run with a
  /// `final_output`; failures are reported inside the run, not as `Err`.
  #[instrument(name = "Crew::handle", skip_all, fields(run_id = tracing::field::Empty))]
  pub async fn handle_with_hooks(&self, request_text: &str, hooks: &StageHooks) -> PipelineRun {
    let run_id = self.next_run_id.fetch_add(1, Ordering::Relaxed);
    tracing::Span::current().record("run_id", run_id);
    let mut run = PipelineRun::new(run_id, request_text);

    run.advance(RunState::Routing);
    let decision = self.router.classify(self.gateway.as_ref(), request_text).await;

    run.advance(RunState::Building);
    let built = self.builder.build(&decision, request_text);
    let degraded = decision.is_unparsable();
    run.decision = Some(decision);
    let pipeline = match built {
      Ok(pipeline) => pipeline,
      Err(e) => {
        run.fail(e);
        return run;
      }
    };

    run.advance(RunState::Executing);
    let report = self.executor.run(&pipeline, hooks).await;
    let kind = pipeline.kind();
    run.pipeline = Some(pipeline);

    let final_text = report.final_text().map(str::to_string);
    run.results = report.results;
    match (report.error, final_text) {
      (Some(e), _) => run.fail(e),
      (None, Some(text)) => {
        run.final_output = Some(shape_output(kind, text));
        run.advance(if degraded { RunState::Degraded } else { RunState::Succeeded });
        event!(Level::INFO, pipeline = %kind, state = %run.state, "Run finished.");
      }
      (None, None) => run.fail(CrewError::Internal("pipeline finished without output".to_string())),
    }
    run
  }

  /// Runs `request_text` on its own task so the caller's loop is never blocked
  /// by gateway calls. A panic inside the run surfaces as the handle's
  /// `JoinError`.
  pub fn dispatch(self: &Arc<Self>, request_text: String, hooks: StageHooks) -> JoinHandle<PipelineRun> {
    let crew = Arc::clone(self);
    tokio::spawn(async move { crew.handle_with_hooks(&request_text, &hooks).await })
  }
}

fn shape_output(kind: PipelineKind, text: String) -> FinalOutput {
  if kind != PipelineKind::Style {
    return FinalOutput::Answer { text };
  }
  match parse_style_changes(&text) {
    Some(changes) => {
      let properties: Vec<&str> = changes.keys().map(String::as_str).collect();
      FinalOutput::StyleChanges {
        summary: format!("Applied {} style change(s): {}", changes.len(), properties.join(", ")),
        changes,
      }
    }
    None => {
      event!(Level::WARN, "Stylist output is not a property mapping; surfacing raw text.");
      FinalOutput::StyleUnavailable { raw_text: text }
    }
  }
}

impl std::fmt::Debug for Crew {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Crew")
      .field("gateway", &self.gateway.name())
      .field("roles", &self.roles.names())
      .finish()
  }
}
