// crewline/server/src/web/handlers/message_handlers.rs

use actix_web::{web, HttpResponse};
use crewline::{FinalOutput, RunState, StageHooks};
use tracing::{error, info, instrument};

use crate::errors::AppError;
use crate::models::{InboundMessage, MessageResponse};
use crate::state::AppState;

/// Single-shot alternative to the WebSocket: one request in, one answer out.
/// A failed run answers 500 with the failure text in the body.
#[instrument(name = "handler::message", skip(app_state, payload))]
pub async fn message_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<InboundMessage>,
) -> Result<HttpResponse, AppError> {
  let text = payload.into_inner().into_text()?;
  info!(request_len = text.len(), "Processing message over HTTP.");

  let run = app_state
    .crew
    .dispatch(text, StageHooks::default())
    .await
    .map_err(|e| {
      error!(error = %e, "Pipeline task did not complete.");
      AppError::Crew {
        source: crewline::CrewError::Worker(e.to_string()),
      }
    })?;

  if run.state() == RunState::Failed {
    let message = run
      .final_output()
      .map(FinalOutput::message)
      .unwrap_or_else(|| run.error().unwrap_or("pipeline failed").to_string());
    return Err(AppError::Pipeline(message));
  }

  let response = match run.final_output() {
    Some(FinalOutput::StyleChanges { summary, changes }) => MessageResponse {
      sender: run.sender().to_string(),
      message: summary.clone(),
      style_changes: Some(changes.clone()),
    },
    Some(output) => MessageResponse {
      sender: run.sender().to_string(),
      message: output.message(),
      style_changes: None,
    },
    None => return Err(AppError::Internal("run finished without output".to_string())),
  };
  Ok(HttpResponse::Ok().json(response))
}
