// crewline/server/src/errors.rs

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use crewline::CrewError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  /// Inbound payload was not a `{"message": string}` object.
  #[error("Malformed Message: {0}")]
  MalformedMessage(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Crew Error: {source}")]
  Crew {
    #[from]
    source: CrewError,
  },

  /// A run reached `Failed`; carries the user-facing error text.
  #[error("Pipeline Failed: {0}")]
  Pipeline(String),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) | AppError::MalformedMessage(_) => StatusCode::BAD_REQUEST,
      AppError::Config(_) | AppError::Crew { .. } | AppError::Pipeline(_) | AppError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    tracing::error!(application_error = %self, "Responding with error");
    let body = match self {
      AppError::Validation(m) => json!({"error": m}),
      AppError::MalformedMessage(m) => json!({"error": "Invalid message format", "detail": m}),
      AppError::Config(m) => json!({"error": "Configuration issue", "detail": m}),
      AppError::Crew { source } => {
        tracing::error!(crew_error_source = ?source, "Crew error details");
        json!({"error": "Crew processing error", "detail": source.to_string()})
      }
      AppError::Pipeline(m) => json!({"error": "Pipeline failed", "detail": m}),
      AppError::Internal(m) => json!({"error": "An internal error occurred", "detail": m}),
    };
    HttpResponse::build(self.status_code()).json(body)
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
