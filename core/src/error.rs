// crewline/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Failure reported by an inference gateway for a single call.
///
/// Gateways map their transport-specific problems onto these variants. The
/// core never retries on any of them.
#[derive(Debug, Error)]
pub enum GatewayError {
  #[error("Gateway transport failure: {0}")]
  Transport(String),

  #[error("Gateway rejected the credentials: {0}")]
  Auth(String),

  #[error("Gateway quota or rate limit exhausted: {0}")]
  Quota(String),

  #[error("Gateway returned HTTP {status}: {body}")]
  Status { status: u16, body: String },

  #[error("Gateway returned an unreadable response: {0}")]
  InvalidResponse(String),

  #[error("Gateway failure. Source: {0}")]
  Other(#[from] AnyhowError),
}

#[derive(Debug, Error)]
pub enum CrewError {
  #[error("Unknown role: {name}")]
  UnknownRole { name: String },

  #[error("Role '{name}' is registered more than once")]
  DuplicateRole { name: String },

  #[error("Stage '{stage_id}' already exists in the pipeline")]
  DuplicateStage { stage_id: String },

  #[error("Stage '{stage_id}' depends on '{dependency}', which does not precede it in the pipeline")]
  InvalidDependency { stage_id: String, dependency: String },

  #[error("Gateway failure in stage '{stage_id}'. Source: {source}")]
  GatewayFailure {
    stage_id: String,
    #[source]
    source: GatewayError,
  },

  #[error("Stage '{stage_id}' produced no usable output")]
  EmptyOutput { stage_id: String },

  #[error("Pipeline worker did not finish: {0}")]
  Worker(String),

  #[error("Internal crewline error: {0}")]
  Internal(String),
}

impl CrewError {
  /// The stage a run-level failure is attributed to, if any.
  pub fn stage_id(&self) -> Option<&str> {
    match self {
      CrewError::GatewayFailure { stage_id, .. } | CrewError::EmptyOutput { stage_id } => Some(stage_id),
      _ => None,
    }
  }
}

pub type CrewResult<T, E = CrewError> = std::result::Result<T, E>;
