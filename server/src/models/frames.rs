// crewline/server/src/models/frames.rs

use crate::errors::{AppError, Result as AppResult};
use crewline::{FinalOutput, PipelineRun, StageEvent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SYSTEM_SENDER: &str = "system";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
  Ack,
  Error,
  Connection,
  Message,
  Style,
  Progress,
}

/// One JSON frame sent to a WebSocket client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundFrame {
  pub sender: String,
  #[serde(rename = "type")]
  pub kind: FrameKind,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub stage: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub style_changes: Option<BTreeMap<String, String>>,
}

impl OutboundFrame {
  fn new(sender: &str, kind: FrameKind, message: impl Into<String>) -> Self {
    Self {
      sender: sender.to_string(),
      kind,
      message: message.into(),
      status: None,
      stage: None,
      style_changes: None,
    }
  }

  pub fn connected() -> Self {
    Self {
      status: Some("connected".to_string()),
      ..Self::new(SYSTEM_SENDER, FrameKind::Connection, "Successfully connected to the server")
    }
  }

  pub fn ack() -> Self {
    Self::new(SYSTEM_SENDER, FrameKind::Ack, "Message received, processing...")
  }

  pub fn error(message: impl Into<String>) -> Self {
    Self::new(SYSTEM_SENDER, FrameKind::Error, message)
  }

  pub fn progress(event: &StageEvent) -> Self {
    Self {
      status: Some(event.status.as_str().to_string()),
      stage: Some(event.stage_id.clone()),
      ..Self::new(
        SYSTEM_SENDER,
        FrameKind::Progress,
        format!(
          "Stage {}/{} ({}) {}",
          event.index + 1,
          event.total,
          event.stage_id,
          event.status.as_str()
        ),
      )
    }
  }

  /// The frame that answers a finished run.
  pub fn from_run(run: &PipelineRun) -> Self {
    match run.final_output() {
      Some(FinalOutput::StyleChanges { summary, changes }) => Self {
        style_changes: Some(changes.clone()),
        ..Self::new(run.sender(), FrameKind::Style, summary.clone())
      },
      Some(output @ FinalOutput::Error { .. }) => Self::error(output.message()),
      Some(output) => Self::new(run.sender(), FrameKind::Message, output.message()),
      None => Self::error(format!("Run finished in state '{}' without output", run.state())),
    }
  }

  pub fn to_json(&self) -> String {
    // Only strings and string maps; serialisation cannot fail.
    serde_json::to_string(self)
      .unwrap_or_else(|_| String::from(r#"{"sender":"system","type":"error","message":"frame encoding failed"}"#))
  }
}

/// Body of an inbound request, over WebSocket or HTTP.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
  #[serde(default)]
  pub message: Option<String>,
}

impl InboundMessage {
  /// Parses a raw WebSocket text frame and returns the request text.
  pub fn parse(raw: &str) -> AppResult<String> {
    let inbound: InboundMessage =
      serde_json::from_str(raw).map_err(|e| AppError::MalformedMessage(format!("Invalid message format: {}", e)))?;
    inbound.into_text()
  }

  /// The non-blank request text.
  pub fn into_text(self) -> AppResult<String> {
    match self.message {
      Some(text) if !text.trim().is_empty() => Ok(text),
      _ => Err(AppError::Validation("Empty message received".to_string())),
    }
  }
}

/// Reply of the single-shot `/message` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageResponse {
  pub sender: String,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub style_changes: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
  pub status: String,
  pub service: String,
  pub connections: usize,
}
