// crewline/src/gateway/scripted.rs

//! A gateway with fixed, per-role replies. Used by tests, benches and demos
//! in place of a real inference backend.

use super::InferenceGateway;
use crate::core::role::Role;
use crate::error::GatewayError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tracing::{event, Level};

/// One recorded `infer` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayCall {
  pub role: String,
  pub prompt: String,
}

#[derive(Debug, Clone)]
enum Reply {
  Text(String),
  Fail(String),
}

/// Replies are queued per role name. Each call consumes the front of the
/// role's queue, except that the last entry is kept and repeated, so a role
/// scripted once answers every call the same way. A role with no script
/// fails with `GatewayError::InvalidResponse`.
#[derive(Debug, Default)]
pub struct ScriptedGateway {
  replies: Mutex<HashMap<String, VecDeque<Reply>>>,
  calls: Mutex<Vec<GatewayCall>>,
  latency: Option<Duration>,
}

impl ScriptedGateway {
  pub fn new() -> Self {
    Self::default()
  }

  /// Queues a successful reply for `role`.
  pub fn reply(mut self, role: &str, text: impl Into<String>) -> Self {
    self.push(role, Reply::Text(text.into()));
    self
  }

  /// Queues a transport failure for `role`.
  pub fn fail(mut self, role: &str, detail: impl Into<String>) -> Self {
    self.push(role, Reply::Fail(detail.into()));
    self
  }

  /// Delays every reply, so tests can observe work that is still in flight.
  pub fn with_latency(mut self, latency: Duration) -> Self {
    self.latency = Some(latency);
    self
  }

  fn push(&mut self, role: &str, reply: Reply) {
    self.replies.get_mut().entry(role.to_string()).or_default().push_back(reply);
  }

  fn next_reply(&self, role: &str) -> Option<Reply> {
    let mut replies = self.replies.lock();
    let queue = replies.get_mut(role)?;
    if queue.len() > 1 {
      queue.pop_front()
    } else {
      queue.front().cloned()
    }
  }

  pub fn calls(&self) -> Vec<GatewayCall> {
    self.calls.lock().clone()
  }

  pub fn call_count(&self) -> usize {
    self.calls.lock().len()
  }

  /// Role names in call order.
  pub fn roles_called(&self) -> Vec<String> {
    self.calls.lock().iter().map(|c| c.role.clone()).collect()
  }

  pub fn calls_for(&self, role: &str) -> Vec<GatewayCall> {
    self.calls.lock().iter().filter(|c| c.role == role).cloned().collect()
  }
}

#[async_trait]
impl InferenceGateway for ScriptedGateway {
  async fn infer(&self, role: &Role, prompt: &str) -> Result<String, GatewayError> {
    self.calls.lock().push(GatewayCall {
      role: role.name.clone(),
      prompt: prompt.to_string(),
    });
    let reply = self.next_reply(&role.name);

    if let Some(latency) = self.latency {
      tokio::time::sleep(latency).await;
    }

    match reply {
      Some(Reply::Text(text)) => Ok(text),
      Some(Reply::Fail(detail)) => {
        event!(Level::DEBUG, role = %role.name, %detail, "Scripted gateway failing call.");
        Err(GatewayError::Transport(detail))
      }
      None => Err(GatewayError::InvalidResponse(format!(
        "no scripted reply for role '{}'",
        role.name
      ))),
    }
  }

  fn name(&self) -> &str {
    "scripted"
  }
}
