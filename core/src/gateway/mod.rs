// crewline/src/gateway/mod.rs

//! Defines the `InferenceGateway` trait: the opaque capability that turns a
//! (role, prompt) pair into generated text.

pub mod scripted;

use crate::core::role::Role;
use crate::error::GatewayError;
use async_trait::async_trait;

pub use scripted::{GatewayCall, ScriptedGateway};

/// A generative-inference backend.
///
/// Implementations own their transport, credentials and timeouts. The core
/// calls `infer` once per stage, never retries, and treats any `Err` as a
/// failure of that stage.
#[async_trait]
pub trait InferenceGateway: Send + Sync {
  /// Runs one inference call for `role` with the fully composed `prompt`.
  async fn infer(&self, role: &Role, prompt: &str) -> Result<String, GatewayError>;

  /// Short name used in logs.
  fn name(&self) -> &str {
    "gateway"
  }
}
