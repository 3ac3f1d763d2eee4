// crewline/server/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::fmt;
use std::time::Duration;

/// Which `InferenceGateway` the server wires into the crew.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayMode {
  OpenAi,
  Mock,
}

impl std::str::FromStr for GatewayMode {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "openai" => Ok(GatewayMode::OpenAi),
      "mock" => Ok(GatewayMode::Mock),
      other => Err(AppError::Config(format!(
        "Invalid GATEWAY_MODE '{}': expected 'openai' or 'mock'",
        other
      ))),
    }
  }
}

/// Settings for the OpenAI-compatible chat completions backend.
#[derive(Clone)]
pub struct OpenAiSettings {
  pub api_key: String,
  pub base_url: String,
  pub model: String,
  pub temperature: f32,
  pub max_tokens: u32,
  pub timeout: Duration,
}

// The key must never reach the logs.
impl fmt::Debug for OpenAiSettings {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("OpenAiSettings")
      .field("api_key", &"[REDACTED]")
      .field("base_url", &self.base_url)
      .field("model", &self.model)
      .field("temperature", &self.temperature)
      .field("max_tokens", &self.max_tokens)
      .field("timeout", &self.timeout)
      .finish()
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub gateway_mode: GatewayMode,
  pub openai: OpenAiSettings,
  /// Requests a connection may queue behind its in-flight run.
  pub max_queued_requests: usize,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from an arbitrary variable source. `from_env` passes the
  /// process environment; tests pass a map.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get_env = |var_name: &str| {
      lookup(var_name)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Config(format!("Missing environment variable '{}'", var_name)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8000".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;

    let gateway_mode = get_env("GATEWAY_MODE")
      .unwrap_or_else(|_| "openai".to_string())
      .parse::<GatewayMode>()?;

    // Only the real backend needs a key.
    let api_key = match gateway_mode {
      GatewayMode::OpenAi => get_env("OPENAI_API_KEY")?,
      GatewayMode::Mock => get_env("OPENAI_API_KEY").unwrap_or_default(),
    };
    let base_url = get_env("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
    let model = get_env("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
    let temperature = get_env("OPENAI_TEMPERATURE")
      .unwrap_or_else(|_| "0.7".to_string())
      .parse::<f32>()
      .map_err(|e| AppError::Config(format!("Invalid OPENAI_TEMPERATURE: {}", e)))?;
    if !(0.0..=2.0).contains(&temperature) {
      return Err(AppError::Config(format!(
        "OPENAI_TEMPERATURE must be between 0 and 2, got {}",
        temperature
      )));
    }
    let max_tokens = get_env("OPENAI_MAX_TOKENS")
      .unwrap_or_else(|_| "1024".to_string())
      .parse::<u32>()
      .map_err(|e| AppError::Config(format!("Invalid OPENAI_MAX_TOKENS: {}", e)))?;
    let timeout_secs = get_env("GATEWAY_TIMEOUT_SECS")
      .unwrap_or_else(|_| "60".to_string())
      .parse::<u64>()
      .map_err(|e| AppError::Config(format!("Invalid GATEWAY_TIMEOUT_SECS: {}", e)))?;

    let max_queued_requests = get_env("MAX_QUEUED_REQUESTS")
      .unwrap_or_else(|_| "8".to_string())
      .parse::<usize>()
      .map_err(|e| AppError::Config(format!("Invalid MAX_QUEUED_REQUESTS: {}", e)))?;
    if max_queued_requests == 0 {
      return Err(AppError::Config("MAX_QUEUED_REQUESTS must be at least 1".to_string()));
    }

    let config = Self {
      server_host,
      server_port,
      gateway_mode,
      openai: OpenAiSettings {
        api_key,
        base_url,
        model,
        temperature,
        max_tokens,
        timeout: Duration::from_secs(timeout_secs),
      },
      max_queued_requests,
    };
    tracing::info!(config = ?config, "Application configuration loaded successfully.");
    Ok(config)
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |name| map.get(name).cloned()
  }

  #[test]
  fn mock_mode_uses_defaults() {
    let config = AppConfig::from_lookup(lookup(&[("GATEWAY_MODE", "mock")])).unwrap();
    assert_eq!(config.gateway_mode, GatewayMode::Mock);
    assert_eq!(config.bind_address(), "0.0.0.0:8000");
    assert_eq!(config.openai.model, "gpt-4o-mini");
    assert_eq!(config.openai.max_tokens, 1024);
    assert_eq!(config.openai.timeout, Duration::from_secs(60));
    assert_eq!(config.max_queued_requests, 8);
  }

  #[test]
  fn openai_mode_requires_a_key() {
    let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
    assert!(matches!(err, AppError::Config(ref m) if m.contains("OPENAI_API_KEY")));
  }

  #[test]
  fn invalid_values_are_rejected() {
    for (key, value) in [
      ("SERVER_PORT", "eighty"),
      ("GATEWAY_MODE", "carrier-pigeon"),
      ("OPENAI_TEMPERATURE", "9"),
      ("MAX_QUEUED_REQUESTS", "0"),
    ] {
      let result = AppConfig::from_lookup(lookup(&[("GATEWAY_MODE", "mock"), ("OPENAI_API_KEY", "k"), (key, value)]));
      assert!(matches!(result, Err(AppError::Config(_))), "{key}={value}");
    }
  }

  #[test]
  fn debug_output_hides_the_key() {
    let config = AppConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-secret-123")])).unwrap();
    let printed = format!("{:?}", config);
    assert!(!printed.contains("sk-secret-123"));
    assert!(printed.contains("[REDACTED]"));
  }
}
