// crewline/server/src/services/openai_gateway.rs

//! `InferenceGateway` backed by an OpenAI-compatible chat completions API.
//! The role's persona and goal become the system message; the composed stage
//! prompt becomes the user message.

use crate::config::OpenAiSettings;
use crate::errors::{AppError, Result as AppResult};
use async_trait::async_trait;
use crewline::{GatewayError, InferenceGateway, Role};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
  role: &'a str,
  content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
  model: &'a str,
  messages: Vec<ChatMessage<'a>>,
  temperature: f32,
  max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
  #[serde(default)]
  choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
  message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
  #[serde(default)]
  content: Option<String>,
}

pub struct OpenAiGateway {
  settings: OpenAiSettings,
  http: reqwest::Client,
}

impl OpenAiGateway {
  pub fn new(settings: OpenAiSettings) -> AppResult<Self> {
    let http = reqwest::Client::builder()
      .timeout(settings.timeout)
      .build()
      .map_err(|e| AppError::Config(format!("Could not build HTTP client: {}", e)))?;
    Ok(Self { settings, http })
  }

  fn completions_url(&self) -> String {
    let base = self.settings.base_url.trim_end_matches('/');
    format!("{base}/chat/completions")
  }
}

#[async_trait]
impl InferenceGateway for OpenAiGateway {
  #[instrument(name = "OpenAiGateway::infer", skip_all, fields(role = %role.name, model = %self.settings.model))]
  async fn infer(&self, role: &Role, prompt: &str) -> Result<String, GatewayError> {
    let system_prompt = role.system_prompt();
    let request = ChatRequest {
      model: &self.settings.model,
      messages: vec![
        ChatMessage {
          role: "system",
          content: &system_prompt,
        },
        ChatMessage {
          role: "user",
          content: prompt,
        },
      ],
      temperature: self.settings.temperature,
      max_tokens: self.settings.max_tokens,
    };

    debug!(prompt_len = prompt.len(), "sending chat completion request");
    let response = self
      .http
      .post(self.completions_url())
      .bearer_auth(&self.settings.api_key)
      .json(&request)
      .send()
      .await
      .map_err(|e| GatewayError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      warn!(status = status.as_u16(), "chat completion request rejected");
      return Err(match status.as_u16() {
        401 | 403 => GatewayError::Auth(body),
        429 => GatewayError::Quota(body),
        code => GatewayError::Status { status: code, body },
      });
    }

    let parsed: ChatResponse = response
      .json()
      .await
      .map_err(|e| GatewayError::InvalidResponse(format!("failed to parse response: {e}")))?;

    let content = parsed
      .choices
      .into_iter()
      .next()
      .and_then(|choice| choice.message.content)
      .ok_or_else(|| GatewayError::InvalidResponse("response carried no message content".to_string()))?;

    debug!(reply_len = content.len(), "chat completion response received");
    Ok(content)
  }

  fn name(&self) -> &str {
    "openai"
  }
}
