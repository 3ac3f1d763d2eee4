// crewline/server/src/services/mock_gateway.rs

//! Offline stand-in for a real model (`GATEWAY_MODE=mock`). Replies are
//! deterministic per role and delayed to mimic network latency.

use async_trait::async_trait;
use crewline::{role_names, GatewayError, InferenceGateway, Role};
use serde_json::json;
use std::time::Duration;
use tracing::info;

const STYLE_KEYWORDS: [&str; 12] = [
  "color", "colour", "font", "background", "bigger", "smaller", "bold", "style", "theme", "border", "darker",
  "lighter",
];

const COLOURS: [&str; 10] = [
  "red", "blue", "green", "yellow", "orange", "purple", "pink", "black", "white", "gray",
];

#[derive(Debug, Clone)]
pub struct MockGateway {
  latency: Duration,
}

impl MockGateway {
  pub fn new(latency: Duration) -> Self {
    Self { latency }
  }

  fn classify(request: &str) -> String {
    let lowered = request.to_lowercase();
    let is_style = STYLE_KEYWORDS.iter().any(|k| lowered.contains(k))
      || COLOURS.iter().any(|c| lowered.split(|ch: char| !ch.is_alphanumeric()).any(|w| w == *c));
    if is_style {
      json!({"type": "style", "instructions": request, "elements": guess_elements(&lowered)}).to_string()
    } else {
      json!({"type": "research", "query": request}).to_string()
    }
  }

  fn stylize(instructions: &str) -> String {
    let lowered = instructions.to_lowercase();
    let colour = COLOURS.iter().find(|c| lowered.contains(*c)).copied();
    let mut changes = serde_json::Map::new();
    match colour {
      Some(c) if lowered.contains("background") => {
        changes.insert("background-color".into(), json!(c));
      }
      Some(c) => {
        changes.insert("color".into(), json!(c));
      }
      None => {}
    }
    if lowered.contains("bigger") || lowered.contains("larger") {
      changes.insert("font-size".into(), json!("1.25em"));
    }
    if lowered.contains("smaller") {
      changes.insert("font-size".into(), json!("0.85em"));
    }
    if lowered.contains("bold") {
      changes.insert("font-weight".into(), json!("bold"));
    }
    if changes.is_empty() {
      return "I could not find a concrete visual property to change.".to_string();
    }
    serde_json::Value::Object(changes).to_string()
  }
}

impl Default for MockGateway {
  fn default() -> Self {
    Self::new(Duration::from_millis(150))
  }
}

fn guess_elements(lowered: &str) -> String {
  let found: Vec<&str> = ["button", "header", "footer", "title", "link", "text", "page"]
    .into_iter()
    .filter(|e| lowered.contains(e))
    .collect();
  if found.is_empty() {
    "page".to_string()
  } else {
    found.join(", ")
  }
}

/// Text between `marker` and the next blank line.
fn section<'a>(prompt: &'a str, marker: &str) -> &'a str {
  prompt
    .split_once(marker)
    .map(|(_, rest)| rest.split("\n\n").next().unwrap_or(rest))
    .unwrap_or(prompt)
    .trim()
}

#[async_trait]
impl InferenceGateway for MockGateway {
  async fn infer(&self, role: &Role, prompt: &str) -> Result<String, GatewayError> {
    info!(role = %role.name, "Simulating inference call");
    tokio::time::sleep(self.latency).await; // Simulate network latency

    let reply = match role.name.as_str() {
      role_names::ROUTER => Self::classify(section(prompt, "Request: ")),
      role_names::STYLIST => Self::stylize(section(prompt, "Instructions: ")),
      role_names::RESEARCHER => format!(
        "Research notes (mock): {}",
        section(prompt, "Gather information on: ")
      ),
      role_names::ANALYST => "Analysis (mock): the research notes point to one central finding.".to_string(),
      role_names::WRITER => "Here is what I found (mock answer). The research and analysis agree on the main point."
        .to_string(),
      other => {
        return Err(GatewayError::InvalidResponse(format!(
          "mock gateway has no behaviour for role '{}'",
          other
        )))
      }
    };
    Ok(reply)
  }

  fn name(&self) -> &str {
    "mock"
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crewline::{Crew, FinalOutput, PipelineKind, RunState};
  use std::sync::Arc;

  #[test]
  fn keyword_classifier_spots_style_requests() {
    let reply = MockGateway::classify("Make the button red");
    assert!(reply.contains(r#""type":"style""#));
    assert!(reply.contains("button"));
    let reply = MockGateway::classify("What is the capital of France?");
    assert!(reply.contains(r#""type":"research""#));
  }

  #[test]
  fn stylist_maps_colours_to_properties() {
    assert_eq!(MockGateway::stylize("make the button red"), r#"{"color":"red"}"#);
    assert_eq!(
      MockGateway::stylize("make the background blue"),
      r#"{"background-color":"blue"}"#
    );
  }

  #[tokio::test]
  async fn mock_crew_runs_both_branches() {
    let crew = Crew::with_standard_roles(Arc::new(MockGateway::new(Duration::ZERO))).unwrap();

    let run = crew.handle("make the button red").await;
    assert_eq!(run.kind(), Some(PipelineKind::Style));
    assert!(matches!(run.final_output(), Some(FinalOutput::StyleChanges { changes, .. }) if changes["color"] == "red"));

    let run = crew.handle("Why is the sea salty?").await;
    assert_eq!(run.kind(), Some(PipelineKind::Research));
    assert_eq!(run.state(), RunState::Succeeded);
  }
}
