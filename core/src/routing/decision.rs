// crewline/src/routing/decision.rs

//! Defines `RoutingDecision` and the parser that turns a classifier's free-form
//! reply into one.

use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{event, Level};

/// The classified intent of a request.
///
/// `Unparsable` is not an error: it selects the fallback pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingDecision {
  Research { query: String },
  Style {
    instructions: String,
    target_elements: Vec<String>,
  },
  Unparsable { raw_text: String },
}

impl RoutingDecision {
  /// Parses a classifier reply for `request_text`.
  ///
  /// - a JSON object with `"type": "style"` becomes `Style`;
  /// - a JSON object with any other or no `type` becomes `Research` whose
  ///   query is always the original `request_text`, never a field of the reply;
  /// - anything else (prose, arrays, fields of the wrong JSON type) becomes
  ///   `Unparsable` carrying the raw reply.
  ///
  /// A Markdown code fence around the JSON is tolerated.
  pub fn parse(raw_reply: &str, request_text: &str) -> Self {
    let reply = match read_reply(raw_reply) {
      Ok(reply) => reply,
      Err(reason) => {
        event!(Level::WARN, %reason, "Classifier reply is not a structured decision.");
        return RoutingDecision::Unparsable {
          raw_text: raw_reply.to_string(),
        };
      }
    };

    match reply.kind.as_deref().map(str::trim) {
      Some(kind) if kind.eq_ignore_ascii_case("style") => {
        let instructions = reply
          .instructions
          .filter(|i| !i.trim().is_empty())
          .unwrap_or_else(|| request_text.to_string());
        RoutingDecision::Style {
          instructions,
          target_elements: reply.elements.map(Elements::into_vec).unwrap_or_default(),
        }
      }
      other => {
        if let Some(kind) = other.filter(|k| !k.eq_ignore_ascii_case("research")) {
          event!(Level::DEBUG, %kind, "Unrecognised decision type; routing to research.");
        }
        RoutingDecision::Research {
          query: request_text.to_string(),
        }
      }
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      RoutingDecision::Research { .. } => "research",
      RoutingDecision::Style { .. } => "style",
      RoutingDecision::Unparsable { .. } => "unparsable",
    }
  }

  pub fn is_unparsable(&self) -> bool {
    matches!(self, RoutingDecision::Unparsable { .. })
  }
}

/// Shape the classifier is asked to produce. Other fields (`query`, a
/// free-text `reason`, ...) are ignored.
#[derive(Debug, Deserialize)]
struct ClassifierReply {
  #[serde(rename = "type", default)]
  kind: Option<String>,
  #[serde(default)]
  instructions: Option<String>,
  #[serde(default)]
  elements: Option<Elements>,
}

fn read_reply(raw_reply: &str) -> Result<ClassifierReply, String> {
  let value: serde_json::Value = serde_json::from_str(strip_code_fence(raw_reply)).map_err(|e| e.to_string())?;
  if !value.is_object() {
    return Err("reply is not a JSON object".to_string());
  }
  serde_json::from_value(value).map_err(|e| e.to_string())
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Elements {
  Many(Vec<String>),
  One(String),
}

impl Elements {
  fn into_vec(self) -> Vec<String> {
    let raw = match self {
      Elements::Many(items) => items,
      Elements::One(item) => item.split(',').map(str::to_string).collect(),
    };
    raw
      .into_iter()
      .map(|e| e.trim().to_string())
      .filter(|e| !e.is_empty())
      .collect()
  }
}

/// Removes a surrounding ```` ``` ```` / ```` ```json ```` fence, if present.
pub fn strip_code_fence(text: &str) -> &str {
  let trimmed = text.trim();
  let Some(rest) = trimmed.strip_prefix("```") else {
    return trimmed;
  };
  // Drop the info string ("json") on the opening line.
  let rest = match rest.find('\n') {
    Some(newline) => &rest[newline + 1..],
    None => strip_info_word(rest),
  };
  rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

// Single-line fence: "json {...}" loses its leading tag; "{...}" is untouched.
fn strip_info_word(rest: &str) -> &str {
  let word_len = rest.find(|c: char| !c.is_ascii_alphanumeric()).unwrap_or(rest.len());
  match rest[word_len..].chars().next() {
    Some(c) if word_len > 0 && (c.is_whitespace() || c == '{' || c == '[') => &rest[word_len..],
    _ => rest,
  }
}

/// Reads a stylist reply as a mapping of visual property → value.
///
/// The reply must be a non-empty JSON object (optionally fenced). String values
/// are kept as-is; numbers and booleans are rendered with their JSON text.
/// Nested objects, arrays and nulls make the whole reply unreadable.
pub fn parse_style_changes(text: &str) -> Option<BTreeMap<String, String>> {
  let value: serde_json::Value = serde_json::from_str(strip_code_fence(text)).ok()?;
  let object = value.as_object()?;
  if object.is_empty() {
    return None;
  }
  let mut changes = BTreeMap::new();
  for (property, value) in object {
    let rendered = match value {
      serde_json::Value::String(s) => s.clone(),
      serde_json::Value::Number(n) => n.to_string(),
      serde_json::Value::Bool(b) => b.to_string(),
      _ => return None,
    };
    changes.insert(property.clone(), rendered);
  }
  Some(changes)
}
