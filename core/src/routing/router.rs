// crewline/src/routing/router.rs

//! Implements the `Router`: one classification stage, one gateway call, and a
//! total mapping from the classifier's reply to a `RoutingDecision`.

use crate::core::role::Role;
use crate::core::stage::Stage;
use crate::error::CrewResult;
use crate::gateway::InferenceGateway;
use crate::pipeline::execution::compose_prompt;
use crate::registry::{role_names, RoleRegistry};
use crate::routing::decision::RoutingDecision;

use std::sync::Arc;
use tracing::{event, instrument, Level};

pub const CLASSIFICATION_STAGE: &str = "classification";

const CLASSIFICATION_SHAPE: &str = r#"A single compact JSON object and nothing else: either {"type":"research","query":"<topic>"} for requests seeking information, or {"type":"style","instructions":"<what to change>","elements":"<page elements affected>"} for requests to change the page's appearance."#;

#[derive(Debug, Clone)]
pub struct Router {
  classifier: Arc<Role>,
}

impl Router {
  /// Resolves the classifier role; fails with `UnknownRole` when it is missing.
  pub fn new(registry: &RoleRegistry) -> CrewResult<Self> {
    Ok(Self {
      classifier: registry.resolve(role_names::ROUTER)?,
    })
  }

  /// The single stage the router sends to the gateway. It has no dependencies.
  pub fn classification_stage(&self, request_text: &str) -> Stage {
    Stage::new(
      CLASSIFICATION_STAGE,
      self.classifier.clone(),
      format!(
        "Classify the following user request. Answer \"style\" only if it asks to change colours, fonts, sizes, \
         spacing or other visual properties of page elements; otherwise answer \"research\".\n\nRequest: {}",
        request_text
      ),
      CLASSIFICATION_SHAPE,
    )
  }

  /// Classifies `request_text` with exactly one gateway call.
  ///
  /// Never fails: a gateway error is not retried and becomes
  /// `RoutingDecision::Unparsable` with the error detail as its raw text, so
  /// the caller still runs the fallback pipeline.
  #[instrument(name = "Router::classify", skip_all, fields(gateway = %gateway.name(), request_len = request_text.len()))]
  pub async fn classify(&self, gateway: &dyn InferenceGateway, request_text: &str) -> RoutingDecision {
    let stage = self.classification_stage(request_text);
    let prompt = compose_prompt(&stage, "");

    let decision = match gateway.infer(stage.role(), &prompt).await {
      Ok(reply) => RoutingDecision::parse(&reply, request_text),
      Err(e) => {
        event!(Level::WARN, error = %e, "Classification call failed; falling back.");
        RoutingDecision::Unparsable {
          raw_text: format!("classification failed: {}", e),
        }
      }
    };
    event!(Level::INFO, decision = decision.label(), "Request classified.");
    decision
  }
}
