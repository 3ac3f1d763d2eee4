// crewline/src/routing/builder.rs

//! Implements the `PipelineBuilder`, which turns a `RoutingDecision` into a
//! concrete stage chain. Construction is pure: no I/O happens here.

use crate::core::role::Role;
use crate::core::stage::Stage;
use crate::error::CrewResult;
use crate::pipeline::definition::{Pipeline, PipelineKind};
use crate::registry::{role_names, RoleRegistry};
use crate::routing::decision::RoutingDecision;

use std::sync::Arc;
use tracing::{event, Level};

pub mod stage_ids {
  pub const STYLE: &str = "style";
  pub const RESEARCH: &str = "research";
  pub const ANALYSIS: &str = "analysis";
  pub const WRITING: &str = "writing";
}

/// Holds the roles every branch needs, resolved once.
///
/// The writing stage of the research pipeline always receives both the
/// research and the analysis outputs, in that order.
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
  stylist: Arc<Role>,
  researcher: Arc<Role>,
  analyst: Arc<Role>,
  writer: Arc<Role>,
}

impl PipelineBuilder {
  /// Fails with `UnknownRole` if any role a branch uses is not registered.
  pub fn new(registry: &RoleRegistry) -> CrewResult<Self> {
    Ok(Self {
      stylist: registry.resolve(role_names::STYLIST)?,
      researcher: registry.resolve(role_names::RESEARCHER)?,
      analyst: registry.resolve(role_names::ANALYST)?,
      writer: registry.resolve(role_names::WRITER)?,
    })
  }

  /// Builds the pipeline for `decision`. `request_text` is the original
  /// request; the fallback branch uses it directly as its query.
  pub fn build(&self, decision: &RoutingDecision, request_text: &str) -> CrewResult<Pipeline> {
    let pipeline = match decision {
      RoutingDecision::Style {
        instructions,
        target_elements,
      } => Pipeline::from_stages(PipelineKind::Style, [self.style_stage(instructions, target_elements)])?,
      RoutingDecision::Research { query } => Pipeline::from_stages(
        PipelineKind::Research,
        [
          self.research_stage(query),
          self.analysis_stage(),
          self.writing_stage(),
        ],
      )?,
      RoutingDecision::Unparsable { .. } => {
        Pipeline::from_stages(PipelineKind::Fallback, [self.research_stage(request_text)])?
      }
    };
    event!(
      Level::DEBUG,
      decision = decision.label(),
      pipeline = %pipeline.kind(),
      stages = ?pipeline.stage_ids(),
      "Pipeline built."
    );
    Ok(pipeline)
  }

  fn style_stage(&self, instructions: &str, target_elements: &[String]) -> Stage {
    let targets = if target_elements.is_empty() {
      "whichever elements the instructions refer to".to_string()
    } else {
      target_elements.join(", ")
    };
    Stage::new(
      stage_ids::STYLE,
      self.stylist.clone(),
      format!(
        "Translate this styling request into concrete visual property changes.\nInstructions: {}\nTarget elements: {}",
        instructions, targets
      ),
      r#"A single JSON object mapping visual property names (for example "color", "background-color", "font-size") to their new values as strings, and nothing else."#,
    )
  }

  fn research_stage(&self, query: &str) -> Stage {
    Stage::new(
      stage_ids::RESEARCH,
      self.researcher.clone(),
      format!("Gather information on: {}", query),
      "Comprehensive research findings on the given topic",
    )
  }

  fn analysis_stage(&self) -> Stage {
    Stage::new(
      stage_ids::ANALYSIS,
      self.analyst.clone(),
      "Analyze the research findings and identify the key insights.",
      "Analysis report with key insights from the research",
    )
    .after(stage_ids::RESEARCH)
  }

  fn writing_stage(&self) -> Stage {
    Stage::new(
      stage_ids::WRITING,
      self.writer.clone(),
      "Produce the final answer for the user, based on the research findings and their analysis.",
      "Final response for the user, clear and self-contained",
    )
    .after(stage_ids::RESEARCH)
    .after(stage_ids::ANALYSIS)
  }
}
