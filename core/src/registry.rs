// crewline/src/registry.rs

//! Defines `RoleRegistry`, the name-keyed set of roles available to pipelines.
//! The registry is filled once at startup and is read-only afterwards.

use crate::core::role::Role;
use crate::error::{CrewError, CrewResult};

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{event, Level};

/// Well-known role names used by the router and the pipeline builder.
pub mod role_names {
  pub const ROUTER: &str = "router";
  pub const STYLIST: &str = "stylist";
  pub const RESEARCHER: &str = "researcher";
  pub const ANALYST: &str = "analyst";
  pub const WRITER: &str = "writer";

  /// Every role the standard crew needs.
  pub const ALL: [&str; 5] = [ROUTER, STYLIST, RESEARCHER, ANALYST, WRITER];
}

/// Immutable name → role mapping.
#[derive(Debug, Clone)]
pub struct RoleRegistry {
  roles: HashMap<String, Arc<Role>>,
}

impl RoleRegistry {
  /// Builds a registry from `roles`. Fails on a repeated name.
  pub fn new(roles: impl IntoIterator<Item = Role>) -> CrewResult<Self> {
    let mut map = HashMap::new();
    for role in roles {
      if map.contains_key(&role.name) {
        event!(Level::ERROR, role = %role.name, "Duplicate role definition.");
        return Err(CrewError::DuplicateRole { name: role.name });
      }
      event!(Level::DEBUG, role = %role.name, delegation = role.delegation_allowed, "Registering role.");
      map.insert(role.name.clone(), Arc::new(role));
    }
    Ok(Self { roles: map })
  }

  /// The five roles of the standard crew.
  pub fn standard() -> Self {
    let roles = vec![
      Role::new(
        role_names::ROUTER,
        "Decide whether a request asks for information or for a change to the page's appearance",
        "You are a precise dispatcher. You answer only with the compact JSON decision you are asked for.",
        false,
      ),
      Role::new(
        role_names::STYLIST,
        "Turn styling requests into concrete visual property changes",
        "You are a front-end designer who expresses every change as CSS-like property/value pairs.",
        false,
      ),
      Role::new(
        role_names::RESEARCHER,
        "Find and provide accurate information",
        "You are an expert researcher who quickly finds relevant information.",
        true,
      ),
      Role::new(
        role_names::ANALYST,
        "Analyze information and extract insights",
        "You analyze data and information to extract meaningful insights.",
        true,
      ),
      Role::new(
        role_names::WRITER,
        "Communicate insights clearly and effectively",
        "You are skilled at presenting information in a clear, accessible manner.",
        true,
      ),
    ];
    // Names above are distinct constants.
    match Self::new(roles) {
      Ok(registry) => registry,
      Err(e) => unreachable!("standard role set is inconsistent: {e}"),
    }
  }

  /// Looks up a role by name.
  pub fn resolve(&self, name: &str) -> CrewResult<Arc<Role>> {
    self.roles.get(name).cloned().ok_or_else(|| {
      event!(Level::ERROR, role = %name, "Role not found in registry.");
      CrewError::UnknownRole { name: name.to_string() }
    })
  }

  pub fn contains(&self, name: &str) -> bool {
    self.roles.contains_key(name)
  }

  pub fn len(&self) -> usize {
    self.roles.len()
  }

  pub fn is_empty(&self) -> bool {
    self.roles.is_empty()
  }

  /// Registered role names, sorted.
  pub fn names(&self) -> Vec<&str> {
    let mut names: Vec<&str> = self.roles.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
  }
}

impl Default for RoleRegistry {
  fn default() -> Self {
    Self::standard()
  }
}
