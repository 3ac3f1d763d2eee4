// crewline/server/src/testing.rs

//! Shared fixtures for the server's unit tests.

use crate::config::AppConfig;
use crate::services::connections::ConnectionRegistry;
use crate::state::AppState;
use crewline::{Crew, ScriptedGateway};
use std::sync::Arc;

pub fn scripted_state(gateway: ScriptedGateway) -> AppState {
  let config = AppConfig::from_lookup(|name| (name == "GATEWAY_MODE").then(|| "mock".to_string()))
    .expect("mock config is valid");
  AppState {
    crew: Arc::new(Crew::with_standard_roles(Arc::new(gateway)).expect("standard roles resolve")),
    connections: Arc::new(ConnectionRegistry::new()),
    config: Arc::new(config),
  }
}
