// crewline/server/src/main.rs

// Declare modules for the application
mod config;
mod errors;
mod models;
mod services;
mod state;
#[cfg(test)]
mod testing;
mod web;

use crate::config::{AppConfig, GatewayMode};
use crate::errors::Result as AppResult;
use crate::services::connections::ConnectionRegistry;
use crate::services::mock_gateway::MockGateway;
use crate::services::openai_gateway::OpenAiGateway;
use crate::state::AppState;

use actix_cors::Cors;
use actix_web::{web as actix_data, App, HttpServer};
use crewline::{Crew, InferenceGateway};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan; // For span events in tracing

fn build_gateway(config: &AppConfig) -> AppResult<Arc<dyn InferenceGateway>> {
  let gateway: Arc<dyn InferenceGateway> = match config.gateway_mode {
    GatewayMode::OpenAi => Arc::new(OpenAiGateway::new(config.openai.clone())?),
    GatewayMode::Mock => {
      tracing::warn!("Running with the mock inference gateway; answers are canned.");
      Arc::new(MockGateway::default())
    }
  };
  Ok(gateway)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO) // Default level
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE) // Log when spans close, showing duration
    .init();

  tracing::info!("Starting crewline server...");

  // Load application configuration
  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
    }
  };

  // A crew that cannot resolve its roles must not start serving.
  let crew = match build_gateway(&app_config).and_then(|gateway| Ok(Crew::with_standard_roles(gateway)?)) {
    Ok(crew) => Arc::new(crew),
    Err(e) => {
      tracing::error!(error = %e, "Failed to assemble the crew.");
      return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
    }
  };

  let app_state = AppState {
    crew,
    connections: Arc::new(ConnectionRegistry::new()),
    config: app_config.clone(),
  };

  let server_address = app_config.bind_address();
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone())) // Share AppState with handlers
      .wrap(Cors::permissive())
      .wrap(tracing_actix_web::TracingLogger::default()) // Actix middleware for tracing requests
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
