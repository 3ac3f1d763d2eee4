// crewline/server/src/web/handlers/health_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::instrument;

use crate::models::HealthResponse;
use crate::state::AppState;

pub const SERVICE_NAME: &str = "crewline";

/// Process status plus the number of open WebSocket connections.
#[instrument(name = "handler::health", skip(app_state))]
pub async fn health_handler(app_state: web::Data<AppState>) -> HttpResponse {
  HttpResponse::Ok().json(HealthResponse {
    status: "online".to_string(),
    service: SERVICE_NAME.to_string(),
    connections: app_state.connections.count(),
  })
}
