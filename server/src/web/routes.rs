// crewline/server/src/web/routes.rs

use actix_web::web;

use crate::errors::AppError;
use crate::web::handlers::{health_handlers, message_handlers, ws_handlers};

// Called in `main.rs` to configure services for the Actix App.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  // Unreadable `/message` bodies answer with the same JSON error shape as every other failure.
  let json_config = web::JsonConfig::default()
    .error_handler(|err, _req| AppError::MalformedMessage(err.to_string()).into());

  cfg
    .app_data(json_config)
    .route("/", web::get().to(health_handlers::health_handler))
    .route("/message", web::post().to(message_handlers::message_handler))
    .route("/ws", web::get().to(ws_handlers::ws_handler));
}
