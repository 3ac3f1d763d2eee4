// crewline/server/src/state.rs
use crate::config::AppConfig;
use crate::services::connections::ConnectionRegistry;
use crewline::Crew;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub crew: Arc<Crew>,
  pub connections: Arc<ConnectionRegistry>,
  pub config: Arc<AppConfig>, // Share loaded config
}
