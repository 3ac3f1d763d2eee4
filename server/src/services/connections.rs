// crewline/server/src/services/connections.rs

//! Registry of open WebSocket connections. It is the only state shared and
//! mutated across connections, so every access goes through one lock.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ConnectionInfo {
  pub id: Uuid,
  pub connected_at: DateTime<Utc>,
  pub peer: Option<String>,
}

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
  active: Mutex<HashMap<Uuid, ConnectionInfo>>,
}

impl ConnectionRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Records a new connection and returns its id.
  pub fn register(&self, peer: Option<String>) -> Uuid {
    let info = ConnectionInfo {
      id: Uuid::new_v4(),
      connected_at: Utc::now(),
      peer,
    };
    let id = info.id;
    let mut active = self.active.lock();
    active.insert(id, info);
    info!(connection_id = %id, total = active.len(), "New connection. Total connections: {}", active.len());
    id
  }

  /// Removes `id`. Unknown ids are ignored, so a double close is harmless.
  pub fn unregister(&self, id: &Uuid) -> Option<ConnectionInfo> {
    let mut active = self.active.lock();
    let removed = active.remove(id);
    if let Some(ref info) = removed {
      let open_for = Utc::now() - info.connected_at;
      info!(
        connection_id = %id,
        total = active.len(),
        open_secs = open_for.num_seconds(),
        "Connection closed. Total connections: {}",
        active.len()
      );
    }
    removed
  }

  pub fn count(&self) -> usize {
    self.active.lock().len()
  }

  pub fn get(&self, id: &Uuid) -> Option<ConnectionInfo> {
    self.active.lock().get(id).cloned()
  }
}
