// crewline/server/src/models/mod.rs

//! Wire shapes exchanged with clients.

pub mod frames;

pub use frames::{FrameKind, HealthResponse, InboundMessage, MessageResponse, OutboundFrame};
