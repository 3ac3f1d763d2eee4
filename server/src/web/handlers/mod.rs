// crewline/server/src/web/handlers/mod.rs

// Declare handler modules
pub mod health_handlers;
pub mod message_handlers;
pub mod ws_handlers;
