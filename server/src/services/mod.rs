// crewline/server/src/services/mod.rs

pub mod connections;
pub mod mock_gateway;
pub mod openai_gateway;
