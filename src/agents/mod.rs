// file: src/agents/mod.rs
// description: agent definitions module exports
// reference: internal module structure

pub mod agent;
pub mod roster;

pub use agent::AgentSpec;
pub use roster::builtin_agents;
