//! LLM integration module

pub mod azure;
pub mod probe;
pub mod prompts;
pub mod provider;
