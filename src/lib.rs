//! Resume retailor library

pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod output;
pub mod retailor;

pub use config::Config;
pub use error::{Result, RetailorError};
