//! Resume retailoring: keyword injection, mode dispatch and the LLM rewrite

pub mod coverage;
pub mod engine;
pub mod keywords;
pub mod resume;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which retailoring routine to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Retailor with the job-description keyword list
    Jd,
    /// Retailor without job-description steering
    Nojd,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Jd => "jd",
            Mode::Nojd => "nojd",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
