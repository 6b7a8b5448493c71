//! CLI interface for the resume retailor

use crate::config::DocumentFormat;
use crate::error::{Result, RetailorError};
use crate::retailor::Mode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "resume-retailor", version)]
#[command(about = "Rewrite a resume JSON with a hosted LLM and render it as a document")]
#[command(long_about = "Check connectivity to an Azure OpenAI deployment, or retailor a resume JSON \
with ('jd') or without ('nojd') job-description keywords and write the result as a document")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send one fixed chat message to verify endpoint, key and deployment
    Probe,

    /// Retailor a resume JSON file
    Retailor {
        /// Path to the resume JSON file
        resume: PathBuf,

        /// 'jd' to retailor with job-description keywords, 'nojd' without
        #[arg(value_enum, ignore_case = true)]
        mode: Mode,

        /// Document format: pdf, markdown, html, json (default from config)
        #[arg(short, long)]
        format: Option<String>,

        /// Directory for the generated document
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Keyword list for 'jd' mode (one per line, or a JSON array)
        #[arg(short, long)]
        keywords: Option<PathBuf>,

        /// Print JSON only, do not write a document
        #[arg(long)]
        no_document: bool,

        /// Print compact instead of pretty JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show or reset configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    /// Show the effective configuration (API key masked)
    Show,

    /// Write default configuration to the config file
    Reset,

    /// Print the config file location
    Path,
}

/// Parse and validate document format
pub fn parse_document_format(format: &str) -> Result<DocumentFormat> {
    match format.to_lowercase().as_str() {
        "pdf" => Ok(DocumentFormat::Pdf),
        "markdown" | "md" => Ok(DocumentFormat::Markdown),
        "html" | "htm" => Ok(DocumentFormat::Html),
        "json" => Ok(DocumentFormat::Json),
        _ => Err(RetailorError::UnsupportedFormat(format!(
            "{}. Supported: pdf, markdown, html, json",
            format
        ))),
    }
}
