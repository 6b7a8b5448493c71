//! Resume record loading

use crate::error::{Result, RetailorError};
use log::info;
use serde_json::Value;
use std::path::Path;

/// Read a resume record from a JSON file. No schema is enforced.
pub fn load_resume(path: &Path) -> Result<Value> {
    if !path.is_file() {
        return Err(RetailorError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let resume = parse_resume(&content)?;
    info!("Loaded resume record from {} ({} bytes)", path.display(), content.len());
    Ok(resume)
}

pub fn parse_resume(content: &str) -> Result<Value> {
    serde_json::from_str(content).map_err(|e| RetailorError::InvalidJson(e.to_string()))
}

/// `/data/jane_doe.json` -> `jane_doe`
pub fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "resume".to_string())
}
