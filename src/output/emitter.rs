//! Persist rendered documents under timestamped names

use crate::config::DocumentFormat;
use crate::error::Result;
use crate::output::formatter::DocumentGenerator;
use crate::retailor::Mode;
use chrono::{DateTime, Local, TimeZone};
use log::info;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// `<base>_retailored_<mode>_<YYYYMMDD_HHMMSS>.<ext>`
pub fn suggest_filename<Tz: TimeZone>(base_name: &str, mode: Mode, format: DocumentFormat, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}_retailored_{}_{}.{}",
        base_name,
        mode,
        at.format(TIMESTAMP_FORMAT),
        format.extension()
    )
}

pub fn save_document(bytes: &[u8], file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, bytes)?;
    Ok(())
}

/// Render `resume` and write it next to the other outputs in `output_dir`.
pub struct DocumentEmitter {
    generator: DocumentGenerator,
    output_dir: PathBuf,
    format: DocumentFormat,
}

impl DocumentEmitter {
    pub fn new(output_dir: PathBuf, format: DocumentFormat) -> Self {
        Self {
            generator: DocumentGenerator::new(),
            output_dir,
            format,
        }
    }

    pub fn emit(&self, resume: &Value, base_name: &str, mode: Mode) -> Result<PathBuf> {
        self.emit_at(resume, base_name, mode, &Local::now())
    }

    pub fn emit_at<Tz: TimeZone>(&self, resume: &Value, base_name: &str, mode: Mode, at: &DateTime<Tz>) -> Result<PathBuf>
    where
        Tz::Offset: std::fmt::Display,
    {
        let bytes = self.generator.generate(resume, self.format)?;
        let path = self.output_dir.join(suggest_filename(base_name, mode, self.format, at));
        save_document(&bytes, &path)?;
        info!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}
