//! Configuration management for the resume retailor

use crate::error::{Result, RetailorError};
use crate::retailor::keywords::{default_keywords, DEFAULT_KEYWORDS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_API_KEY: &str = "AZURE_OPENAI_API_KEY";
pub const ENV_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
pub const ENV_API_VERSION: &str = "AZURE_OPENAI_API_VERSION";
pub const ENV_DEPLOYMENT: &str = "AZURE_OPENAI_DEPLOYMENT";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub azure: AzureConfig,
    pub retailor: RetailorConfig,
    pub output: OutputConfig,
}

/// Connection settings for an Azure OpenAI deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureConfig {
    pub api_key: String,
    pub api_version: String,
    pub endpoint: String,
    pub deployment: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetailorConfig {
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: DocumentFormat,
    pub output_dir: Option<PathBuf>,
    pub pretty_json: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Markdown,
    Html,
    Json,
}

impl DocumentFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Markdown => "md",
            DocumentFormat::Html => "html",
            DocumentFormat::Json => "json",
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            azure: AzureConfig::default(),
            retailor: RetailorConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_version: "2024-08-01-preview".to_string(),
            endpoint: String::new(),
            deployment: "gpt-4o-mini".to_string(),
            timeout_secs: 120,
        }
    }
}

impl Default for RetailorConfig {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: Some(4096),
            keywords: default_keywords(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: DocumentFormat::Pdf,
            output_dir: None,
            pretty_json: true,
            color_output: true,
        }
    }
}

impl AzureConfig {
    /// Override fields from `AZURE_OPENAI_*` variables when they are set and non-empty.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let fields: [(&str, &mut String); 4] = [
            (ENV_API_KEY, &mut self.api_key),
            (ENV_ENDPOINT, &mut self.endpoint),
            (ENV_API_VERSION, &mut self.api_version),
            (ENV_DEPLOYMENT, &mut self.deployment),
        ];
        for (key, field) in fields {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *field = value.trim().to_string();
            }
        }
    }

    /// Reject configurations that cannot possibly reach the service.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(RetailorError::Configuration(format!(
                "API key is empty; set {} or azure.api_key",
                ENV_API_KEY
            )));
        }
        if self.endpoint.trim().is_empty() {
            return Err(RetailorError::Configuration(format!(
                "endpoint is empty; set {} or azure.endpoint",
                ENV_ENDPOINT
            )));
        }
        if self.deployment.trim().is_empty() {
            return Err(RetailorError::Configuration(format!(
                "deployment is empty; set {} or azure.deployment",
                ENV_DEPLOYMENT
            )));
        }
        if self.api_version.trim().is_empty() {
            return Err(RetailorError::Configuration("api_version is empty".to_string()));
        }
        Ok(())
    }

    /// Key with everything but the last four characters hidden.
    pub fn masked_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.is_empty() {
            return "<unset>".to_string();
        }
        if chars.len() <= 4 {
            return "*".repeat(chars.len());
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}", "*".repeat(chars.len() - 4), tail)
    }
}

impl Config {
    /// Load the config file (or defaults when absent), then layer `.env` and
    /// process environment on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);
        let mut config = Self::from_file(&config_path)?;
        config.azure.apply_env();
        Ok(config)
    }

    pub fn from_file(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            log::debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| RetailorError::Configuration(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    pub fn save(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| RetailorError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-retailor")
            .join("config.toml")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.azure.api_version, "2024-08-01-preview");
        assert_eq!(config.azure.deployment, "gpt-4o-mini");
        assert!(config.azure.api_key.is_empty());
        assert_eq!(config.retailor.keywords.len(), DEFAULT_KEYWORDS.len());
        assert_eq!(config.output.format, DocumentFormat::Pdf);
    }

    #[test]
    fn test_empty_credentials_are_rejected() {
        let azure = AzureConfig {
            endpoint: "https://example.openai.azure.com/".to_string(),
            ..AzureConfig::default()
        };
        let err = azure.validate().unwrap_err();
        assert!(matches!(err, RetailorError::Configuration(_)));
        assert!(err.to_string().contains(ENV_API_KEY));
    }

    #[test]
    fn test_missing_endpoint_is_rejected() {
        let azure = AzureConfig {
            api_key: "secret".to_string(),
            ..AzureConfig::default()
        };
        assert!(azure.validate().unwrap_err().to_string().contains(ENV_ENDPOINT));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_API_KEY, "abc123"),
            (ENV_ENDPOINT, " https://contoso.openai.azure.com/ "),
            (ENV_DEPLOYMENT, ""),
        ]
        .into_iter()
        .collect();

        let mut azure = AzureConfig::default();
        azure.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(azure.api_key, "abc123");
        assert_eq!(azure.endpoint, "https://contoso.openai.azure.com/");
        // empty values leave the file/default value in place
        assert_eq!(azure.deployment, "gpt-4o-mini");
        assert!(azure.validate().is_ok());
    }

    #[test]
    fn test_masked_key() {
        let mut azure = AzureConfig::default();
        assert_eq!(azure.masked_key(), "<unset>");
        azure.api_key = "abcd".to_string();
        assert_eq!(azure.masked_key(), "****");
        azure.api_key = "0123456789".to_string();
        assert_eq!(azure.masked_key(), "******6789");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.azure.endpoint = "https://contoso.openai.azure.com/".to_string();
        config.output.format = DocumentFormat::Markdown;
        config.save(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.azure.endpoint, "https://contoso.openai.azure.com/");
        assert_eq!(loaded.output.format, DocumentFormat::Markdown);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[azure]\ndeployment = \"gpt-4o\"\n").unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.azure.deployment, "gpt-4o");
        assert_eq!(loaded.azure.api_version, "2024-08-01-preview");
        assert!(loaded.output.pretty_json);
    }

    #[test]
    fn test_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "azure = [").unwrap();
        assert!(matches!(Config::from_file(&path), Err(RetailorError::Configuration(_))));
    }
}
