//! Configuration management

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM service configuration
    #[serde(default)]
    pub llm_service: LLMServiceConfig,

    /// Search backend configuration
    #[serde(default)]
    pub search: SearchConfig,
}

/// OpenAI-compatible chat completion service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMServiceConfig {
    /// API key. Without one the model path is skipped entirely.
    #[serde(default = "default_api_key")]
    pub api_key: Option<String>,

    /// Base URL of the service, including the API version segment
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model name for chat completions
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Completion token cap
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl LLMServiceConfig {
    /// API key if one is set and non-blank
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Chat completions endpoint
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl Default for LLMServiceConfig {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_api_key() -> Option<String> {
    std::env::var("EVQUERY_API_KEY").ok()
}

fn default_base_url() -> String {
    std::env::var("EVQUERY_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".to_string())
}

fn default_model() -> String {
    std::env::var("EVQUERY_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string())
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    200
}

fn default_timeout() -> u64 {
    30
}

/// Search backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Path or name of the Everything command-line client
    #[serde(default = "default_es_path")]
    pub es_path: PathBuf,

    /// Maximum number of results requested from the backend
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            es_path: default_es_path(),
            max_results: default_max_results(),
        }
    }
}

fn default_es_path() -> PathBuf {
    std::env::var("EVQUERY_ES_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("es"))
}

fn default_max_results() -> usize {
    1000
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load config from a specific path, falling back to defaults if it doesn't exist
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path())
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path (EVQUERY_CONFIG overrides)
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("EVQUERY_CONFIG") {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }
}
