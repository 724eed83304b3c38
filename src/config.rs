use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::prompt::{DataCache, Model, Result, DEFAULT_LEVEL};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub generation: GenerationConfig,
    pub enhancement: EnhancementConfig,
}

/// Defaults for the deterministic pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Dialect used when a request does not name one.
    pub default_model: Model,
    /// Optional JSON data cache replacing the built-in pools.
    pub data_path: Option<PathBuf>,
    /// Reserved intensity level passed through to the negative prompt.
    pub intensity: u8,
}

/// Settings for the optional rewrite step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhancementConfig {
    pub enabled: bool,
    /// Base URL of the Ollama-compatible service.
    pub host: String,
    pub model: String,
    pub probe_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_model: Model::default(),
            data_path: None,
            intensity: DEFAULT_LEVEL,
        }
    }
}

impl Default for EnhancementConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            probe_timeout_ms: 1500,
            request_timeout_ms: 20_000,
            temperature: 0.7,
        }
    }
}

impl AppConfig {
    /// Load configuration from `~/.config/charprompt/config.toml`.
    /// Returns `Default` if the file is missing or unparseable.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match std::fs::read_to_string(&config_path) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                log::warn!(
                    "Failed to parse config at {}: {e}, using defaults",
                    config_path.display()
                );
                Self::default()
            }),
            Err(_) => {
                log::debug!("No config file at {}, using defaults", config_path.display());
                Self::default()
            }
        }
    }

    pub fn parse(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        let config = toml::from_str(contents)?;
        log::info!("Loaded configuration");
        Ok(config)
    }

    /// Data cache from `generation.data_path`, or the built-in pools.
    pub fn data_cache(&self) -> Result<DataCache> {
        match &self.generation.data_path {
            Some(path) => DataCache::load(path),
            None => Ok(DataCache::builtin()),
        }
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("charprompt").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
