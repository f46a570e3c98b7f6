//! TOML-based configuration for text2sql.
//!
//! Supports a config file (text2sql.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [llm]
//! provider = "openrouter"
//! api_key = "${OPENROUTER_API_KEY}"
//! timeout_secs = 60
//!
//! [executor]
//! url = "http://localhost:8082/system/llm/execute"
//!
//! [server]
//! host = "0.0.0.0"
//! port = 5050
//!
//! [generator]
//! exemplar_threshold = 0.7
//! knowledge_file = "./knowledge.toml"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::provider::Provider;
use crate::knowledge::DEFAULT_THRESHOLD;

/// Query returned when the model fails or answers with something that is
/// not a SELECT statement.
pub const DEFAULT_FALLBACK_SQL: &str =
    "SELECT ts_code, stock_name, pe, ma5 FROM stock_business LIMIT 5";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Unsupported LLM provider: {0}")]
    UnsupportedProvider(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Language model collaborator.
    pub llm: LlmSettings,

    /// SQL execution service.
    pub executor: ExecutorSettings,

    /// HTTP server.
    pub server: ServerSettings,

    /// Exemplar matching and fallback behaviour.
    pub generator: GeneratorSettings,
}

/// Language model configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Provider name (ollama, openrouter).
    pub provider: String,

    /// API base URL. Defaults per provider.
    pub base_url: Option<String>,

    /// Model name. Defaults per provider.
    pub model: Option<String>,

    /// API key (supports ${ENV_VAR} expansion).
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Sampling temperature (OpenRouter only).
    pub temperature: f32,

    /// Completion token cap (OpenRouter only).
    pub max_tokens: u32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            base_url: None,
            model: None,
            api_key: None,
            timeout_secs: 60,
            temperature: 0.1,
            max_tokens: 500,
        }
    }
}

impl LlmSettings {
    /// Get the provider type.
    pub fn provider_type(&self) -> Result<Provider, SettingsError> {
        Provider::from_str(&self.provider)
            .map_err(|_| SettingsError::UnsupportedProvider(self.provider.clone()))
    }

    /// Base URL with environment variables expanded and no trailing slash.
    pub fn resolved_base_url(&self) -> Result<String, SettingsError> {
        let url = match &self.base_url {
            Some(url) => expand_env_vars(url)?,
            None => self.provider_type()?.default_base_url().to_string(),
        };
        Ok(url.trim_end_matches('/').to_string())
    }

    pub fn resolved_model(&self) -> Result<String, SettingsError> {
        match &self.model {
            Some(model) => Ok(model.clone()),
            None => Ok(self.provider_type()?.default_model().to_string()),
        }
    }

    /// The configured API key, else the provider's environment variable.
    ///
    /// An empty key counts as absent.
    pub fn resolved_api_key(&self) -> Result<Option<String>, SettingsError> {
        let key = match &self.api_key {
            Some(key) => Some(expand_env_vars(key)?),
            None => self
                .provider_type()?
                .api_key_env()
                .and_then(|var| env::var(var).ok()),
        };
        Ok(key.filter(|k| !k.trim().is_empty()))
    }
}

/// Execution service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExecutorSettings {
    /// Endpoint that accepts raw SQL as the POST body.
    pub url: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:8082/system/llm/execute".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ExecutorSettings {
    pub fn resolved_url(&self) -> Result<String, SettingsError> {
        expand_env_vars(&self.url)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5050,
        }
    }
}

/// SQL generation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Score an exemplar must strictly exceed (0.0 to 1.0).
    pub exemplar_threshold: f64,

    /// Consult exemplars before the model.
    pub use_exemplars: bool,

    /// Query used when generation fails.
    pub fallback_sql: String,

    /// Optional knowledge file extending the built-in tables.
    pub knowledge_file: Option<String>,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            exemplar_threshold: DEFAULT_THRESHOLD,
            use_exemplars: true,
            fallback_sql: DEFAULT_FALLBACK_SQL.to_string(),
            knowledge_file: None,
        }
    }
}

impl GeneratorSettings {
    pub fn knowledge_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        self.knowledge_file
            .as_deref()
            .map(|p| expand_env_vars(p).map(PathBuf::from))
            .transpose()
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `TEXT2SQL_CONFIG`
    /// 2. `./text2sql.toml`
    /// 3. `~/.config/text2sql/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("TEXT2SQL_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("text2sql.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("text2sql").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.llm.provider_type()?;

        let threshold = self.generator.exemplar_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(SettingsError::InvalidConfig(format!(
                "generator.exemplar_threshold must be within 0.0..=1.0, got {}",
                threshold
            )));
        }
        if self.generator.fallback_sql.trim().is_empty() {
            return Err(SettingsError::InvalidConfig(
                "generator.fallback_sql must not be empty".to_string(),
            ));
        }
        if self.llm.timeout_secs == 0 || self.executor.timeout_secs == 0 {
            return Err(SettingsError::InvalidConfig(
                "timeouts must be at least one second".to_string(),
            ));
        }

        Ok(())
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.peek() == Some(&'{') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
        } else {
            while let Some(&ch) = chars.peek() {
                if ch.is_alphanumeric() || ch == '_' {
                    var_name.push(ch);
                    chars.next();
                } else {
                    break;
                }
            }
            if var_name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
