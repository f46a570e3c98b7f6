//! Language model provider selection.

/// Error type for provider parsing.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Unsupported LLM provider: {0}. Supported: ollama, openrouter")]
    UnsupportedProvider(String),
}

/// Supported language model providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    /// Local Ollama server, `/api/generate`.
    #[default]
    Ollama,
    /// OpenRouter, OpenAI-compatible `/chat/completions`.
    OpenRouter,
}

impl Provider {
    /// Parse provider from string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, ProviderError> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Provider::Ollama),
            "openrouter" | "open_router" => Ok(Provider::OpenRouter),
            other => Err(ProviderError::UnsupportedProvider(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Ollama => "ollama",
            Provider::OpenRouter => "openrouter",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Ollama => "http://localhost:11434",
            Provider::OpenRouter => "https://openrouter.ai/api/v1",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Ollama => "qwen2.5-coder:latest",
            Provider::OpenRouter => "qwen/qwen-2.5-coder-32b-instruct:free",
        }
    }

    /// Path appended to the base URL for a completion request.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Provider::Ollama => "/api/generate",
            Provider::OpenRouter => "/chat/completions",
        }
    }

    /// Environment variable consulted when no API key is configured.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Provider::Ollama => None,
            Provider::OpenRouter => Some("OPENROUTER_API_KEY"),
        }
    }
}
