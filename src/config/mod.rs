//! Configuration module for text2sql.
//!
//! Handles the TOML settings file, environment variable expansion and
//! provider selection.

mod provider;
mod settings;

pub use provider::{Provider, ProviderError};
pub use settings::{
    expand_env_vars, ExecutorSettings, GeneratorSettings, LlmSettings, ServerSettings, Settings,
    SettingsError, DEFAULT_FALLBACK_SQL,
};
