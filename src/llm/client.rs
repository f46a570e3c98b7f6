//! HTTP client for the language model providers.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::clean::clean_sql;
use super::error::{LlmError, LlmResult};
use super::prompt::{build_prompt, SYSTEM_PROMPT};
use super::CandidateGenerator;
use crate::config::{LlmSettings, Provider};

/// Sent to OpenRouter for attribution.
const APP_REFERER: &str = "https://text2sql.app";
const APP_TITLE: &str = "text2sql";

/// Longest error body kept in an [`LlmError::Status`].
const MAX_ERROR_BODY: usize = 512;

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Language model client.
///
/// One client talks to one provider. Requests are single-shot: no streaming
/// and no retries.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: Client,
    provider: Provider,
    url: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    max_tokens: u32,
}

impl LlmClient {
    /// Build a client from settings.
    ///
    /// # Errors
    ///
    /// Fails when the provider is unknown, an environment variable referenced
    /// by the settings is missing, or OpenRouter has no API key.
    pub fn from_settings(settings: &LlmSettings) -> LlmResult<Self> {
        let provider = settings.provider_type()?;
        let api_key = settings.resolved_api_key()?;

        if let (None, Some(env)) = (&api_key, provider.api_key_env()) {
            return Err(LlmError::MissingApiKey {
                provider: provider.as_str(),
                env,
            });
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(LlmError::Client)?;

        let url = format!("{}{}", settings.resolved_base_url()?, provider.endpoint());
        let model = settings.resolved_model()?;

        tracing::info!(provider = provider.as_str(), %url, %model, "LLM client ready");

        Ok(Self {
            http,
            provider,
            url,
            model,
            api_key,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        })
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask the model for SQL answering `query` and clean the answer.
    pub async fn generate_sql(&self, query: &str, schema: &str) -> LlmResult<String> {
        let prompt = build_prompt(query, schema);
        tracing::debug!(chars = prompt.chars().count(), "sending prompt");

        let raw = match self.provider {
            Provider::Ollama => self.call_ollama(&prompt).await?,
            Provider::OpenRouter => self.call_openrouter(&prompt).await?,
        };

        let sql = clean_sql(&raw);
        if sql.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(sql)
    }

    async fn call_ollama(&self, prompt: &str) -> LlmResult<String> {
        let request = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|source| self.transport_error(source))?;
        let response = self.check_status(response).await?;

        let body: OllamaResponse = response.json().await.map_err(LlmError::Decode)?;
        Ok(body.response)
    }

    async fn call_openrouter(&self, prompt: &str) -> LlmResult<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let mut builder = self
            .http
            .post(&self.url)
            .header("HTTP-Referer", APP_REFERER)
            .header("X-Title", APP_TITLE)
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|source| self.transport_error(source))?;
        let response = self.check_status(response).await?;

        let body: ChatResponse = response.json().await.map_err(LlmError::Decode)?;
        Ok(body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }

    fn transport_error(&self, source: reqwest::Error) -> LlmError {
        LlmError::Transport {
            url: self.url.clone(),
            source,
        }
    }

    async fn check_status(&self, response: reqwest::Response) -> LlmResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let mut body = response.text().await.unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let cut = (0..=MAX_ERROR_BODY)
                .rev()
                .find(|i| body.is_char_boundary(*i))
                .unwrap_or(0);
            body.truncate(cut);
        }

        Err(LlmError::Status {
            provider: self.provider.as_str(),
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl CandidateGenerator for LlmClient {
    async fn generate_candidate(&self, query: &str, schema: &str) -> LlmResult<String> {
        self.generate_sql(query, schema).await
    }
}
