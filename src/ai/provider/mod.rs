//! Chat completion providers
//!
//! Agents and the topic classifier reach models through [`LlmProvider`].
//! Two HTTP backends exist, OpenAI-compatible and Ollama; [`ProviderChain`]
//! wraps several of them with retries and fallback.

mod chain;
mod ollama;
mod openai;

pub use chain::{ChainConfig, ChainStats, ChainedProvider, ProviderChain, ProviderChainBuilder};
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

pub use crate::types::{ErrorCategory, ErrorClassifier, LlmError};

use async_trait::async_trait;
use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::constants::provider as defaults;
use crate::types::{AgentxError, Message, Result};

/// Assistant reply plus what it cost
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub usage: TokenUsage,
    pub model: String,
    pub provider: String,
    pub elapsed_ms: u64,
}

impl LlmResponse {
    pub fn content_only(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: TokenUsage::default(),
            model: String::new(),
            provider: String::new(),
            elapsed_ms: 0,
        }
    }

    /// Trimmed reply from `provider`, timed from `started`
    fn answered(
        provider: &str,
        model: &str,
        content: &str,
        usage: TokenUsage,
        started: Instant,
    ) -> Self {
        Self {
            content: content.trim().to_string(),
            usage,
            model: model.to_string(),
            provider: provider.to_string(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
        }
    }

    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }

    pub fn add(&mut self, other: TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
    }
}

pub type SharedProvider = Arc<dyn LlmProvider + Send + Sync>;

/// Connection settings for one backend
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// "openai" or "ollama"
    pub provider: String,
    pub timeout_secs: u64,
    /// Falls back to the backend's environment variable when unset
    pub api_key: Option<SecretString>,
    pub api_base: Option<String>,
    pub max_tokens: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            timeout_secs: defaults::DEFAULT_TIMEOUT_SECS,
            api_key: None,
            api_base: None,
            max_tokens: defaults::DEFAULT_MAX_TOKENS,
        }
    }
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Complete a chat given the ordered transcript, a model id and a temperature
    async fn complete(
        &self,
        messages: &[Message],
        model: &str,
        temperature: f32,
    ) -> Result<LlmResponse>;

    fn name(&self) -> &str;

    async fn health_check(&self) -> Result<bool>;
}

pub fn create_provider(config: &ProviderConfig) -> Result<SharedProvider> {
    let provider: SharedProvider = match config.provider.as_str() {
        "openai" => Arc::new(OpenAiProvider::new(config)?),
        "ollama" => Arc::new(OllamaProvider::new(config)?),
        other => {
            return Err(AgentxError::Config(format!(
                "Unknown provider: {}. Supported: openai, ollama",
                other
            )));
        }
    };
    Ok(provider)
}

/// Chat message as both backends expect it; sender names are not sent
#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a Message> for WireMessage<'a> {
    fn from(message: &'a Message) -> Self {
        Self {
            role: message.role().as_str(),
            content: message.content(),
        }
    }
}

fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AgentxError::LlmApi(format!("Failed to create HTTP client: {}", e)))
}

/// Parse an http(s) base URL without its trailing slash
fn base_url(raw: &str) -> Result<url::Url> {
    let url = url::Url::parse(raw)
        .map_err(|e| AgentxError::Config(format!("Invalid endpoint URL '{}': {}", raw, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AgentxError::Config(format!(
            "Endpoint must use http or https, got: {}",
            url.scheme()
        )));
    }
    Ok(url)
}

fn trimmed(url: &url::Url) -> String {
    url.as_str().trim_end_matches('/').to_string()
}

/// Decode a successful body or turn the status into a categorized error
async fn read_json<T: DeserializeOwned>(response: reqwest::Response, provider: &str) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = format!("{} API error ({}): {}", provider, status, body);
        return Err(ErrorClassifier::classify_http_status(status.as_u16(), &message, provider).into());
    }
    response
        .json()
        .await
        .map_err(|e| AgentxError::LlmApi(format!("Unreadable {} response: {}", provider, e)))
}
