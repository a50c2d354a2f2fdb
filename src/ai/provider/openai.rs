//! OpenAI-compatible chat completions
//!
//! Works with api.openai.com or any server exposing `/chat/completions`.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use super::{
    LlmProvider, LlmResponse, ProviderConfig, TokenUsage, WireMessage, base_url, http_client,
    read_json, trimmed,
};
use crate::types::{AgentxError, Message, Result};

const NAME: &str = "openai";
const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const API_KEY_VAR: &str = "OPENAI_API_KEY";

pub struct OpenAiProvider {
    api_key: SecretString,
    api_base: String,
    max_tokens: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_base", &self.api_base)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

impl OpenAiProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let api_key = match &config.api_key {
            Some(key) => key.clone(),
            None => std::env::var(API_KEY_VAR)
                .ok()
                .filter(|key| !key.trim().is_empty())
                .map(SecretString::from)
                .ok_or_else(|| {
                    AgentxError::Config(format!("OpenAI API key not found. Set {}", API_KEY_VAR))
                })?,
        };

        let base = base_url(config.api_base.as_deref().unwrap_or(DEFAULT_API_BASE))?;

        Ok(Self {
            api_key,
            api_base: trimmed(&base),
            max_tokens: config.max_tokens,
            client: http_client(config.timeout_secs)?,
        })
    }

    fn body<'a>(&self, messages: &'a [Message], model: &'a str, temperature: f32) -> ChatBody<'a> {
        ChatBody {
            model,
            messages: messages.iter().map(WireMessage::from).collect(),
            temperature,
            max_tokens: self.max_tokens,
        }
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.bearer_auth(self.api_key.expose_secret())
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(
        &self,
        messages: &[Message],
        model: &str,
        temperature: f32,
    ) -> Result<LlmResponse> {
        debug!(model, temperature, messages = messages.len(), "OpenAI chat request");
        let started = Instant::now();

        let response = self
            .authorized(self.client.post(format!("{}/chat/completions", self.api_base)))
            .json(&self.body(messages, model, temperature))
            .send()
            .await
            .map_err(|e| AgentxError::LlmApi(format!("OpenAI request failed: {}", e)))?;

        let reply: ChatReply = read_json(response, NAME).await?;
        let usage = reply
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();
        let content = reply
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .ok_or_else(|| AgentxError::LlmApi("OpenAI returned no content".to_string()))?;

        Ok(LlmResponse::answered(NAME, model, &content, usage, started))
    }

    fn name(&self) -> &str {
        NAME
    }

    async fn health_check(&self) -> Result<bool> {
        let probe = self
            .authorized(self.client.get(format!("{}/models", self.api_base)))
            .send()
            .await;
        let healthy = matches!(&probe, Ok(resp) if resp.status().is_success());
        if !healthy {
            warn!(endpoint = %self.api_base, "OpenAI endpoint not reachable");
        }
        Ok(healthy)
    }
}

#[derive(Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: usize,
}

#[derive(Deserialize)]
struct ChatReply {
    choices: Vec<ReplyChoice>,
    usage: Option<ReplyUsage>,
}

#[derive(Deserialize)]
struct ReplyChoice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ReplyUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
