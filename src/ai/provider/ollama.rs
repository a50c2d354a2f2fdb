//! Ollama `/api/chat` backend

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use super::{
    LlmProvider, LlmResponse, ProviderConfig, TokenUsage, WireMessage, base_url, http_client,
    read_json, trimmed,
};
use crate::types::{AgentxError, Message, Result};

const NAME: &str = "ollama";
const DEFAULT_API_BASE: &str = "http://localhost:11434";

#[derive(Debug)]
pub struct OllamaProvider {
    api_base: String,
    max_tokens: usize,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let base = base_url(config.api_base.as_deref().unwrap_or(DEFAULT_API_BASE))?;
        if let Some(host) = base.host_str()
            && !matches!(host, "localhost" | "127.0.0.1" | "[::1]")
        {
            warn!(host, "Ollama endpoint is not local");
        }

        Ok(Self {
            api_base: trimmed(&base),
            max_tokens: config.max_tokens,
            client: http_client(config.timeout_secs)?,
        })
    }

    fn body<'a>(&self, messages: &'a [Message], model: &'a str, temperature: f32) -> ChatBody<'a> {
        ChatBody {
            model,
            messages: messages.iter().map(WireMessage::from).collect(),
            stream: false,
            options: Options {
                temperature,
                num_predict: self.max_tokens,
            },
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn complete(
        &self,
        messages: &[Message],
        model: &str,
        temperature: f32,
    ) -> Result<LlmResponse> {
        debug!(model, temperature, messages = messages.len(), "Ollama chat request");
        let started = Instant::now();

        let response = self
            .client
            .post(format!("{}/api/chat", self.api_base))
            .json(&self.body(messages, model, temperature))
            .send()
            .await
            .map_err(|e| {
                let hint = if e.is_connect() {
                    " (is `ollama serve` running?)"
                } else {
                    ""
                };
                AgentxError::LlmApi(format!(
                    "Ollama request to {} failed: {}{}",
                    self.api_base, e, hint
                ))
            })?;

        let reply: ChatReply = read_json(response, NAME).await?;
        let usage = TokenUsage::new(reply.prompt_eval_count, reply.eval_count);
        Ok(LlmResponse::answered(
            NAME,
            model,
            &reply.message.content,
            usage,
            started,
        ))
    }

    fn name(&self) -> &str {
        NAME
    }

    async fn health_check(&self) -> Result<bool> {
        let probe = self
            .client
            .get(format!("{}/api/tags", self.api_base))
            .send()
            .await;
        let healthy = matches!(&probe, Ok(resp) if resp.status().is_success());
        if !healthy {
            warn!(endpoint = %self.api_base, "Ollama not reachable");
        }
        Ok(healthy)
    }
}

#[derive(Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
    options: Options,
}

#[derive(Serialize)]
struct Options {
    temperature: f32,
    num_predict: usize,
}

#[derive(Deserialize)]
struct ChatReply {
    message: ReplyMessage,
    #[serde(default)]
    prompt_eval_count: u32,
    #[serde(default)]
    eval_count: u32,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: String,
}
