//! Scripted provider for unit tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::ai::provider::{LlmProvider, LlmResponse, SharedProvider, TokenUsage};
use crate::types::{AgentxError, Message, Result};

type ReplyFn = dyn Fn(&[Message]) -> std::result::Result<String, String> + Send + Sync;

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub messages: Vec<Message>,
    pub model: String,
    pub temperature: f32,
}

pub(crate) struct ScriptedProvider {
    reply: Box<ReplyFn>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedProvider {
    pub fn from_fn(
        reply: impl Fn(&[Message]) -> std::result::Result<String, String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            reply: Box::new(reply),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Self {
        let text = text.to_string();
        Self::from_fn(move |_| Ok(text.clone()))
    }

    pub fn failing(message: &str) -> Self {
        let message = message.to_string();
        Self::from_fn(move |_| Err(message.clone()))
    }

    /// Replies in order, then fails once the script runs out
    pub fn sequence<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queue: Mutex<VecDeque<String>> =
            Mutex::new(replies.into_iter().map(Into::into).collect());
        Self::from_fn(move |_| {
            queue
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| "script exhausted".to_string())
        })
    }

    /// Replies with "Notes from <agent name>", read from the system prompt
    pub fn echo_agent() -> Self {
        Self::from_fn(|messages| {
            let name = messages
                .first()
                .filter(|m| m.is_system())
                .and_then(|m| m.content().strip_prefix("You are "))
                .and_then(|rest| rest.split(',').next())
                .unwrap_or("unknown");
            Ok(format!("Notes from {}", name))
        })
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn complete(
        &self,
        messages: &[Message],
        model: &str,
        temperature: f32,
    ) -> Result<LlmResponse> {
        self.calls.lock().unwrap().push(RecordedCall {
            messages: messages.to_vec(),
            model: model.to_string(),
            temperature,
        });
        match (self.reply)(messages) {
            Ok(text) => {
                let mut response = LlmResponse::content_only(text);
                response.usage = TokenUsage::new(10, 5);
                Ok(response)
            }
            Err(message) => Err(AgentxError::LlmApi(message)),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

/// Upcast helper so tests can keep the concrete handle for assertions
pub(crate) fn as_shared(provider: &Arc<ScriptedProvider>) -> SharedProvider {
    provider.clone()
}
