//! Role-specialized conversational agents
//!
//! Each agent owns a private transcript and wraps the shared model provider.
//! The transcript always opens with exactly one system message, inserted on
//! the first generation.

pub mod profile;

pub use profile::{AgentKind, AgentProfile};

use tracing::{debug, error};

use crate::ai::provider::{SharedProvider, TokenUsage};
use crate::types::{AgentxError, Message, Result};

pub struct Agent {
    profile: AgentProfile,
    provider: SharedProvider,
    transcript: Vec<Message>,
    latest_response: Option<String>,
    usage: TokenUsage,
}

impl Agent {
    pub fn new(profile: AgentProfile, provider: SharedProvider) -> Self {
        Self {
            profile,
            provider,
            transcript: Vec::new(),
            latest_response: None,
            usage: TokenUsage::default(),
        }
    }

    pub fn kind(&self) -> AgentKind {
        self.profile.kind
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    pub fn is_routable(&self) -> bool {
        self.profile.routable
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn latest_response(&self) -> Option<&str> {
        self.latest_response.as_deref()
    }

    /// Token usage accumulated across this agent's completions
    pub fn usage(&self) -> TokenUsage {
        self.usage
    }

    /// Produce a reply, optionally seeded with new user input.
    ///
    /// Provider failures are logged and propagated; the transcript keeps any
    /// system/user messages appended before the call.
    pub async fn generate_response(&mut self, input: Option<&str>) -> Result<String> {
        self.ensure_system_message();

        if let Some(input) = input.filter(|text| !text.is_empty()) {
            debug!("User input to {}: {}", self.profile.name, input);
            self.transcript.push(Message::user(input));
        }

        let response = match self
            .provider
            .complete(
                &self.transcript,
                &self.profile.model,
                self.profile.temperature,
            )
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("{} failed to generate a response: {}", self.profile.name, e);
                return Err(e);
            }
        };

        self.usage.add(response.usage);
        let content = response.content;
        debug!("{} response: {}", self.profile.name, content);

        self.transcript.push(Message::assistant(content.clone()));
        self.latest_response = Some(content.clone());
        Ok(content)
    }

    /// Append a peer message to the transcript without replying.
    pub fn receive_message(&mut self, message: Message) -> Result<()> {
        if message.is_system() {
            return Err(AgentxError::delivery(
                &self.profile.name,
                "system messages cannot be injected into a transcript",
            ));
        }

        debug!(
            "{} received message from {}: {}",
            self.profile.name,
            message.sender().unwrap_or("unknown"),
            message.content()
        );
        self.transcript.push(message);
        Ok(())
    }

    /// Insert the system prompt at the front unless it is already there.
    ///
    /// Peer messages can arrive before the first generation, so the prompt
    /// is inserted at index 0 rather than appended.
    fn ensure_system_message(&mut self) {
        if self.transcript.first().is_some_and(Message::is_system) {
            return;
        }
        let system = Message::system(self.profile.system_prompt());
        debug!("{} system message: {}", self.profile.name, system.content());
        self.transcript.insert(0, system);
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("kind", &self.profile.kind)
            .field("name", &self.profile.name)
            .field("transcript_len", &self.transcript.len())
            .field("has_response", &self.latest_response.is_some())
            .finish()
    }
}
