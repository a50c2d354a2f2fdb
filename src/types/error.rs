//! Error types
//!
//! `AgentxError` is the crate-wide error. Provider failures additionally carry
//! an `ErrorCategory` that the provider chain uses to pick between retrying,
//! falling back to the next provider, or giving up.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Provider Failure Categories
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 429 or quota messages; retried after a pause
    RateLimit,
    /// Prompt exceeds the model context; next provider may cope
    TokenLimit,
    /// Bad or missing credentials
    Auth,
    Network,
    /// Endpoint or model not available
    Unavailable,
    /// Malformed request; never retried
    BadRequest,
    /// 5xx and overload responses
    Transient,
    Unknown,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RateLimit => "RATE_LIMIT",
            Self::TokenLimit => "TOKEN_LIMIT",
            Self::Auth => "AUTH",
            Self::Network => "NETWORK",
            Self::Unavailable => "UNAVAILABLE",
            Self::BadRequest => "BAD_REQUEST",
            Self::Transient => "TRANSIENT",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Worth another attempt on the same provider
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimit | Self::Network | Self::Transient | Self::Unknown
        )
    }

    /// Skip straight to the next provider
    pub fn should_fallback(&self) -> bool {
        matches!(self, Self::TokenLimit | Self::Unavailable | Self::Auth)
    }

    /// Pause before retrying when the provider gave no hint
    pub fn default_delay(&self) -> Duration {
        match self {
            Self::RateLimit => Duration::from_secs(30),
            Self::Network => Duration::from_secs(5),
            Self::Transient => Duration::from_secs(2),
            _ => Duration::from_millis(500),
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Categorized Provider Error
// =============================================================================

#[derive(Debug, Clone)]
pub struct LlmError {
    pub category: ErrorCategory,
    pub message: String,
    pub provider: Option<String>,
    pub retry_after: Option<Duration>,
}

impl LlmError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
            retry_after: None,
        }
    }

    pub fn from_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn retry_after(mut self, delay: Duration) -> Self {
        self.retry_after = Some(delay);
        self
    }

    pub fn should_fallback(&self) -> bool {
        self.category.should_fallback()
    }

    pub fn recommended_delay(&self) -> Duration {
        self.retry_after
            .unwrap_or_else(|| self.category.default_delay())
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.provider {
            Some(provider) => write!(f, "[{}:{}] {}", provider, self.category, self.message),
            None => write!(f, "[{}] {}", self.category, self.message),
        }
    }
}

impl std::error::Error for LlmError {}

// =============================================================================
// Classification
// =============================================================================

/// Message fragments checked in order; the first matching row wins
const MESSAGE_PATTERNS: &[(ErrorCategory, &[&str])] = &[
    (
        ErrorCategory::RateLimit,
        &["rate limit", "429", "too many requests", "quota exceeded"],
    ),
    (
        ErrorCategory::TokenLimit,
        &[
            "context length",
            "maximum context",
            "token limit",
            "too many tokens",
            "too large",
        ],
    ),
    (
        ErrorCategory::Auth,
        &["401", "403", "api key", "unauthorized", "permission denied"],
    ),
    (
        ErrorCategory::Network,
        &[
            "network",
            "connection",
            "dns",
            "timeout",
            "timed out",
            "unreachable",
        ],
    ),
    (
        ErrorCategory::Unavailable,
        &["503", "502", "service unavailable", "not found"],
    ),
    (
        ErrorCategory::BadRequest,
        &["400", "bad request", "malformed"],
    ),
    (
        ErrorCategory::Transient,
        &["500", "server error", "temporary", "overloaded"],
    ),
];

pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Categorize a free-form provider error message
    pub fn classify(message: &str, provider: &str) -> LlmError {
        let lower = message.to_lowercase();
        let category = MESSAGE_PATTERNS
            .iter()
            .find(|(_, needles)| needles.iter().any(|n| lower.contains(n)))
            .map(|(category, _)| *category)
            .unwrap_or(ErrorCategory::Unknown);

        let error = LlmError::new(category, message).from_provider(provider);
        match category {
            ErrorCategory::RateLimit | ErrorCategory::Network | ErrorCategory::Transient => {
                error.retry_after(category.default_delay())
            }
            _ => error,
        }
    }

    /// Categorize a non-success HTTP status
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        let category = match status {
            429 => ErrorCategory::RateLimit,
            401 | 403 => ErrorCategory::Auth,
            400 | 422 => ErrorCategory::BadRequest,
            404 => ErrorCategory::Unavailable,
            500..=599 => ErrorCategory::Transient,
            _ => ErrorCategory::Unknown,
        };
        let error = LlmError::new(category, message).from_provider(provider);
        if category == ErrorCategory::RateLimit {
            error.retry_after(category.default_delay())
        } else {
            error
        }
    }

    /// Categorize any crate error raised by a provider call
    pub fn classify_error(err: &AgentxError, provider: &str) -> LlmError {
        match err {
            AgentxError::Llm(inner) => inner.clone(),
            AgentxError::LlmApi(message) => Self::classify(message, provider),
            AgentxError::Config(_) => {
                LlmError::new(ErrorCategory::BadRequest, err.to_string()).from_provider(provider)
            }
            AgentxError::Io(_) => LlmError::new(ErrorCategory::Network, err.to_string())
                .from_provider(provider),
            _ => LlmError::new(ErrorCategory::Unknown, err.to_string()).from_provider(provider),
        }
    }
}

// =============================================================================
// Crate Error
// =============================================================================

#[derive(Debug, Error)]
pub enum AgentxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Uncategorized provider failure
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// Topic fallback could not produce an answer
    #[error("Classification failed: {0}")]
    Classification(String),

    #[error("Delivery to {agent} failed: {reason}")]
    Delivery { agent: String, reason: String },

    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Report error: {0}")]
    Report(String),
}

impl AgentxError {
    pub fn delivery(agent: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Delivery {
            agent: agent.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AgentxError>;
