//! AI Integration Layer
//!
//! Chat-completion providers used by agents and the topic classifier.

pub mod provider;

pub use provider::{
    ChainConfig, ChainStats, ChainedProvider, LlmProvider, LlmResponse, OllamaProvider,
    OpenAiProvider, ProviderChain, ProviderChainBuilder, ProviderConfig, SharedProvider,
    TokenUsage, create_provider,
};
