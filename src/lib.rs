//! agentx - Multi-Agent AI Consultancy
//!
//! Role-specialized agents (business analyst, IT consultant, solution
//! architect, tech lead, DevOps lead, project manager) answer a client
//! request in turn. Each reply is classified into topics and delivered only
//! to agents interested in those topics; the latest replies are then
//! aggregated into a Markdown report.
//!
//! ## Quick Start
//!
//! ```ignore
//! use agentx::{Config, Consultation};
//! use agentx::ai::provider::{ProviderConfig, create_provider};
//!
//! let config = Config::default();
//! let provider = create_provider(&ProviderConfig::default())?;
//! let mut consultation = Consultation::from_config(&config, provider)?;
//! let outcome = consultation.run("We need to improve scalability").await?;
//! println!("{}", outcome.report);
//! ```
//!
//! ## Modules
//!
//! - [`agents`]: Agent profiles and transcripts
//! - [`routing`]: Topic classification, broadcast, report aggregation
//! - [`consultation`]: Turn-based consultation driver
//! - [`ai`]: LLM provider abstraction with retry/fallback chain
//! - [`config`]: Layered configuration

pub mod agents;
pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod consultation;
pub mod routing;
pub mod types;

#[cfg(test)]
mod testing;

// =============================================================================
// Core Re-exports
// =============================================================================

pub use agents::{Agent, AgentKind, AgentProfile};
pub use config::{Config, ConfigLoader};
pub use consultation::{Consultation, ConsultationOptions, ConsultationOutcome};
pub use routing::{CommunicationManager, HistoryEntry, InterestTable, TopicClassifier};
pub use types::{AgentxError, ErrorCategory, Message, Result, Role, Topic, TopicSet};

pub use ai::{LlmProvider, LlmResponse, ProviderChain, ProviderChainBuilder, SharedProvider};
