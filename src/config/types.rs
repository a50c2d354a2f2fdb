//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/agentx/) and project (.agentx/) level configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::agents::{AgentKind, AgentProfile};
use crate::ai::provider::ProviderConfig;
use crate::constants::{chain, provider, report, routing};
use crate::types::{AgentxError, Result};

const SUPPORTED_PROVIDERS: [&str; 2] = ["openai", "ollama"];

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// LLM provider settings
    pub llm: LlmConfig,

    /// Topic classifier settings
    pub routing: RoutingConfig,

    /// Report output settings
    pub report: ReportConfig,

    /// Per-agent overrides keyed by agent kind (e.g. `tech_lead`)
    pub agents: BTreeMap<String, AgentOverride>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: LlmConfig::default(),
            routing: RoutingConfig::default(),
            report: ReportConfig::default(),
            agents: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `AgentxError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        validate_provider_name(&self.llm.provider)?;
        for fallback in &self.llm.fallbacks {
            validate_provider_name(&fallback.provider)?;
        }

        if self.llm.timeout_secs == 0 {
            return Err(AgentxError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.llm.max_retries == 0 {
            return Err(AgentxError::Config(
                "LLM max_retries must be greater than 0".to_string(),
            ));
        }

        if self.llm.max_tokens == 0 {
            return Err(AgentxError::Config(
                "LLM max_tokens must be greater than 0".to_string(),
            ));
        }

        validate_temperature("routing.classifier_temperature", self.routing.classifier_temperature)?;

        for (key, agent) in &self.agents {
            let kind = parse_agent_key(key)?;
            if let Some(temperature) = agent.temperature {
                validate_temperature(&format!("agents.{}.temperature", kind), temperature)?;
            }
        }

        Ok(())
    }

    /// Default roster with model overrides applied
    ///
    /// `llm.model` replaces every agent's model; `[agents.<kind>]` entries
    /// take precedence over it.
    pub fn agent_profiles(&self) -> Result<Vec<AgentProfile>> {
        let mut overrides = BTreeMap::new();
        for (key, agent) in &self.agents {
            overrides.insert(parse_agent_key(key)?, agent);
        }

        let profiles = AgentProfile::defaults()
            .into_iter()
            .map(|mut profile| {
                if let Some(model) = &self.llm.model {
                    profile.model = model.clone();
                }
                if let Some(agent) = overrides.get(&profile.kind) {
                    if let Some(model) = &agent.model {
                        profile.model = model.clone();
                    }
                    if let Some(temperature) = agent.temperature {
                        profile.temperature = temperature;
                    }
                }
                profile
            })
            .collect();

        Ok(profiles)
    }

    /// `routing.classifier_model`, else `llm.model`, else the built-in default
    pub fn classifier_model(&self) -> &str {
        self.routing
            .classifier_model
            .as_deref()
            .or(self.llm.model.as_deref())
            .unwrap_or(routing::CLASSIFIER_MODEL)
    }
}

fn validate_provider_name(name: &str) -> Result<()> {
    if SUPPORTED_PROVIDERS.contains(&name) {
        Ok(())
    } else {
        Err(AgentxError::Config(format!(
            "Unknown provider: {}. Supported: {}",
            name,
            SUPPORTED_PROVIDERS.join(", ")
        )))
    }
}

fn validate_temperature(field: &str, value: f32) -> Result<()> {
    if (0.0..=2.0).contains(&value) {
        Ok(())
    } else {
        Err(AgentxError::Config(format!(
            "{} must be between 0.0 and 2.0, got {}",
            field, value
        )))
    }
}

fn parse_agent_key(key: &str) -> Result<AgentKind> {
    key.parse::<AgentKind>()
        .map_err(|e| AgentxError::Config(format!("Invalid [agents] section: {}", e)))
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name ("openai" or "ollama")
    pub provider: String,

    /// Model applied to every agent, unless an agent override sets its own
    pub model: Option<String>,

    /// Custom endpoint for the primary provider
    pub api_base: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Completion length cap per request
    pub max_tokens: usize,

    /// Attempts per provider before falling back
    pub max_retries: u8,

    /// Fallback providers, tried in order
    pub fallbacks: Vec<FallbackConfig>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: None,
            api_base: None,
            timeout_secs: provider::DEFAULT_TIMEOUT_SECS,
            max_tokens: provider::DEFAULT_MAX_TOKENS,
            max_retries: chain::DEFAULT_MAX_RETRIES,
            fallbacks: Vec::new(),
        }
    }
}

impl LlmConfig {
    /// Provider configs for the chain, primary first
    pub fn provider_configs(&self) -> Vec<ProviderConfig> {
        let primary = ProviderConfig {
            provider: self.provider.clone(),
            timeout_secs: self.timeout_secs,
            api_key: None,
            api_base: self.api_base.clone(),
            max_tokens: self.max_tokens,
        };

        std::iter::once(primary)
            .chain(self.fallbacks.iter().map(|fallback| ProviderConfig {
                provider: fallback.provider.clone(),
                timeout_secs: self.timeout_secs,
                api_key: None,
                api_base: fallback.api_base.clone(),
                max_tokens: self.max_tokens,
            }))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    pub provider: String,
    #[serde(default)]
    pub api_base: Option<String>,
}

// =============================================================================
// Routing Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Model used when no keyword matches; unset follows `llm.model`
    pub classifier_model: Option<String>,

    pub classifier_temperature: f32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            classifier_model: None,
            classifier_temperature: routing::CLASSIFIER_TEMPERATURE,
        }
    }
}

// =============================================================================
// Report Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// First-level heading of the report
    pub title: String,

    pub output_path: PathBuf,

    /// Ask the Markdown output agent to format the aggregated report
    pub polish_with_output_agent: bool,

    /// Export every agent transcript after the run
    pub save_transcripts: bool,

    pub transcripts_dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: report::DEFAULT_TITLE.to_string(),
            output_path: PathBuf::from(report::DEFAULT_OUTPUT_PATH),
            polish_with_output_agent: false,
            save_transcripts: false,
            transcripts_dir: PathBuf::from(report::DEFAULT_TRANSCRIPTS_DIR),
        }
    }
}

// =============================================================================
// Agent Overrides
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentOverride {
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

// =============================================================================
// Tests
// =============================================================================
