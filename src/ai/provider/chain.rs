//! Fallback Provider Chain
//!
//! Providers are tried in priority order. Each failure is categorized and
//! turned into a decision:
//! - retry the same provider after a delay (rate limits, network, 5xx)
//! - fall back to the next provider (auth, token limit, unavailable)
//! - abort the whole chain (bad request)
//!
//! Waits grow exponentially with random jitter and never exceed
//! `max_delay`. Attempts across all providers are bounded.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use super::{LlmProvider, LlmResponse, ProviderConfig, SharedProvider};
use crate::constants::chain as defaults;
use crate::types::{AgentxError, ErrorCategory, ErrorClassifier, LlmError, Message, Result};

/// Chain member with its own attempt budget
#[derive(Clone)]
pub struct ChainedProvider {
    pub provider: SharedProvider,
    /// Lower runs first
    pub priority: u8,
    pub max_retries: u8,
}

impl ChainedProvider {
    pub fn new(provider: SharedProvider) -> Self {
        Self {
            provider,
            priority: 0,
            max_retries: defaults::DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_max_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries.max(1);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub max_total_attempts: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: f32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            max_total_attempts: defaults::MAX_TOTAL_ATTEMPTS,
            base_delay: Duration::from_millis(defaults::BASE_DELAY_MS),
            max_delay: Duration::from_secs(defaults::MAX_DELAY_SECS),
            backoff_factor: defaults::BACKOFF_FACTOR,
        }
    }
}

/// What happened during one `execute` call
#[derive(Debug, Default)]
pub struct ChainStats {
    pub total_attempts: usize,
    pub successful_provider: Option<String>,
    pub failures: Vec<(String, ErrorCategory)>,
    pub total_duration_ms: u64,
}

/// Next step after a failed attempt
#[derive(Debug, PartialEq)]
enum Decision {
    Retry(Duration),
    Fallback,
    Abort,
}

#[derive(Clone)]
pub struct ProviderChain {
    providers: Vec<ChainedProvider>,
    config: ChainConfig,
}

impl ProviderChain {
    pub fn new(config: ChainConfig) -> Self {
        Self {
            providers: Vec::new(),
            config,
        }
    }

    /// One chain member per config, in the given order
    pub fn from_configs(
        configs: &[ProviderConfig],
        max_retries: u8,
        config: ChainConfig,
    ) -> Result<Self> {
        let mut chain = Self::new(config);
        for (priority, provider_config) in configs.iter().enumerate() {
            let provider = super::create_provider(provider_config)?;
            chain.providers.push(
                ChainedProvider::new(provider)
                    .with_priority(priority as u8)
                    .with_max_retries(max_retries),
            );
        }
        Ok(chain)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Complete with retries and fallback, returning attempt statistics
    #[instrument(skip(self, messages), fields(providers = self.providers.len()))]
    pub async fn execute(
        &self,
        messages: &[Message],
        model: &str,
        temperature: f32,
    ) -> Result<(LlmResponse, ChainStats)> {
        if self.providers.is_empty() {
            return Err(AgentxError::Config(
                "Provider chain has no members".to_string(),
            ));
        }

        let started = Instant::now();
        let mut stats = ChainStats::default();
        let mut last_error = None;

        'chain: for member in &self.providers {
            let name = member.provider.name().to_string();
            let mut backoff = self.config.base_delay;

            for attempt in 1..=member.max_retries {
                if stats.total_attempts >= self.config.max_total_attempts {
                    warn!("Provider chain gave up after {} attempts", stats.total_attempts);
                    break 'chain;
                }
                stats.total_attempts += 1;
                debug!(provider = %name, attempt, "Chain attempt");

                let err = match member.provider.complete(messages, model, temperature).await {
                    Ok(response) => {
                        if stats.total_attempts > 1 {
                            info!(
                                provider = %name,
                                attempts = stats.total_attempts,
                                "Provider chain recovered"
                            );
                        }
                        stats.successful_provider = Some(name);
                        stats.total_duration_ms = started.elapsed().as_millis() as u64;
                        return Ok((response, stats));
                    }
                    Err(err) => err,
                };

                let classified = ErrorClassifier::classify_error(&err, &name);
                warn!(provider = %name, attempt, category = %classified.category, "{}", err);
                stats.failures.push((name.clone(), classified.category));
                last_error = Some(err);

                match self.decide(&classified, backoff) {
                    Decision::Abort => break 'chain,
                    Decision::Fallback => continue 'chain,
                    Decision::Retry(_) if attempt == member.max_retries => {}
                    Decision::Retry(wait) => {
                        debug!(delay_ms = wait.as_millis() as u64, "Waiting before retry");
                        sleep(wait).await;
                        backoff = next_backoff(
                            backoff,
                            self.config.backoff_factor,
                            self.config.max_delay,
                        );
                    }
                }
            }
            info!(provider = %name, "Moving to next provider");
        }

        stats.total_duration_ms = started.elapsed().as_millis() as u64;
        Err(last_error.unwrap_or_else(|| AgentxError::LlmApi("All providers failed".to_string())))
    }

    fn decide(&self, error: &LlmError, backoff: Duration) -> Decision {
        match error.category {
            _ if error.should_fallback() => Decision::Fallback,
            ErrorCategory::RateLimit => {
                let hinted = retry_hint(&error.message).unwrap_or_else(|| error.recommended_delay());
                Decision::Retry(hinted.min(self.config.max_delay))
            }
            category if category.is_retryable() => {
                Decision::Retry((backoff + jitter(backoff)).min(self.config.max_delay))
            }
            _ => Decision::Abort,
        }
    }
}

#[async_trait]
impl LlmProvider for ProviderChain {
    async fn complete(
        &self,
        messages: &[Message],
        model: &str,
        temperature: f32,
    ) -> Result<LlmResponse> {
        self.execute(messages, model, temperature)
            .await
            .map(|(response, _)| response)
    }

    fn name(&self) -> &str {
        "provider-chain"
    }

    /// Healthy when any member is
    async fn health_check(&self) -> Result<bool> {
        for member in &self.providers {
            if let Ok(true) = member.provider.health_check().await {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Seconds mentioned after "retry", "wait" or "in" in a rate-limit message, capped at 300
fn retry_hint(message: &str) -> Option<Duration> {
    let lower = message.to_lowercase();
    ["retry", "wait", " in "]
        .iter()
        .filter_map(|marker| lower.find(marker).map(|idx| &lower[idx + marker.len()..]))
        .flat_map(str::split_whitespace)
        .find_map(|word| {
            word.trim_end_matches(['.', ',', 's'])
                .parse::<u64>()
                .ok()
        })
        .map(|secs| Duration::from_secs(secs.min(300)))
}

/// Up to a quarter of the base delay
fn jitter(base: Duration) -> Duration {
    let quarter = base.as_millis() as u64 / 4;
    if quarter == 0 {
        Duration::ZERO
    } else {
        Duration::from_millis(rand::rng().random_range(0..quarter))
    }
}

fn next_backoff(current: Duration, factor: f32, cap: Duration) -> Duration {
    current.mul_f32(factor).min(cap)
}

/// Builder for chains assembled from ready-made providers
#[derive(Default)]
pub struct ProviderChainBuilder {
    members: Vec<ChainedProvider>,
    config: ChainConfig,
}

impl ProviderChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_shared(mut self, provider: SharedProvider) -> Self {
        let priority = self.members.len() as u8;
        self.members
            .push(ChainedProvider::new(provider).with_priority(priority));
        self
    }

    pub fn add_member(mut self, member: ChainedProvider) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_config(mut self, config: ChainConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(mut self) -> ProviderChain {
        self.members.sort_by_key(|m| m.priority);
        ProviderChain {
            providers: self.members,
            config: self.config,
        }
    }
}

impl std::fmt::Debug for ProviderChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.providers.iter().map(|m| m.provider.name()).collect();
        f.debug_struct("ProviderChain")
            .field("providers", &names)
            .field("config", &self.config)
            .finish()
    }
}
