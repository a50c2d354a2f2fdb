//! Consultation driver
//!
//! Runs one consultation over the roster:
//! 1. Business Analyst is seeded with the client input
//! 2. Each remaining agent replies in turn and its reply is broadcast
//! 3. Latest responses are aggregated into a Markdown report
//! 4. Optionally, the output agent reformats the report
//!
//! Turns are best-effort: a failed agent is recorded and the run continues.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::agents::{Agent, AgentKind};
use crate::ai::provider::{SharedProvider, TokenUsage};
use crate::config::Config;
use crate::routing::{CommunicationManager, InterestTable, TopicClassifier};
use crate::types::{AgentxError, Message, Result};

/// Order in which agents take their turn
pub const TURN_ORDER: [AgentKind; 6] = [
    AgentKind::BusinessAnalyst,
    AgentKind::ItConsultant,
    AgentKind::SolutionArchitect,
    AgentKind::TechLead,
    AgentKind::DevOpsLead,
    AgentKind::ProjectManager,
];

/// Client request used when none is supplied
pub const DEFAULT_CLIENT_INPUT: &str =
    "We are facing issues with data security and need to improve our system's scalability.";

#[derive(Debug, Clone, Default)]
pub struct ConsultationOptions {
    /// Ask the output agent to format the aggregated report
    pub polish: bool,
}

/// Result of a consultation run
#[derive(Debug, Clone)]
pub struct ConsultationOutcome {
    pub session_id: String,
    pub report: String,
    /// Agents whose turn succeeded, in turn order
    pub completed: Vec<AgentKind>,
    pub failed: Vec<(AgentKind, String)>,
    /// Whether the report came from the output agent
    pub polished: bool,
    pub usage: TokenUsage,
    pub duration_secs: u64,
}

impl ConsultationOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct Consultation {
    manager: CommunicationManager,
    options: ConsultationOptions,
    session_id: String,
}

impl Consultation {
    pub fn new(manager: CommunicationManager, options: ConsultationOptions) -> Self {
        Self {
            manager,
            options,
            session_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Build the default roster, classifier, and manager from configuration
    pub fn from_config(config: &Config, provider: SharedProvider) -> Result<Self> {
        let agents = config
            .agent_profiles()?
            .into_iter()
            .map(|profile| Agent::new(profile, provider.clone()))
            .collect();

        let classifier = TopicClassifier::new(provider)
            .with_model(config.classifier_model())
            .with_temperature(config.routing.classifier_temperature);

        let manager = CommunicationManager::new(agents, InterestTable::defaults(), classifier)?
            .with_title(config.report.title.clone());

        Ok(Self::new(
            manager,
            ConsultationOptions {
                polish: config.report.polish_with_output_agent,
            },
        ))
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn manager(&self) -> &CommunicationManager {
        &self.manager
    }

    /// Run every turn, then aggregate (and optionally polish) the report
    pub async fn run(&mut self, client_input: &str) -> Result<ConsultationOutcome> {
        let client_input = client_input.trim();
        if client_input.is_empty() {
            return Err(AgentxError::Config("Client input is empty".to_string()));
        }

        let start_time = Instant::now();
        info!("Consultation {}: Starting", self.session_id);
        info!("Client input: {}", client_input);

        let mut completed = Vec::new();
        let mut failed = Vec::new();

        for (turn, kind) in TURN_ORDER.iter().copied().enumerate() {
            let input = (turn == 0).then_some(client_input);
            match self.take_turn(kind, input).await {
                Ok(()) => completed.push(kind),
                Err(e) => {
                    error!("Turn for {} failed: {}", kind, e);
                    failed.push((kind, e.to_string()));
                }
            }
        }

        let aggregated = self.manager.aggregate();
        let (report, polished) = if self.options.polish {
            self.polish(aggregated).await
        } else {
            (aggregated, false)
        };

        let usage = self
            .manager
            .agents()
            .iter()
            .fold(TokenUsage::default(), |mut total, agent| {
                total.add(agent.usage());
                total
            });
        let duration = start_time.elapsed();

        info!(
            "Consultation {}: Complete (completed={}, failed={}, tokens={})",
            self.session_id,
            completed.len(),
            failed.len(),
            usage.total()
        );

        Ok(ConsultationOutcome {
            session_id: self.session_id.clone(),
            report,
            completed,
            failed,
            polished,
            usage,
            duration_secs: duration.as_secs(),
        })
    }

    async fn take_turn(&mut self, kind: AgentKind, input: Option<&str>) -> Result<()> {
        let agent = self
            .manager
            .agent_mut(kind)
            .ok_or_else(|| AgentxError::UnknownAgent(kind.to_string()))?;
        info!("{} is responding", agent.name());

        let response = agent.generate_response(input).await?;
        self.manager.broadcast(kind, response).await?;
        Ok(())
    }

    /// Hand the aggregated report to the output agent; keep it unchanged on failure
    async fn polish(&mut self, aggregated: String) -> (String, bool) {
        let Some(agent) = self.manager.agent_mut(AgentKind::MarkdownOutput) else {
            warn!("No output agent in roster, keeping aggregated report");
            return (aggregated, false);
        };

        let result = agent.generate_response(Some(&aggregated)).await;
        match result {
            Ok(formatted) if !formatted.trim().is_empty() => (formatted, true),
            Ok(_) => {
                warn!("Output agent returned an empty document, keeping aggregated report");
                (aggregated, false)
            }
            Err(e) => {
                warn!("Report formatting failed, keeping aggregated report: {}", e);
                (aggregated, false)
            }
        }
    }
}

// =============================================================================
// Output
// =============================================================================

/// Write the report, creating parent directories as needed
pub fn write_report(path: &Path, report: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, report)
        .map_err(|e| AgentxError::Report(format!("Failed to write {}: {}", path.display(), e)))?;
    info!("Report written to {}", path.display());
    Ok(())
}

#[derive(Serialize)]
struct TranscriptFile<'a> {
    agent: &'a str,
    kind: AgentKind,
    timestamp: String,
    messages: &'a [Message],
}

/// Write one JSON transcript per agent, returning the written paths
pub fn export_transcripts(dir: &Path, manager: &CommunicationManager) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let now = Utc::now();
    let stamp = now.format("%Y%m%d_%H%M%S").to_string();

    let mut written = Vec::with_capacity(manager.agents().len());
    for agent in manager.agents() {
        let file = TranscriptFile {
            agent: agent.name(),
            kind: agent.kind(),
            timestamp: now.to_rfc3339(),
            messages: agent.transcript(),
        };
        let path = dir.join(format!("{}_{}.json", agent.kind(), stamp));
        fs::write(&path, serde_json::to_string_pretty(&file)?)?;
        written.push(path);
    }

    info!("Saved {} transcripts to {}", written.len(), dir.display());
    Ok(written)
}
