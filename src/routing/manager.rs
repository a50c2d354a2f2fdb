//! Communication Manager
//!
//! Owns the roster, routes broadcasts to agents whose interests intersect
//! the message topics, and keeps the global history.
//!
//! ## Routing
//! - The sender never receives its own broadcast
//! - Non-routable agents never receive broadcasts
//! - Recipients are resolved in roster order and cached on the history entry

use std::collections::HashSet;

use serde::Serialize;
use tracing::{info, warn};

use super::classifier::TopicClassifier;
use super::interests::InterestTable;
use super::report;
use crate::agents::{Agent, AgentKind, AgentProfile};
use crate::constants::report::DEFAULT_TITLE;
use crate::types::{AgentxError, Message, Result, TopicSet, format_topics};

/// One broadcast as recorded in the global history
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub sender: AgentKind,
    pub message: Message,
    pub topics: TopicSet,
    /// Agents the message was routed to, resolved at broadcast time
    pub recipients: Vec<AgentKind>,
}

impl HistoryEntry {
    pub fn involves(&self, kind: AgentKind) -> bool {
        self.sender == kind || self.recipients.contains(&kind)
    }
}

/// Roster-ordered recipients: routable, not the sender, interests intersecting `topics`
pub fn route<'a>(
    roster: impl IntoIterator<Item = &'a AgentProfile>,
    interests: &InterestTable,
    sender: Option<AgentKind>,
    topics: &TopicSet,
) -> Vec<AgentKind> {
    roster
        .into_iter()
        .filter(|p| Some(p.kind) != sender)
        .filter(|p| p.routable)
        .filter(|p| interests.wants(p.kind, topics))
        .map(|p| p.kind)
        .collect()
}

pub struct CommunicationManager {
    agents: Vec<Agent>,
    interests: InterestTable,
    classifier: TopicClassifier,
    history: Vec<HistoryEntry>,
    title: String,
}

impl CommunicationManager {
    /// Build a manager over a fixed roster.
    ///
    /// Fails when two agents share a kind or display name, or when a routable
    /// agent has no interest entry.
    pub fn new(
        agents: Vec<Agent>,
        interests: InterestTable,
        classifier: TopicClassifier,
    ) -> Result<Self> {
        let mut kinds = HashSet::new();
        let mut names = HashSet::new();
        for agent in &agents {
            if !kinds.insert(agent.kind()) {
                return Err(AgentxError::Config(format!(
                    "Duplicate agent kind in roster: {}",
                    agent.kind()
                )));
            }
            if !names.insert(agent.name().to_string()) {
                return Err(AgentxError::Config(format!(
                    "Duplicate agent name in roster: {}",
                    agent.name()
                )));
            }
            if agent.is_routable() && !interests.contains(agent.kind()) {
                return Err(AgentxError::Config(format!(
                    "No interest profile registered for {}",
                    agent.name()
                )));
            }
        }

        info!("Communication manager ready with {} agents", agents.len());
        Ok(Self {
            agents,
            interests,
            classifier,
            history: Vec::new(),
            title: DEFAULT_TITLE.to_string(),
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    // ===== Roster =====

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, kind: AgentKind) -> Option<&Agent> {
        self.agents.iter().find(|a| a.kind() == kind)
    }

    pub fn agent_mut(&mut self, kind: AgentKind) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.kind() == kind)
    }

    pub fn interests(&self) -> &InterestTable {
        &self.interests
    }

    pub fn classifier(&self) -> &TopicClassifier {
        &self.classifier
    }

    // ===== Routing =====

    /// Agents that should receive a message with the given topics
    pub fn recipients_for(&self, sender: Option<AgentKind>, topics: &TopicSet) -> Vec<AgentKind> {
        route(
            self.agents.iter().map(Agent::profile),
            &self.interests,
            sender,
            topics,
        )
    }

    /// Classify a message from `sender` and deliver it to interested agents.
    ///
    /// Per-recipient delivery failures are logged and skipped.
    pub async fn broadcast(
        &mut self,
        sender: AgentKind,
        content: impl Into<String>,
    ) -> Result<&HistoryEntry> {
        let sender_name = self
            .agent(sender)
            .ok_or_else(|| AgentxError::UnknownAgent(sender.to_string()))?
            .name()
            .to_string();

        let message = Message::from_agent(sender_name.as_str(), content);
        let topics = self.classifier.classify(message.content()).await;
        let targets = self.recipients_for(Some(sender), &topics);

        for &kind in &targets {
            let Some(agent) = self.agent_mut(kind) else {
                continue;
            };
            if let Err(e) = agent.receive_message(message.clone()) {
                warn!("Skipping recipient {}: {}", kind, e);
            }
        }

        if targets.is_empty() {
            info!(
                "Broadcast from {} [{}] reached no agents",
                sender_name,
                format_topics(&topics)
            );
        } else {
            let names: Vec<&str> = targets.iter().map(|k| k.as_str()).collect();
            info!(
                "Broadcast from {} [{}] routed to: {}",
                sender_name,
                format_topics(&topics),
                names.join(", ")
            );
        }

        let idx = self.history.len();
        self.history.push(HistoryEntry {
            sender,
            message,
            topics,
            recipients: targets,
        });
        Ok(&self.history[idx])
    }

    // ===== History =====

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.history.iter().map(|entry| &entry.message)
    }

    /// Messages the agent sent or received, in emission order
    pub fn interactions(&self, kind: AgentKind) -> Vec<&Message> {
        self.history
            .iter()
            .filter(|entry| entry.involves(kind))
            .map(|entry| &entry.message)
            .collect()
    }

    // ===== Report =====

    /// Render the roster's latest responses as a Markdown report
    pub fn aggregate(&self) -> String {
        report::render(&self.title, &self.agents)
    }
}

impl std::fmt::Debug for CommunicationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommunicationManager")
            .field("agents", &self.agents.len())
            .field("history", &self.history.len())
            .field("classifier", &self.classifier)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgentProfile;
    use crate::testing::{ScriptedProvider, as_shared};
    use crate::types::{Role, Topic};
    use proptest::prelude::*;
    use std::sync::Arc;

    fn roster(provider: &Arc<ScriptedProvider>) -> Vec<Agent> {
        AgentProfile::defaults()
            .into_iter()
            .map(|p| Agent::new(p, as_shared(provider)))
            .collect()
    }

    fn manager_with(classifier_reply: ScriptedProvider) -> (CommunicationManager, Arc<ScriptedProvider>) {
        let agent_provider = ScriptedProvider::echo_agent().shared();
        let classifier = TopicClassifier::new(classifier_reply.shared());
        let manager = CommunicationManager::new(
            roster(&agent_provider),
            InterestTable::defaults(),
            classifier,
        )
        .unwrap();
        (manager, agent_provider)
    }

    fn topics(items: &[Topic]) -> TopicSet {
        items.iter().copied().collect()
    }

    #[test]
    fn test_recipients_exclude_sender_and_unroutable() {
        let (manager, _) = manager_with(ScriptedProvider::failing("unused"));
        let all: TopicSet = Topic::ALL.into_iter().collect();

        let recipients = manager.recipients_for(Some(AgentKind::TechLead), &all);

        assert!(!recipients.contains(&AgentKind::TechLead));
        assert!(!recipients.contains(&AgentKind::MarkdownOutput));
        assert_eq!(recipients.len(), 5);
    }

    #[test]
    fn test_recipients_follow_roster_order() {
        let (manager, _) = manager_with(ScriptedProvider::failing("unused"));

        let recipients = manager.recipients_for(None, &topics(&[Topic::Security]));

        assert_eq!(
            recipients,
            vec![
                AgentKind::ItConsultant,
                AgentKind::SolutionArchitect,
                AgentKind::DevOpsLead
            ]
        );
    }

    #[test]
    fn test_new_rejects_duplicates_and_missing_interests() {
        let provider = ScriptedProvider::replying("x").shared();
        let classifier = || TopicClassifier::new(as_shared(&provider));

        let mut duplicated = roster(&provider);
        duplicated.push(Agent::new(
            AgentProfile::default_for(AgentKind::TechLead),
            as_shared(&provider),
        ));
        assert!(matches!(
            CommunicationManager::new(duplicated, InterestTable::defaults(), classifier()),
            Err(AgentxError::Config(_))
        ));

        let renamed = vec![
            Agent::new(
                AgentProfile::default_for(AgentKind::TechLead),
                as_shared(&provider),
            ),
            Agent::new(
                AgentProfile {
                    name: "AI Tech Lead".to_string(),
                    ..AgentProfile::default_for(AgentKind::DevOpsLead)
                },
                as_shared(&provider),
            ),
        ];
        assert!(
            CommunicationManager::new(renamed, InterestTable::defaults(), classifier()).is_err()
        );

        let partial = InterestTable::new().with(AgentKind::TechLead, [Topic::Technical]);
        assert!(CommunicationManager::new(roster(&provider), partial, classifier()).is_err());
    }

    #[test]
    fn test_unroutable_agent_needs_no_interests() {
        let provider = ScriptedProvider::replying("x").shared();
        let agents = vec![Agent::new(
            AgentProfile::default_for(AgentKind::MarkdownOutput),
            as_shared(&provider),
        )];
        let manager = CommunicationManager::new(
            agents,
            InterestTable::new(),
            TopicClassifier::new(as_shared(&provider)),
        );
        assert!(manager.is_ok());
    }

    #[tokio::test]
    async fn test_broadcast_delivers_to_interested_agents() {
        let (mut manager, _) = manager_with(ScriptedProvider::failing("unused"));

        let entry = manager
            .broadcast(AgentKind::BusinessAnalyst, "Improve the CI/CD pipeline")
            .await
            .unwrap();

        assert_eq!(entry.topics, topics(&[Topic::Devops]));
        assert_eq!(entry.recipients, vec![AgentKind::DevOpsLead]);
        assert_eq!(entry.message.sender(), Some("AI Business Analyst"));
        assert_eq!(entry.message.role(), Role::Assistant);

        let devops = manager.agent(AgentKind::DevOpsLead).unwrap();
        assert_eq!(devops.transcript().len(), 1);
        assert_eq!(
            devops.transcript()[0].content(),
            "Improve the CI/CD pipeline"
        );
        assert!(manager.agent(AgentKind::TechLead).unwrap().transcript().is_empty());
    }

    #[tokio::test]
    async fn test_sender_with_matching_interests_does_not_receive() {
        let (mut manager, _) = manager_with(ScriptedProvider::failing("unused"));

        manager
            .broadcast(AgentKind::DevOpsLead, "Automate the deployment pipeline")
            .await
            .unwrap();

        assert!(manager.agent(AgentKind::DevOpsLead).unwrap().transcript().is_empty());
        assert!(
            manager
                .agent(AgentKind::MarkdownOutput)
                .unwrap()
                .transcript()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_disjoint_interests_deliver_nothing() {
        let provider = ScriptedProvider::replying("x").shared();
        let agents = vec![
            Agent::new(
                AgentProfile::default_for(AgentKind::BusinessAnalyst),
                as_shared(&provider),
            ),
            Agent::new(
                AgentProfile::default_for(AgentKind::TechLead),
                as_shared(&provider),
            ),
        ];
        let interests = InterestTable::new()
            .with(AgentKind::BusinessAnalyst, [Topic::Business])
            .with(AgentKind::TechLead, [Topic::Development]);
        let mut manager = CommunicationManager::new(
            agents,
            interests,
            TopicClassifier::new(as_shared(&provider)),
        )
        .unwrap();

        let entry = manager
            .broadcast(AgentKind::BusinessAnalyst, "Harden security against a breach")
            .await
            .unwrap();

        assert!(entry.recipients.is_empty());
        assert_eq!(manager.history().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_classification_routes_nowhere() {
        let (mut manager, _) = manager_with(ScriptedProvider::failing("timeout"));

        let entry = manager
            .broadcast(AgentKind::TechLead, "Hello team")
            .await
            .unwrap();

        assert!(entry.topics.is_empty());
        assert!(entry.recipients.is_empty());
    }

    #[tokio::test]
    async fn test_blank_broadcast_is_routed_and_recorded() {
        // blank content misses every keyword, so the fallback answers "business"
        let (mut manager, _) = manager_with(ScriptedProvider::replying("business"));

        let entry = manager.broadcast(AgentKind::TechLead, "   ").await.unwrap();

        assert_eq!(entry.topics, topics(&[Topic::Business]));
        assert_eq!(
            entry.recipients,
            vec![
                AgentKind::BusinessAnalyst,
                AgentKind::ItConsultant,
                AgentKind::ProjectManager
            ]
        );
        let analyst = manager.agent(AgentKind::BusinessAnalyst).unwrap();
        assert_eq!(analyst.transcript().len(), 1);
        assert_eq!(analyst.transcript()[0].content(), "   ");
        assert_eq!(manager.interactions(AgentKind::BusinessAnalyst).len(), 1);
    }

    #[tokio::test]
    async fn test_output_agent_never_receives_even_with_interests() {
        let provider = ScriptedProvider::echo_agent().shared();
        let all: TopicSet = Topic::ALL.into_iter().collect();
        let interests = InterestTable::defaults().with(AgentKind::MarkdownOutput, Topic::ALL);
        let mut manager = CommunicationManager::new(
            roster(&provider),
            interests,
            TopicClassifier::new(as_shared(&provider)),
        )
        .unwrap();

        assert!(
            !manager
                .recipients_for(None, &all)
                .contains(&AgentKind::MarkdownOutput)
        );

        let entry = manager
            .broadcast(AgentKind::TechLead, "Cloud security budget for the API rollout")
            .await
            .unwrap();
        assert!(!entry.recipients.is_empty());
        assert!(!entry.recipients.contains(&AgentKind::MarkdownOutput));
        assert!(
            manager
                .agent(AgentKind::MarkdownOutput)
                .unwrap()
                .transcript()
                .is_empty()
        );
        assert!(manager.interactions(AgentKind::MarkdownOutput).is_empty());

        let profiles = AgentProfile::defaults();
        let routed = route(&profiles, manager.interests(), None, &all);
        assert_eq!(routed, manager.recipients_for(None, &all));
    }

    #[tokio::test]
    async fn test_unknown_sender_is_rejected() {
        let provider = ScriptedProvider::replying("x").shared();
        let agents = vec![Agent::new(
            AgentProfile::default_for(AgentKind::TechLead),
            as_shared(&provider),
        )];
        let interests = InterestTable::new().with(AgentKind::TechLead, [Topic::Technical]);
        let mut manager = CommunicationManager::new(
            agents,
            interests,
            TopicClassifier::new(as_shared(&provider)),
        )
        .unwrap();

        let result = manager.broadcast(AgentKind::ProjectManager, "budget").await;

        assert!(matches!(result, Err(AgentxError::UnknownAgent(_))));
        assert!(manager.history().is_empty());
    }

    #[tokio::test]
    async fn test_interactions_use_cached_recipients() {
        let (mut manager, agent_provider) = manager_with(ScriptedProvider::failing("unused"));

        manager
            .broadcast(AgentKind::BusinessAnalyst, "Cloud hosting costs are rising")
            .await
            .unwrap();
        manager
            .broadcast(AgentKind::TechLead, "Refactor the database code")
            .await
            .unwrap();

        let it = manager.interactions(AgentKind::ItConsultant);
        assert_eq!(it.len(), 2);
        let ba = manager.interactions(AgentKind::BusinessAnalyst);
        assert_eq!(ba.len(), 1);
        assert_eq!(ba[0].sender(), Some("AI Business Analyst"));
        assert!(manager.interactions(AgentKind::MarkdownOutput).is_empty());
        assert_eq!(agent_provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_messages_iterates_in_emission_order() {
        let (mut manager, _) = manager_with(ScriptedProvider::failing("unused"));

        for text in ["api first", "cloud second", "sprint third"] {
            manager.broadcast(AgentKind::TechLead, text).await.unwrap();
        }

        let contents: Vec<&str> = manager.messages().map(Message::content).collect();
        assert_eq!(contents, vec!["api first", "cloud second", "sprint third"]);
    }

    #[tokio::test]
    async fn test_aggregate_uses_manager_title() {
        let (manager, _) = manager_with(ScriptedProvider::failing("unused"));
        let manager = manager.with_title("Client Review");

        assert!(manager.aggregate().starts_with("# Client Review\n"));
    }

    proptest! {
        #[test]
        fn prop_history_length_matches_broadcasts(
            senders in proptest::collection::vec(0usize..6, 0..12),
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let (mut manager, _) = manager_with(ScriptedProvider::replying("technical"));
                let mut expected = Vec::new();
                for (i, idx) in senders.iter().enumerate() {
                    let sender = AgentKind::ALL[*idx];
                    let text = format!("update {} on security", i);
                    manager.broadcast(sender, text.clone()).await.unwrap();
                    expected.push((sender, text));
                }

                prop_assert_eq!(manager.history().len(), expected.len());
                for (entry, (sender, text)) in manager.history().iter().zip(&expected) {
                    prop_assert_eq!(entry.sender, *sender);
                    prop_assert_eq!(entry.message.content(), text.as_str());
                    prop_assert!(!entry.recipients.contains(sender));
                    prop_assert!(!entry.recipients.contains(&AgentKind::MarkdownOutput));
                }
                Ok(())
            })?;
        }
    }
}
