use std::collections::BTreeMap;

use crate::agents::AgentKind;
use crate::types::{Topic, TopicSet};

/// Topics each agent wants to hear about
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterestTable {
    entries: BTreeMap<AgentKind, TopicSet>,
}

impl InterestTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: AgentKind, topics: impl IntoIterator<Item = Topic>) -> Self {
        self.insert(kind, topics);
        self
    }

    pub fn insert(&mut self, kind: AgentKind, topics: impl IntoIterator<Item = Topic>) {
        self.entries.insert(kind, topics.into_iter().collect());
    }

    pub fn get(&self, kind: AgentKind) -> Option<&TopicSet> {
        self.entries.get(&kind)
    }

    pub fn contains(&self, kind: AgentKind) -> bool {
        self.entries.contains_key(&kind)
    }

    /// Whether the agent's interests intersect the given topics
    pub fn wants(&self, kind: AgentKind, topics: &TopicSet) -> bool {
        self.entries
            .get(&kind)
            .is_some_and(|interests| !interests.is_disjoint(topics))
    }

    pub fn iter(&self) -> impl Iterator<Item = (AgentKind, &TopicSet)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    /// Built-in interest profiles for the default roster
    pub fn defaults() -> Self {
        use Topic::*;
        Self::new()
            .with(AgentKind::BusinessAnalyst, [Business, ProjectManagement])
            .with(
                AgentKind::ItConsultant,
                [Business, Technical, Security, Infrastructure],
            )
            .with(
                AgentKind::SolutionArchitect,
                [Technical, Architecture, Security, Infrastructure],
            )
            .with(AgentKind::TechLead, [Technical, Development, Architecture])
            .with(AgentKind::DevOpsLead, [Devops, Infrastructure, Security])
            .with(AgentKind::ProjectManager, [ProjectManagement, Business])
            .with(AgentKind::MarkdownOutput, std::iter::empty())
    }
}
