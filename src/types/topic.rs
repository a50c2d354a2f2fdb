//! Routing topics
//!
//! The eight labels are a wire contract with the AI fallback classifier:
//! they serialize in snake_case and parse back from normalized tokens.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Closed set of message topics used for routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Business,
    Technical,
    Security,
    Infrastructure,
    Development,
    ProjectManagement,
    Architecture,
    Devops,
}

/// Unordered, duplicate-free set of topics
pub type TopicSet = BTreeSet<Topic>;

impl Topic {
    pub const ALL: [Topic; 8] = [
        Topic::Business,
        Topic::Technical,
        Topic::Security,
        Topic::Infrastructure,
        Topic::Development,
        Topic::ProjectManagement,
        Topic::Architecture,
        Topic::Devops,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Business => "business",
            Topic::Technical => "technical",
            Topic::Security => "security",
            Topic::Infrastructure => "infrastructure",
            Topic::Development => "development",
            Topic::ProjectManagement => "project_management",
            Topic::Architecture => "architecture",
            Topic::Devops => "devops",
        }
    }

    /// Normalize a free-form token: trim, lower-case, spaces to underscores
    pub fn normalize(token: &str) -> String {
        token.trim().to_lowercase().replace(' ', "_")
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Topic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = Topic::normalize(s);
        Topic::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| format!("Unknown topic: {}", s.trim()))
    }
}

/// Render a topic set as a comma-separated list for logs
pub fn format_topics(topics: &TopicSet) -> String {
    if topics.is_empty() {
        return "(none)".to_string();
    }
    topics
        .iter()
        .map(Topic::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
