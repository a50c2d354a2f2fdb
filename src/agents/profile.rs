//! Agent identities and the default consultancy roster

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::provider::DEFAULT_TEMPERATURE;

/// Stable identifier for a roster agent
///
/// Routing, interest lookup, and turn order are keyed by this value rather
/// than by the display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    BusinessAnalyst,
    ItConsultant,
    SolutionArchitect,
    TechLead,
    #[serde(rename = "devops_lead")]
    DevOpsLead,
    ProjectManager,
    MarkdownOutput,
}

impl AgentKind {
    pub const ALL: [AgentKind; 7] = [
        AgentKind::BusinessAnalyst,
        AgentKind::ItConsultant,
        AgentKind::SolutionArchitect,
        AgentKind::TechLead,
        AgentKind::DevOpsLead,
        AgentKind::ProjectManager,
        AgentKind::MarkdownOutput,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::BusinessAnalyst => "business_analyst",
            AgentKind::ItConsultant => "it_consultant",
            AgentKind::SolutionArchitect => "solution_architect",
            AgentKind::TechLead => "tech_lead",
            AgentKind::DevOpsLead => "devops_lead",
            AgentKind::ProjectManager => "project_manager",
            AgentKind::MarkdownOutput => "markdown_output",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        AgentKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| format!("Unknown agent: {}", s))
    }
}

/// Static identity and model settings of one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub kind: AgentKind,
    /// Display name; also the report bucket key
    pub name: String,
    pub role_description: String,
    pub responsibilities: Vec<String>,
    pub model: String,
    pub temperature: f32,
    /// Whether the agent receives broadcasts
    pub routable: bool,
}

impl AgentProfile {
    pub fn new(
        kind: AgentKind,
        name: impl Into<String>,
        role_description: impl Into<String>,
        responsibilities: &[&str],
        model: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            role_description: role_description.into(),
            responsibilities: responsibilities.iter().map(|r| r.to_string()).collect(),
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            routable: true,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Exclude the agent from broadcast routing
    pub fn unroutable(mut self) -> Self {
        self.routable = false;
        self
    }

    /// Built-in profile for a roster slot
    pub fn default_for(kind: AgentKind) -> Self {
        match kind {
            AgentKind::BusinessAnalyst => Self::new(
                kind,
                "AI Business Analyst",
                "who gathers and analyzes client requirements.",
                &[
                    "Document business processes",
                    "Ensure solutions meet business needs",
                ],
                "gpt-3.5-turbo",
            ),
            AgentKind::ItConsultant => Self::new(
                kind,
                "AI IT Consultant",
                "who assesses client IT environments and provides strategic advice.",
                &[
                    "Identify issues and areas for improvement",
                    "Recommend technology solutions aligning with business goals",
                ],
                "gpt-4",
            ),
            AgentKind::SolutionArchitect => Self::new(
                kind,
                "AI Solution Architect",
                "who designs IT system architectures.",
                &[
                    "Select appropriate technologies and platforms",
                    "Ensure scalability and security of solutions",
                    "Provide technical oversight during implementation",
                ],
                "gpt-4",
            ),
            AgentKind::TechLead => Self::new(
                kind,
                "AI Tech Lead",
                "who oversees technical development.",
                &[
                    "Lead development teams",
                    "Ensure code quality and best practices",
                    "Coordinate technical solutions",
                ],
                "gpt-4",
            ),
            AgentKind::DevOpsLead => Self::new(
                kind,
                "AI DevOps Lead",
                "who oversees the DevOps processes.",
                &[
                    "Implement CI/CD pipelines",
                    "Ensure system reliability and scalability",
                    "Automate infrastructure management",
                ],
                "gpt-4",
            ),
            AgentKind::ProjectManager => Self::new(
                kind,
                "AI Project Manager",
                "who oversees project planning and execution.",
                &[
                    "Coordinate between different AI agents",
                    "Monitor timelines and deliverables",
                    "Communicate progress to stakeholders",
                ],
                "gpt-4",
            ),
            AgentKind::MarkdownOutput => Self::new(
                kind,
                "AI Markdown Output Agent",
                "who formats the final response into a Markdown document.",
                &[
                    "Compile responses from all agents",
                    "Format content using Markdown syntax",
                    "Ensure clarity and professionalism in the document",
                ],
                "gpt-4",
            )
            .unroutable(),
        }
    }

    /// The full seven-agent roster in roster order
    pub fn defaults() -> Vec<Self> {
        AgentKind::ALL.iter().map(|k| Self::default_for(*k)).collect()
    }

    /// System prompt synthesized on the agent's first generation
    pub fn system_prompt(&self) -> String {
        let mut content = format!("You are {}, {}\n", self.name, self.role_description);
        content.push_str("Your responsibilities include:\n");
        for (idx, responsibility) in self.responsibilities.iter().enumerate() {
            content.push_str(&format!("{}. {}\n", idx + 1, responsibility));
        }
        content
    }
}
