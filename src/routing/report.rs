//! Markdown report aggregation
//!
//! Agents are grouped into fixed sections by a case-sensitive substring
//! match on their display name. Each section is evaluated independently,
//! so one agent may appear in more than one section.

use crate::agents::Agent;
use crate::constants::report::NEXT_STEPS;

/// A report section and the name fragments that select its agents
#[derive(Debug, Clone, Copy)]
pub struct ReportBucket {
    pub heading: &'static str,
    pub name_patterns: &'static [&'static str],
}

impl ReportBucket {
    pub fn matches(&self, agent_name: &str) -> bool {
        self.name_patterns.iter().any(|p| agent_name.contains(p))
    }
}

pub const BUCKETS: [ReportBucket; 5] = [
    ReportBucket {
        heading: "Business Analysis",
        name_patterns: &["Business Analyst"],
    },
    ReportBucket {
        heading: "Technical Assessment",
        name_patterns: &["IT Consultant"],
    },
    ReportBucket {
        heading: "Architecture & Design",
        name_patterns: &["Solution Architect", "Tech Lead"],
    },
    ReportBucket {
        heading: "Project Management",
        name_patterns: &["Project Manager"],
    },
    ReportBucket {
        heading: "Implementation & DevOps Strategy",
        name_patterns: &["DevOps Lead"],
    },
];

/// Render the roster's latest responses as a Markdown document
pub fn render(title: &str, agents: &[Agent]) -> String {
    let mut doc = String::new();
    doc.push_str(&format!("# {}\n\n", title));
    doc.push_str("## Executive Summary\n\n");

    for bucket in &BUCKETS {
        let entries: Vec<(&str, &str)> = agents
            .iter()
            .filter(|agent| bucket.matches(agent.name()))
            .filter_map(|agent| {
                agent
                    .latest_response()
                    .filter(|r| !r.trim().is_empty())
                    .map(|r| (agent.name(), r))
            })
            .collect();

        if entries.is_empty() {
            continue;
        }

        doc.push_str(&format!("## {}\n\n", bucket.heading));
        for (name, response) in entries {
            doc.push_str(&format!("### {}\n\n", name));
            doc.push_str(&format!("{}\n\n", response));
        }
    }

    doc.push_str("## Next Steps\n\n");
    for (idx, step) in NEXT_STEPS.iter().enumerate() {
        doc.push_str(&format!("{}. {}\n", idx + 1, step));
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{AgentKind, AgentProfile};
    use crate::testing::ScriptedProvider;

    async fn agent_with_response(kind: AgentKind, response: &str) -> Agent {
        let provider = ScriptedProvider::replying(response).shared();
        let mut agent = Agent::new(AgentProfile::default_for(kind), provider);
        agent.generate_response(None).await.unwrap();
        agent
    }

    fn silent(kind: AgentKind) -> Agent {
        Agent::new(
            AgentProfile::default_for(kind),
            ScriptedProvider::replying("unused").shared(),
        )
    }

    #[test]
    fn test_bucket_matching_is_case_sensitive() {
        assert!(BUCKETS[0].matches("AI Business Analyst"));
        assert!(!BUCKETS[0].matches("ai business analyst"));
        assert!(BUCKETS[2].matches("AI Tech Lead"));
    }

    #[test]
    fn test_empty_roster_has_only_frame() {
        let doc = render("Report", &[]);
        assert!(doc.starts_with("# Report\n\n## Executive Summary\n"));
        assert!(doc.contains("## Next Steps\n\n1. "));
        assert!(doc.contains("\n4. "));
        assert!(!doc.contains("## Business Analysis"));
    }

    #[tokio::test]
    async fn test_empty_buckets_are_omitted() {
        let agents = vec![
            agent_with_response(AgentKind::TechLead, "Use Rust").await,
            silent(AgentKind::BusinessAnalyst),
            agent_with_response(AgentKind::ProjectManager, "").await,
        ];

        let doc = render("Report", &agents);

        assert!(doc.contains("## Architecture & Design\n\n### AI Tech Lead\n\nUse Rust\n"));
        assert!(!doc.contains("## Business Analysis"));
        assert!(!doc.contains("## Project Management"));
        assert!(!doc.contains("## Technical Assessment"));
    }

    #[tokio::test]
    async fn test_single_business_analyst_section() {
        let mut agents = Vec::new();
        for (kind, text) in [
            (AgentKind::BusinessAnalyst, "BA findings"),
            (AgentKind::ItConsultant, "IT findings"),
            (AgentKind::SolutionArchitect, "SA findings"),
            (AgentKind::TechLead, "TL findings"),
            (AgentKind::DevOpsLead, "DO findings"),
            (AgentKind::ProjectManager, "PM findings"),
        ] {
            agents.push(agent_with_response(kind, text).await);
        }

        let doc = render("Report", &agents);

        assert_eq!(doc.matches("## Business Analysis").count(), 1);
        assert!(doc.contains("### AI Business Analyst\n\nBA findings\n"));
        assert_eq!(doc.matches("BA findings").count(), 1);

        let order: Vec<usize> = [
            "## Business Analysis",
            "## Technical Assessment",
            "## Architecture & Design",
            "## Project Management",
            "## Implementation & DevOps Strategy",
            "## Next Steps",
        ]
        .iter()
        .map(|h| doc.find(h).unwrap())
        .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]));

        let sa = doc.find("### AI Solution Architect").unwrap();
        let tl = doc.find("### AI Tech Lead").unwrap();
        assert!(sa < tl);
    }
}
