//! Topic classification
//!
//! Two stages:
//! 1. Keyword matching (substring search on lower-cased text)
//! 2. AI fallback, only when no keyword matched

use tracing::{debug, error, info, warn};

use crate::ai::provider::SharedProvider;
use crate::constants::routing::{CLASSIFIER_MODEL, CLASSIFIER_TEMPERATURE};
use crate::types::{AgentxError, Message, Topic, TopicSet, format_topics};

// ===== Keyword Table =====

const KEYWORDS: &[(Topic, &[&str])] = &[
    (
        Topic::Business,
        &[
            "business",
            "roi",
            "revenue",
            "cost",
            "stakeholder",
            "market",
            "budget",
            "requirement",
            "customer",
            "profit",
            "strategy",
        ],
    ),
    (
        Topic::Technical,
        &[
            "technical",
            "api",
            "integration",
            "software",
            "system",
            "code",
            "database",
            "performance",
        ],
    ),
    (
        Topic::Security,
        &[
            "security",
            "secure",
            "vulnerab",
            "encrypt",
            "authentication",
            "authorization",
            "compliance",
            "threat",
            "breach",
            "privacy",
        ],
    ),
    (
        Topic::Infrastructure,
        &[
            "infrastructure",
            "server",
            "cloud",
            "network",
            "hosting",
            "storage",
            "kubernetes",
            "aws",
            "azure",
        ],
    ),
    (
        Topic::Development,
        &[
            "development",
            "develop",
            "coding",
            "implementation",
            "implement",
            "testing",
            "framework",
            "programming",
        ],
    ),
    (
        Topic::ProjectManagement,
        &[
            "project",
            "timeline",
            "milestone",
            "deadline",
            "resource",
            "schedule",
            "deliverable",
            "sprint",
        ],
    ),
    (
        Topic::Architecture,
        &[
            "architecture",
            "design",
            "microservice",
            "component",
            "pattern",
            "scalability",
            "monolith",
        ],
    ),
    (
        Topic::Devops,
        &[
            "devops",
            "ci/cd",
            "pipeline",
            "deployment",
            "deploy",
            "automation",
            "monitoring",
            "container",
            "docker",
        ],
    ),
];

/// Keywords registered for a topic
pub fn keywords_for(topic: Topic) -> &'static [&'static str] {
    KEYWORDS
        .iter()
        .find(|(t, _)| *t == topic)
        .map(|(_, words)| *words)
        .unwrap_or(&[])
}

/// Topics whose keywords occur anywhere in the text
pub fn keyword_topics(text: &str) -> TopicSet {
    let lowered = text.to_lowercase();
    KEYWORDS
        .iter()
        .filter(|(_, words)| words.iter().any(|w| lowered.contains(w)))
        .map(|(topic, _)| *topic)
        .collect()
}

/// Parse a comma-separated model answer into topics.
///
/// Unrecognized tokens are dropped with a warning.
pub fn parse_topic_list(answer: &str) -> TopicSet {
    answer
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| match token.parse::<Topic>() {
            Ok(topic) => Some(topic),
            Err(_) => {
                warn!("Dropping unrecognized topic token: {}", token);
                None
            }
        })
        .collect()
}

fn fallback_prompt(text: &str) -> String {
    let labels: Vec<&str> = Topic::ALL.iter().map(Topic::as_str).collect();
    format!(
        "Classify the following message into one or more of these categories: {}.\n\
         Respond only with a comma-separated list of category names.\n\n\
         Message: {}",
        labels.join(", "),
        text
    )
}

// ===== Classifier =====

/// How a topic set was obtained
#[derive(Debug)]
pub enum Classification {
    Keywords(TopicSet),
    Inferred(TopicSet),
    FallbackFailed(AgentxError),
}

impl Classification {
    /// Topic set, empty when the fallback failed
    pub fn into_topics(self) -> TopicSet {
        match self {
            Classification::Keywords(topics) | Classification::Inferred(topics) => topics,
            Classification::FallbackFailed(_) => TopicSet::new(),
        }
    }
}

pub struct TopicClassifier {
    provider: SharedProvider,
    model: String,
    temperature: f32,
}

impl TopicClassifier {
    pub fn new(provider: SharedProvider) -> Self {
        Self {
            provider,
            model: CLASSIFIER_MODEL.to_string(),
            temperature: CLASSIFIER_TEMPERATURE,
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

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Classify, reporting which stage produced the result
    pub async fn try_classify(&self, text: &str) -> Classification {
        let topics = keyword_topics(text);
        if !topics.is_empty() {
            debug!("Keyword classification: {}", format_topics(&topics));
            return Classification::Keywords(topics);
        }

        debug!("No keyword match, asking {} for topics", self.model);
        let prompt = vec![Message::user(fallback_prompt(text))];
        match self
            .provider
            .complete(&prompt, &self.model, self.temperature)
            .await
        {
            Ok(response) => Classification::Inferred(parse_topic_list(&response.content)),
            Err(e) => Classification::FallbackFailed(AgentxError::Classification(e.to_string())),
        }
    }

    /// Classify text into topics; never fails
    pub async fn classify(&self, text: &str) -> TopicSet {
        let classification = self.try_classify(text).await;
        if let Classification::FallbackFailed(ref e) = classification {
            error!("Topic classification fallback failed: {}", e);
        }
        let topics = classification.into_topics();
        info!("Message classified as: {}", format_topics(&topics));
        topics
    }
}

impl std::fmt::Debug for TopicClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopicClassifier")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedProvider, as_shared};
    use proptest::prelude::*;

    #[test]
    fn test_business_keyword() {
        assert!(keyword_topics("What is the ROI of this?").contains(&Topic::Business));
    }

    #[test]
    fn test_technical_keyword() {
        assert!(keyword_topics("We need an API integration").contains(&Topic::Technical));
    }

    #[test]
    fn test_empty_text_has_no_keywords() {
        assert!(keyword_topics("").is_empty());
    }

    #[test]
    fn test_multiple_topics() {
        let topics = keyword_topics("Deploy the Docker container to the cloud securely");
        assert!(topics.contains(&Topic::Devops));
        assert!(topics.contains(&Topic::Infrastructure));
        assert!(topics.contains(&Topic::Security));
    }

    #[test]
    fn test_every_topic_has_keywords() {
        for topic in Topic::ALL {
            assert!(!keywords_for(topic).is_empty(), "{} has no keywords", topic);
        }
    }

    #[test]
    fn test_parse_topic_list_normalizes_and_drops_unknown() {
        let topics = parse_topic_list(" Business, Project Management ,weather,, DEVOPS");
        let expected: TopicSet = [Topic::Business, Topic::ProjectManagement, Topic::Devops]
            .into_iter()
            .collect();
        assert_eq!(topics, expected);
    }

    #[tokio::test]
    async fn test_keyword_hit_skips_provider() {
        let provider = ScriptedProvider::replying("security").shared();
        let classifier = TopicClassifier::new(as_shared(&provider));

        let result = classifier.try_classify("cut infrastructure cost").await;

        assert!(matches!(result, Classification::Keywords(_)));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_fallback_infers_topics() {
        let provider = ScriptedProvider::replying("security, architecture").shared();
        let classifier = TopicClassifier::new(as_shared(&provider)).with_model("local-model");

        let result = classifier.try_classify("Hello there").await;

        let Classification::Inferred(topics) = result else {
            panic!("expected inferred classification");
        };
        assert!(topics.contains(&Topic::Security));
        assert!(topics.contains(&Topic::Architecture));

        let call = &provider.calls()[0];
        assert_eq!(call.model, "local-model");
        assert!(call.temperature.abs() < f32::EPSILON);
        assert!(call.messages[0].content().contains("project_management"));
        assert!(call.messages[0].content().contains("Hello there"));
    }

    #[tokio::test]
    async fn test_failed_fallback_yields_empty_set() {
        let provider = ScriptedProvider::failing("connection refused").shared();
        let classifier = TopicClassifier::new(as_shared(&provider));

        assert!(matches!(
            classifier.try_classify("Hello there").await,
            Classification::FallbackFailed(AgentxError::Classification(_))
        ));
        assert!(classifier.classify("Hello there").await.is_empty());
    }

    proptest! {
        #[test]
        fn prop_keyword_embedded_anywhere_is_found(
            prefix in "[a-z ]{0,20}",
            suffix in "[a-z ]{0,20}",
            topic_idx in 0usize..8,
            word_idx in 0usize..16,
        ) {
            let topic = Topic::ALL[topic_idx];
            let words = keywords_for(topic);
            let word = words[word_idx % words.len()];
            let text = format!("{}{}{}", prefix, word.to_uppercase(), suffix);
            prop_assert!(keyword_topics(&text).contains(&topic));
        }

        #[test]
        fn prop_keyword_topics_never_panics(text in ".{0,200}") {
            let topics = keyword_topics(&text);
            prop_assert!(topics.len() <= Topic::ALL.len());
        }
    }
}
