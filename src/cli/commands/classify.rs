//! Classify Command
//!
//! Show the topics a message would be routed under and who would receive it.
//!
//! Usage:
//!   agentx classify "We need to cut cloud costs"

use tokio::runtime::Runtime;

use crate::agents::AgentKind;
use crate::ai::provider::create_provider;
use crate::cli::Output;
use crate::config::{Config, ConfigLoader};
use crate::routing::{Classification, InterestTable, TopicClassifier, keyword_topics, route};
use crate::types::{Result, TopicSet};

pub fn run(text: &str) -> Result<()> {
    let out = Output::new();
    let config = ConfigLoader::load()?;

    let keywords = keyword_topics(text);
    let (stage, topics) = if keywords.is_empty() {
        // only reach for a provider when keywords are silent
        let primary = config
            .llm
            .provider_configs()
            .into_iter()
            .next()
            .unwrap_or_default();
        let provider = create_provider(&primary)?;
        let classifier = TopicClassifier::new(provider)
            .with_model(config.classifier_model())
            .with_temperature(config.routing.classifier_temperature);

        let rt = Runtime::new()?;
        match rt.block_on(classifier.try_classify(text)) {
            Classification::Keywords(topics) => ("keywords", topics),
            Classification::Inferred(topics) => ("model", topics),
            Classification::FallbackFailed(e) => {
                out.warning(&format!("AI classification failed: {}", e));
                ("none", TopicSet::new())
            }
        }
    } else {
        ("keywords", keywords)
    };

    out.header("Classification");
    out.field("Source", stage);
    out.topics("Topics", &topics);

    let recipients: Vec<&str> = recipients(&config, &topics)?
        .into_iter()
        .map(|kind| kind.as_str())
        .collect();
    if recipients.is_empty() {
        out.field("Recipients", "(none)");
    } else {
        out.field("Recipients", &recipients.join(", "));
    }
    Ok(())
}

/// Who a consultation built from `config` would route these topics to
fn recipients(config: &Config, topics: &TopicSet) -> Result<Vec<AgentKind>> {
    let roster = config.agent_profiles()?;
    Ok(route(&roster, &InterestTable::defaults(), None, topics))
}
