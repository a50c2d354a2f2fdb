//! Topic-filtered message routing
//!
//! ## Modules
//! - `classifier`: keyword matching with an AI fallback
//! - `interests`: per-agent topic subscriptions
//! - `manager`: broadcast, history, and interaction queries
//! - `report`: Markdown aggregation of the latest responses

pub mod classifier;
pub mod interests;
pub mod manager;
pub mod report;

pub use classifier::{Classification, TopicClassifier, keyword_topics, parse_topic_list};
pub use interests::InterestTable;
pub use manager::{CommunicationManager, HistoryEntry, route};
pub use report::{BUCKETS, ReportBucket};
