pub mod error;
pub mod message;
pub mod topic;

pub use error::{AgentxError, ErrorCategory, ErrorClassifier, LlmError, Result};
pub use message::{Message, Role};
pub use topic::{Topic, TopicSet, format_topics};
