//! Global Constants
//!
//! Centralized constants for configuration and tuning.

/// Provider defaults
pub mod provider {
    /// Request timeout for chat completions (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// Completion length cap per request
    pub const DEFAULT_MAX_TOKENS: usize = 1000;

    /// Default agent temperature
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;
}

/// Provider chain constants
pub mod chain {
    /// Maximum total attempts across all providers
    pub const MAX_TOTAL_ATTEMPTS: usize = 10;

    /// Default maximum attempts per provider
    pub const DEFAULT_MAX_RETRIES: u8 = 3;

    /// Base delay for exponential backoff (milliseconds)
    pub const BASE_DELAY_MS: u64 = 500;

    /// Maximum delay between retries (seconds)
    pub const MAX_DELAY_SECS: u64 = 30;

    pub const BACKOFF_FACTOR: f32 = 2.0;
}

/// Topic classifier constants
pub mod routing {
    /// Model used for the AI classification fallback
    pub const CLASSIFIER_MODEL: &str = "gpt-3.5-turbo";

    /// Low temperature keeps category answers stable
    pub const CLASSIFIER_TEMPERATURE: f32 = 0.0;
}

/// Report layout constants
pub mod report {
    pub const DEFAULT_TITLE: &str = "AI Consultancy Report";

    pub const DEFAULT_OUTPUT_PATH: &str = "final_report.md";

    pub const DEFAULT_TRANSCRIPTS_DIR: &str = "conversations";

    /// Fixed closing action items
    pub const NEXT_STEPS: [&str; 4] = [
        "Review and validate the proposed recommendations with key stakeholders",
        "Prioritize initiatives and define an implementation roadmap",
        "Allocate budget, resources, and owners for each workstream",
        "Establish success metrics and schedule regular progress reviews",
    ];
}
