use console::style;
use std::fmt::Display;

use crate::types::{TopicSet, format_topics};

/// Styled stdout for command results; `quiet` silences everything
#[derive(Default)]
pub struct Output {
    quiet: bool,
}

impl Output {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quiet(quiet: bool) -> Self {
        Self { quiet }
    }

    fn emit(&self, line: impl Display) {
        if !self.quiet {
            println!("{}", line);
        }
    }

    pub fn success(&self, message: &str) {
        self.emit(format_args!("{} {}", style("✓").green(), message));
    }

    pub fn warning(&self, message: &str) {
        self.emit(format_args!("{} {}", style("⚠").yellow(), message));
    }

    pub fn info(&self, message: &str) {
        self.emit(format_args!("{} {}", style("ℹ").blue(), message));
    }

    pub fn header(&self, title: &str) {
        self.emit(format_args!("\n{}", style(title).bold().underlined()));
    }

    pub fn section(&self, title: &str) {
        self.emit(format_args!("\n{}\n{}", style(title).bold(), "─".repeat(40)));
    }

    /// Aligned `label: value` line
    pub fn field(&self, label: &str, value: &str) {
        self.emit(format_args!(
            "  {:<14} {}",
            style(format!("{}:", label)).dim(),
            value
        ));
    }

    pub fn topics(&self, label: &str, topics: &TopicSet) {
        self.field(label, &style(format_topics(topics)).cyan().to_string());
    }
}
