use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One line of a Claude Code transcript JSONL file. Only the fields needed
/// for usage accounting are deserialized; everything else is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptLine {
    pub timestamp: Option<String>,
    pub message: Option<TranscriptMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptMessage {
    pub model: Option<String>,
    pub usage: Option<MessageUsage>,
}

/// Token counters as they appear in the transcript `usage` object.
/// Absent counters default to zero.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct MessageUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub cache_creation_input_tokens: u64,
    #[serde(default)]
    pub cache_read_input_tokens: u64,
}

/// A transcript line that carried both usage data and a valid timestamp.
#[derive(Debug, Clone)]
pub struct UsageEvent {
    pub timestamp: DateTime<Utc>,
    pub model: String,
    pub usage: MessageUsage,
}

/// Token counts for one hourly bucket, broken into the four Claude token
/// categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenBreakdown {
    pub input: u64,
    pub output: u64,
    pub cache_creation: u64,
    pub cache_read: u64,
}

impl TokenBreakdown {
    pub fn add_usage(&mut self, usage: &MessageUsage) {
        self.input = self.input.saturating_add(usage.input_tokens);
        self.output = self.output.saturating_add(usage.output_tokens);
        self.cache_creation = self
            .cache_creation
            .saturating_add(usage.cache_creation_input_tokens);
        self.cache_read = self.cache_read.saturating_add(usage.cache_read_input_tokens);
    }

    /// Sum of the categories a chart kind displays.
    pub fn total(&self, kind: ChartKind) -> u64 {
        match kind {
            ChartKind::Io => self.input + self.output,
            ChartKind::Cache => self.cache_creation + self.cache_read,
            ChartKind::All => self.input + self.output + self.cache_creation + self.cache_read,
        }
    }
}

/// Which token categories a chart displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// All four token categories stacked.
    All,
    /// Input and output tokens only.
    Io,
    /// Cache creation and cache read tokens only.
    Cache,
}
