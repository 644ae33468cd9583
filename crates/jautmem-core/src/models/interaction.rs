use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One exchange between an agent and another entity.
///
/// Folded into the other entity's blob; not queried on its own afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    /// The other agent or topic
    pub other: String,
    /// e.g. "reply", "upvote", "mention"
    pub kind: String,
    #[serde(default)]
    pub summary: Option<String>,
    /// Points worth keeping; each is retained as an interaction fact
    #[serde(default)]
    pub takeaways: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl InteractionRecord {
    pub fn new(other: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            other: other.into(),
            kind: kind.into(),
            summary: None,
            takeaways: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    #[must_use]
    pub fn with_takeaways(mut self, takeaways: Vec<String>) -> Self {
        self.takeaways = takeaways;
        self
    }

    #[must_use]
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Line appended to the other entity: `[kind] summary`
    pub fn entity_line(&self) -> String {
        match self.summary.as_deref().map(str::trim) {
            Some(summary) if !summary.is_empty() => format!("[{}] {}", self.kind, summary),
            _ => format!("[{}]", self.kind),
        }
    }
}
