//! Structured, indexed memory facts.
//!
//! A fact is immutable once retained. Newer knowledge is a new fact; nothing
//! is edited or deleted in place.

use jautmem_storage::time_utils;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::entity::entity_tag;

/// What kind of knowledge a fact records.
///
/// Unknown category names are kept as [`FactCategory::Other`] after
/// normalization, so callers can introduce new categories freely.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FactCategory {
    World,
    Experience,
    Opinion,
    Interaction,
    #[default]
    Observation,
    /// Mirrors an entry written to curated core memory
    Core,
    /// Mirrors an observation appended to an entity
    Entity,
    Other(String),
}

impl FactCategory {
    pub fn as_str(&self) -> &str {
        match self {
            Self::World => "world",
            Self::Experience => "experience",
            Self::Opinion => "opinion",
            Self::Interaction => "interaction",
            Self::Observation => "observation",
            Self::Core => "core",
            Self::Entity => "entity",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for FactCategory {
    fn from(value: &str) -> Self {
        let normalized: String = value
            .trim()
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() {
                    ch.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect();
        match normalized.trim_matches('_') {
            "world" => Self::World,
            "experience" => Self::Experience,
            "opinion" => Self::Opinion,
            "interaction" => Self::Interaction,
            "" | "observation" => Self::Observation,
            "core" => Self::Core,
            "entity" => Self::Entity,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for FactCategory {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<FactCategory> for String {
    fn from(value: FactCategory) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for FactCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single retained memory fact.
///
/// # Example
///
/// ```rust
/// use jautmem_core::models::{Fact, FactCategory};
///
/// let fact = Fact::new(
///     "Cynix".to_string(),
///     FactCategory::Opinion,
///     "Coffee stains are a metaphor for human messiness".to_string(),
/// )
/// .with_confidence(0.8)
/// .with_entities(&["coffee_stains".to_string()]);
///
/// assert_eq!(fact.related_entities, vec!["@coffee_stains".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    /// Unique identifier (`fact-<uuid>`)
    pub id: String,

    /// Agent (or shared partition) that owns this fact
    pub agent: String,

    pub category: FactCategory,

    /// The fact text, tokenized into the search index
    pub content: String,

    /// Weight in 0.0..=1.0; opinions tend to sit below 1.0
    pub confidence: f64,

    /// Unix timestamp in milliseconds when this fact was retained
    pub created_at: i64,

    /// Normalized entity tags (`@slug`)
    #[serde(default)]
    pub related_entities: Vec<String>,

    /// Daily log file the fact was recorded alongside
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Fact {
    /// Create a new fact with a fresh id and the current timestamp.
    pub fn new(agent: String, category: FactCategory, content: String) -> Self {
        Self {
            id: format!("fact-{}", uuid::Uuid::new_v4()),
            agent,
            category,
            content,
            confidence: 1.0,
            created_at: time_utils::now_ms(),
            related_entities: Vec::new(),
            source: None,
        }
    }

    /// Set the confidence, clamped into 0.0..=1.0
    #[must_use]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = if confidence.is_nan() {
            1.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        self
    }

    /// Tag related entities. Names are normalized and de-duplicated.
    #[must_use]
    pub fn with_entities(mut self, entities: &[String]) -> Self {
        for tag in entities.iter().filter_map(|name| entity_tag(name)) {
            if !self.related_entities.contains(&tag) {
                self.related_entities.push(tag);
            }
        }
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: String) -> Self {
        self.source = Some(source);
        self
    }

    /// Override the creation timestamp (for imports and tests)
    #[must_use]
    pub fn with_created_at(mut self, created_at: i64) -> Self {
        self.created_at = created_at;
        self
    }

    /// Calendar date of creation as `YYYY-MM-DD` (UTC)
    pub fn created_date(&self) -> String {
        time_utils::format_date(self.created_at)
    }
}
