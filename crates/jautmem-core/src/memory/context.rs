//! Token-bounded context assembly.
//!
//! Stages run in a fixed priority order and all draw from one budget:
//!
//! 1. core memory, always included in full
//! 2. recent daily logs
//! 3. facts ranked against the current topic
//! 4. one profile per participant, in the order given
//!
//! A stage that overruns the budget is still kept whole. The budget only
//! decides whether later stages run at all.

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use super::recall::{RecallOptions, recall};
use crate::config::MemoryConfig;
use crate::error::MemoryResult;
use crate::models::{Fact, entity_slug, render_logs, validate_agent};
use crate::storage::{CuratedMemoryStore, DailyLogStore, EntityStore, FactStore, MemoryScope};

pub const CORE_MEMORY_HEADER: &str = "=== CORE MEMORY ===";
pub const RECENT_ACTIVITY_HEADER: &str = "=== RECENT ACTIVITY ===";

pub fn topic_header(topic: &str) -> String {
    format!("=== MEMORIES ABOUT: {} ===", topic.trim())
}

pub fn profile_header(name: &str) -> String {
    format!("=== PROFILE: @{} ===", display_name(name))
}

/// Approximates how many model tokens a piece of text costs.
pub trait TokenEstimator: Send + Sync {
    fn estimate(&self, text: &str) -> i64;
}

/// Fixed characters-per-token heuristic.
#[derive(Debug, Clone, Copy)]
pub struct CharRatioEstimator {
    chars_per_token: usize,
}

impl CharRatioEstimator {
    pub fn new(chars_per_token: usize) -> Self {
        Self {
            chars_per_token: chars_per_token.max(1),
        }
    }
}

impl Default for CharRatioEstimator {
    fn default() -> Self {
        Self::new(4)
    }
}

impl TokenEstimator for CharRatioEstimator {
    fn estimate(&self, text: &str) -> i64 {
        let tokens = text.chars().count() / self.chars_per_token;
        i64::try_from(tokens).unwrap_or(i64::MAX)
    }
}

/// Inputs for one context assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextRequest {
    pub agent: String,
    pub current_topic: String,
    pub participants: Vec<String>,
    pub max_tokens: i64,
    /// Last calendar day of the recent-activity window
    pub as_of: NaiveDate,
}

impl ContextRequest {
    pub fn new(agent: impl Into<String>, max_tokens: i64) -> Self {
        Self {
            agent: agent.into(),
            current_topic: String::new(),
            participants: Vec::new(),
            max_tokens,
            as_of: Utc::now().date_naive(),
        }
    }

    #[must_use]
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.current_topic = topic.into();
        self
    }

    #[must_use]
    pub fn with_participants(mut self, participants: Vec<String>) -> Self {
        self.participants = participants;
        self
    }

    #[must_use]
    pub fn as_of(mut self, date: NaiveDate) -> Self {
        self.as_of = date;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    CoreMemory,
    RecentActivity,
    TopicFacts,
    Profile,
}

/// One headed block of the assembled context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextSection {
    pub kind: SectionKind,
    pub header: String,
    pub body: String,
    /// Estimated cost of the rendered section
    pub tokens: i64,
}

impl ContextSection {
    pub fn render(&self) -> String {
        format!("{}\n{}", self.header, self.body)
    }
}

/// Assembled context plus its budget accounting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextWindow {
    pub sections: Vec<ContextSection>,
    /// Budget left after the last included stage; may be negative
    pub remaining_budget: i64,
}

impl ContextWindow {
    /// The context blob handed to the model.
    pub fn text(&self) -> String {
        self.sections
            .iter()
            .map(ContextSection::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn section(&self, kind: SectionKind) -> Option<&ContextSection> {
        self.sections.iter().find(|section| section.kind == kind)
    }

    pub fn total_tokens(&self) -> i64 {
        self.sections.iter().map(|section| section.tokens).sum()
    }
}

/// Reads every memory source for one agent and composes the context.
pub struct ContextAssembler<'a> {
    curated: &'a CuratedMemoryStore,
    logs: &'a DailyLogStore,
    facts: &'a FactStore,
    entities: &'a EntityStore,
    estimator: &'a dyn TokenEstimator,
    config: &'a MemoryConfig,
}

impl<'a> ContextAssembler<'a> {
    pub fn new(
        curated: &'a CuratedMemoryStore,
        logs: &'a DailyLogStore,
        facts: &'a FactStore,
        entities: &'a EntityStore,
        estimator: &'a dyn TokenEstimator,
        config: &'a MemoryConfig,
    ) -> Self {
        Self {
            curated,
            logs,
            facts,
            entities,
            estimator,
            config,
        }
    }

    /// Build the context for `request`.
    ///
    /// Missing sources are omitted; only storage failures and an invalid
    /// agent name are errors. Core memory goes in exactly as stored.
    pub fn assemble(&self, request: &ContextRequest) -> MemoryResult<ContextWindow> {
        let agent = validate_agent(&request.agent)?;
        let mut window = ContextWindow {
            sections: Vec::new(),
            remaining_budget: request.max_tokens,
        };

        let core = self.curated.load(&MemoryScope::agent(agent))?;
        if !core.trim().is_empty() {
            self.push(
                &mut window,
                SectionKind::CoreMemory,
                CORE_MEMORY_HEADER.to_string(),
                core,
            );
        }

        if window.remaining_budget > 0 {
            let logs =
                self.logs
                    .read_recent_as_of(agent, request.as_of, self.config.recent_log_days)?;
            if !logs.is_empty() {
                self.push(
                    &mut window,
                    SectionKind::RecentActivity,
                    RECENT_ACTIVITY_HEADER.to_string(),
                    render_logs(&logs),
                );
            }
        }

        let topic = request.current_topic.trim();
        if !topic.is_empty() && window.remaining_budget > 0 {
            let options = RecallOptions::new(self.config.recall_limit)
                .include_shared(self.config.include_shared_facts);
            let hits = recall(self.facts, agent, topic, &options)?;
            if !hits.is_empty() {
                let body = hits
                    .iter()
                    .map(|scored| fact_bullet(&scored.fact))
                    .collect::<Vec<_>>()
                    .join("\n");
                self.push(&mut window, SectionKind::TopicFacts, topic_header(topic), body);
            }
        }

        let own_slug = entity_slug(agent);
        for participant in &request.participants {
            if window.remaining_budget <= 0 {
                break;
            }

            let slug = entity_slug(participant);
            if slug.is_empty() || slug == own_slug {
                continue;
            }

            if let Some(body) = self.profile_body(agent, participant)? {
                self.push(
                    &mut window,
                    SectionKind::Profile,
                    profile_header(participant),
                    body,
                );
            }
        }

        tracing::debug!(
            agent = %agent,
            sections = window.sections.len(),
            remaining = window.remaining_budget,
            "Assembled context"
        );

        Ok(window)
    }

    fn profile_body(&self, agent: &str, participant: &str) -> MemoryResult<Option<String>> {
        let blob = self
            .entities
            .get(agent, participant)?
            .map(|entity| entity.content.trim_end().to_string())
            .unwrap_or_default();
        let facts =
            self.facts
                .list_about_entity(agent, participant, self.config.entity_fact_limit)?;

        let mut parts = Vec::new();
        if !blob.trim().is_empty() {
            parts.push(blob);
        }
        if !facts.is_empty() {
            parts.push(facts.iter().map(fact_bullet).collect::<Vec<_>>().join("\n"));
        }

        if parts.is_empty() {
            Ok(None)
        } else {
            Ok(Some(parts.join("\n")))
        }
    }

    fn push(&self, window: &mut ContextWindow, kind: SectionKind, header: String, body: String) {
        let mut section = ContextSection {
            kind,
            header,
            body,
            tokens: 0,
        };
        section.tokens = self.estimator.estimate(&section.render());
        window.remaining_budget -= section.tokens;
        window.sections.push(section);
    }
}

/// `- [category] text (YYYY-MM-DD)`
fn fact_bullet(fact: &Fact) -> String {
    format!(
        "- [{}] {} ({})",
        fact.category,
        fact.content.trim(),
        fact.created_date()
    )
}

fn display_name(name: &str) -> &str {
    name.trim().trim_start_matches('@')
}
