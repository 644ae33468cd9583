//! `AgentMemory`: the facade collaborators call.
//!
//! Every write for an agent runs under that agent's lock, so a retain has
//! reached both the fact tables and the search index before any other write
//! for the same agent starts. Reads take no agent lock.

use chrono::{DateTime, Utc};
use jautmem_storage::{Storage, paths, time_utils};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::MemoryConfig;
use crate::error::{MemoryError, MemoryResult};
use crate::locks::AgentLocks;
use crate::memory::{
    CharRatioEstimator, ContextAssembler, ContextRequest, ContextWindow, RecallOptions,
    TokenEstimator, recall,
};
use crate::models::{
    DailyLog, Entity, EntityUpdateMode, Fact, FactCategory, InteractionRecord, MemoryStats,
    SHARED_PARTITION, render_logs, validate_agent,
};
use crate::shared::SharedMemory;
use crate::storage::{
    CuratedMemoryStore, DailyLogStore, EntityStore, FactStore, MemoryScope, ScoredFact,
    curated::core_memory_template,
};

const RETAINED_FACTS_SECTION: &str = "Retained Facts";
const ENTITY_FACT_CONFIDENCE: f64 = 0.9;
const INTERACTION_FACT_CONFIDENCE: f64 = 0.8;
const CORE_FACT_CONFIDENCE: f64 = 1.0;
const STATS_WEEK_DAYS: u32 = 7;

/// Long-term memory for every agent under one root directory.
pub struct AgentMemory {
    root: PathBuf,
    config: MemoryConfig,
    facts: FactStore,
    logs: DailyLogStore,
    curated: CuratedMemoryStore,
    entities: EntityStore,
    shared: SharedMemory,
    locks: AgentLocks,
    estimator: Box<dyn TokenEstimator>,
}

impl AgentMemory {
    /// Open the memory root, reading `jautmem.toml` if present.
    pub fn open(root: impl Into<PathBuf>) -> MemoryResult<Self> {
        let root = root.into();
        let config = MemoryConfig::load(&root)?;
        Self::open_with_config(root, config)
    }

    pub fn open_with_config(root: impl Into<PathBuf>, config: MemoryConfig) -> MemoryResult<Self> {
        let root = root.into();
        config.validate()?;
        let storage = Storage::open(&paths::memory_dir(&root), config.index_writer_heap_bytes)?;
        Ok(Self::with_storage(root, config, Arc::new(storage)))
    }

    /// Build over an already opened fact storage, e.g. `Storage::in_memory()`.
    pub fn with_storage(root: impl Into<PathBuf>, config: MemoryConfig, storage: Arc<Storage>) -> Self {
        let root = root.into();
        let estimator = Box::new(CharRatioEstimator::new(config.chars_per_token));
        Self {
            facts: FactStore::new(storage),
            logs: DailyLogStore::new(&root),
            curated: CuratedMemoryStore::new(&root),
            entities: EntityStore::new(&root),
            shared: SharedMemory::new(&root),
            locks: AgentLocks::new(),
            estimator,
            config,
            root,
        }
    }

    /// Replace the token estimator used for context budgets.
    #[must_use]
    pub fn with_estimator(mut self, estimator: impl TokenEstimator + 'static) -> Self {
        self.estimator = Box::new(estimator);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Shared, platform-wide memory
    pub fn shared(&self) -> &SharedMemory {
        &self.shared
    }

    /// Create an agent's directories and, if configured, seed core memory.
    ///
    /// Idempotent. Returns whether core memory was seeded by this call.
    pub fn init_agent(&self, agent: &str) -> MemoryResult<bool> {
        let agent = validate_agent(agent)?;
        self.locks.with_lock(agent, || {
            for dir in [self.logs.logs_dir(agent)?, self.entities.entities_dir(agent)?] {
                std::fs::create_dir_all(&dir).map_err(MemoryError::io(&dir))?;
            }

            let seeded = self.config.seed_core_memory
                && self
                    .curated
                    .seed(&MemoryScope::agent(agent), &core_memory_template(agent))?;
            self.shared.init()?;

            tracing::info!(agent = %agent, seeded, "Initialized agent memory");
            Ok(seeded)
        })
    }

    // ------------------------------------------------------------------
    // Daily logs
    // ------------------------------------------------------------------

    /// Append a raw entry to today's log. Returns the day file.
    pub fn write_daily_log(&self, agent: &str, category: &str, text: &str) -> MemoryResult<PathBuf> {
        self.write_daily_log_at(agent, Utc::now(), category, text)
    }

    pub fn write_daily_log_at(
        &self,
        agent: &str,
        at: DateTime<Utc>,
        category: &str,
        text: &str,
    ) -> MemoryResult<PathBuf> {
        let agent = validate_agent(agent)?;
        self.locks
            .with_lock(agent, || self.logs.append(agent, at, category, text))
    }

    /// The last `n_days` of logs rendered under `### YYYY-MM-DD` headings.
    pub fn read_recent_logs(&self, agent: &str, n_days: u32) -> MemoryResult<String> {
        Ok(render_logs(&self.daily_logs(agent, n_days)?))
    }

    /// The last `n_days` of logs, oldest first.
    pub fn daily_logs(&self, agent: &str, n_days: u32) -> MemoryResult<Vec<DailyLog>> {
        let agent = validate_agent(agent)?;
        self.logs.read_recent(agent, n_days)
    }

    // ------------------------------------------------------------------
    // Facts
    // ------------------------------------------------------------------

    /// Retain a fact for `agent` and note it in today's log.
    ///
    /// Searchable as soon as this returns.
    pub fn retain_fact(
        &self,
        agent: &str,
        category: FactCategory,
        content: &str,
        confidence: f64,
        entities: &[String],
    ) -> MemoryResult<Fact> {
        let agent = validate_agent(agent)?;
        self.locks.with_lock(agent, || {
            self.retain_locked(agent, category, content, confidence, entities)
        })
    }

    /// Retain a platform-wide fact into the shared partition.
    pub fn retain_shared_fact(
        &self,
        category: FactCategory,
        content: &str,
        confidence: f64,
        entities: &[String],
    ) -> MemoryResult<Fact> {
        self.locks.with_lock(SHARED_PARTITION, || {
            let fact = Fact::new(SHARED_PARTITION.to_string(), category, content.trim().to_string())
                .with_confidence(confidence)
                .with_entities(entities);
            self.facts.retain(&fact)?;
            Ok(fact)
        })
    }

    pub fn get_fact(&self, fact_id: &str) -> MemoryResult<Option<Fact>> {
        self.facts.get(fact_id)
    }

    /// All of an agent's facts, oldest first
    pub fn list_facts(&self, agent: &str) -> MemoryResult<Vec<Fact>> {
        let agent = validate_agent(agent)?;
        self.facts.list_by_agent(agent)
    }

    pub fn list_facts_by_category(
        &self,
        agent: &str,
        category: &FactCategory,
    ) -> MemoryResult<Vec<Fact>> {
        let agent = validate_agent(agent)?;
        self.facts.list_by_category(agent, category)
    }

    /// Search with the configured limit and shared-partition setting.
    pub fn recall(&self, agent: &str, query: &str) -> MemoryResult<Vec<ScoredFact>> {
        let options = RecallOptions::new(self.config.recall_limit)
            .include_shared(self.config.include_shared_facts);
        self.recall_with(agent, query, &options)
    }

    pub fn recall_with(
        &self,
        agent: &str,
        query: &str,
        options: &RecallOptions,
    ) -> MemoryResult<Vec<ScoredFact>> {
        let agent = validate_agent(agent)?;
        recall(&self.facts, agent, query, options)
    }

    /// Facts tagged with an entity, newest first
    pub fn recall_about_entity(
        &self,
        agent: &str,
        entity: &str,
        limit: usize,
    ) -> MemoryResult<Vec<Fact>> {
        let agent = validate_agent(agent)?;
        self.facts.list_about_entity(agent, entity, limit)
    }

    /// Facts retained in the last `days` days, newest first
    pub fn recall_recent(&self, agent: &str, days: u32, limit: usize) -> MemoryResult<Vec<Fact>> {
        let agent = validate_agent(agent)?;
        self.facts.list_recent(agent, days, limit)
    }

    /// Rebuild the search index from the fact tables.
    pub fn rebuild_index(&self) -> MemoryResult<usize> {
        self.facts.rebuild_all()
    }

    // ------------------------------------------------------------------
    // Core memory
    // ------------------------------------------------------------------

    pub fn core_memory(&self, agent: &str) -> MemoryResult<String> {
        self.curated.load(&MemoryScope::agent(validate_agent(agent)?))
    }

    /// Replace an agent's core memory.
    pub fn update_core_memory(&self, agent: &str, text: &str) -> MemoryResult<()> {
        let agent = validate_agent(agent)?;
        self.locks
            .with_lock(agent, || self.curated.overwrite(&MemoryScope::agent(agent), text))
    }

    /// Add a dated line under `## section` and retain it as a core fact.
    pub fn append_core_memory(&self, agent: &str, section: &str, content: &str) -> MemoryResult<Fact> {
        let agent = validate_agent(agent)?;
        self.locks.with_lock(agent, || {
            let today = Utc::now().format("%Y-%m-%d").to_string();
            self.curated
                .append_to_section(&MemoryScope::agent(agent), section, content, &today)?;
            self.retain_locked(agent, FactCategory::Core, content, CORE_FACT_CONFIDENCE, &[])
        })
    }

    // ------------------------------------------------------------------
    // Entities
    // ------------------------------------------------------------------

    pub fn get_entity(&self, agent: &str, name: &str) -> MemoryResult<Option<Entity>> {
        self.entities.get(validate_agent(agent)?, name)
    }

    pub fn get_or_create_entity(&self, agent: &str, name: &str) -> MemoryResult<Entity> {
        let agent = validate_agent(agent)?;
        self.locks
            .with_lock(agent, || self.entities.get_or_create(agent, name))
    }

    /// Update what `agent` knows about `name`.
    ///
    /// Appended observations are also retained as entity facts so they show
    /// up in recall.
    pub fn update_entity(
        &self,
        agent: &str,
        name: &str,
        text: &str,
        mode: EntityUpdateMode,
    ) -> MemoryResult<Entity> {
        let agent = validate_agent(agent)?;
        self.locks.with_lock(agent, || {
            let entity = self.entities.update(agent, name, text, mode, Utc::now())?;
            if mode == EntityUpdateMode::Append {
                self.retain_locked(
                    agent,
                    FactCategory::Entity,
                    text,
                    ENTITY_FACT_CONFIDENCE,
                    &[name.to_string()],
                )?;
            }
            Ok(entity)
        })
    }

    /// Fold an interaction into the other entity, the daily log and the facts.
    pub fn remember_interaction(
        &self,
        agent: &str,
        interaction: &InteractionRecord,
    ) -> MemoryResult<Entity> {
        let agent = validate_agent(agent)?;
        self.locks.with_lock(agent, || {
            let entity = self.entities.update(
                agent,
                &interaction.other,
                &interaction.entity_line(),
                EntityUpdateMode::Append,
                interaction.timestamp,
            )?;

            self.logs.append(
                agent,
                interaction.timestamp,
                &format!("Interaction with {}", interaction.other.trim()),
                &interaction_log_entry(interaction),
            )?;

            let tags = [interaction.other.clone()];
            for takeaway in interaction.takeaways.iter().filter(|t| !t.trim().is_empty()) {
                self.retain_locked(
                    agent,
                    FactCategory::Interaction,
                    takeaway,
                    INTERACTION_FACT_CONFIDENCE,
                    &tags,
                )?;
            }

            Ok(entity)
        })
    }

    // ------------------------------------------------------------------
    // Context and stats
    // ------------------------------------------------------------------

    /// Token-bounded context blob for a model call.
    pub fn get_context_for_llm(
        &self,
        agent: &str,
        current_topic: &str,
        participants: &[String],
        max_tokens: i64,
    ) -> MemoryResult<String> {
        let request = ContextRequest::new(agent, max_tokens)
            .with_topic(current_topic)
            .with_participants(participants.to_vec());
        Ok(self.assemble_context(&request)?.text())
    }

    /// Context with per-section token accounting.
    pub fn assemble_context(&self, request: &ContextRequest) -> MemoryResult<ContextWindow> {
        ContextAssembler::new(
            &self.curated,
            &self.logs,
            &self.facts,
            &self.entities,
            self.estimator.as_ref(),
            &self.config,
        )
        .assemble(request)
    }

    pub fn stats(&self, agent: &str) -> MemoryResult<MemoryStats> {
        let agent = validate_agent(agent)?;
        let facts = self.facts.list_by_agent(agent)?;
        let week_start = time_utils::days_ago_ms(STATS_WEEK_DAYS);

        let mut facts_by_category: BTreeMap<String, u32> = BTreeMap::new();
        let mut facts_this_week = 0u32;
        for fact in &facts {
            *facts_by_category
                .entry(fact.category.as_str().to_string())
                .or_default() += 1;
            if fact.created_at >= week_start {
                facts_this_week += 1;
            }
        }

        Ok(MemoryStats {
            agent: agent.to_string(),
            total_facts: u32::try_from(facts.len()).unwrap_or(u32::MAX),
            facts_by_category,
            facts_this_week,
            daily_logs: self.logs.count_logs(agent)?,
            entities: self.entities.count(agent)?,
            core_memory_bytes: self.curated.size_bytes(&MemoryScope::agent(agent))?,
        })
    }

    /// Retain and log a fact; the caller holds `agent`'s lock.
    ///
    /// The fact is committed before the log entry is written, so a failed
    /// log write is reported but does not fail the retain.
    fn retain_locked(
        &self,
        agent: &str,
        category: FactCategory,
        content: &str,
        confidence: f64,
        entities: &[String],
    ) -> MemoryResult<Fact> {
        let now = Utc::now();
        let fact = Fact::new(agent.to_string(), category, content.trim().to_string())
            .with_confidence(confidence)
            .with_entities(entities)
            .with_created_at(now.timestamp_millis())
            .with_source(format!("{}.md", now.format("%Y-%m-%d")));

        self.facts.retain(&fact)?;
        if let Err(err) =
            self.logs
                .append(agent, now, RETAINED_FACTS_SECTION, &retained_log_entry(&fact))
        {
            tracing::warn!(
                agent = %agent,
                fact_id = %fact.id,
                error = %err,
                "Failed to write retained fact to daily log"
            );
        }
        Ok(fact)
    }
}

fn retained_log_entry(fact: &Fact) -> String {
    let entities = if fact.related_entities.is_empty() {
        "none".to_string()
    } else {
        fact.related_entities.join(", ")
    };
    format!(
        "**[{}]** {}\n_Entities: {} | Confidence: {:.2}_",
        fact.category.as_str().to_uppercase(),
        fact.content,
        entities,
        fact.confidence
    )
}

fn interaction_log_entry(interaction: &InteractionRecord) -> String {
    let mut entry = format!(
        "**{}:** {}",
        interaction.kind.trim(),
        interaction.summary.as_deref().unwrap_or("").trim()
    );
    if !interaction.takeaways.is_empty() {
        entry.push_str("\n\n**Takeaways:**");
        for takeaway in &interaction.takeaways {
            entry.push_str("\n- ");
            entry.push_str(takeaway.trim());
        }
    }
    entry
}
