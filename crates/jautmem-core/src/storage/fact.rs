//! Typed fact store wrapper.
//!
//! Wraps the byte-level fact tables and the derived full-text index from
//! jautmem-storage. The fact tables are the source of truth; the index is
//! only ever changed by upsert-on-retain or a full rebuild from the tables.

use jautmem_storage::{IndexableFact, Storage, time_utils};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::MemoryResult;
use crate::models::{Fact, FactCategory, entity_tag};

/// A fact with its relevance score for a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredFact {
    pub fact: Fact,
    pub score: f32,
}

/// Typed fact storage with synchronous index maintenance.
pub struct FactStore {
    storage: Arc<Storage>,
    /// Retains hold it shared; a rebuild holds it exclusively so no retain
    /// can land between the rebuild's snapshot and its commit.
    rebuild_gate: RwLock<()>,
}

impl FactStore {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            storage,
            rebuild_gate: RwLock::new(()),
        }
    }

    /// Persist a fact and upsert it into the search index.
    ///
    /// When this returns, searches observe the fact.
    pub fn retain(&self, fact: &Fact) -> MemoryResult<()> {
        let _gate = self.rebuild_gate.read();

        let bytes = serde_json::to_vec(fact)?;
        self.storage.facts.put_fact_raw(
            &fact.id,
            &fact.agent,
            fact.category.as_str(),
            &fact.related_entities,
            &bytes,
        )?;
        self.storage.index.index_fact(&indexable(fact))?;

        tracing::debug!(
            agent = %fact.agent,
            fact_id = %fact.id,
            category = %fact.category,
            "Retained fact"
        );
        Ok(())
    }

    /// Get a fact by ID
    pub fn get(&self, fact_id: &str) -> MemoryResult<Option<Fact>> {
        match self.storage.facts.get_fact_raw(fact_id)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// All facts in a partition, in the order they were retained
    pub fn list_by_agent(&self, agent: &str) -> MemoryResult<Vec<Fact>> {
        decode(self.storage.facts.list_by_agent_raw(agent)?)
    }

    /// A partition's facts in one category, in the order they were retained
    pub fn list_by_category(&self, agent: &str, category: &FactCategory) -> MemoryResult<Vec<Fact>> {
        decode(
            self.storage
                .facts
                .list_by_category_raw(agent, category.as_str())?,
        )
    }

    /// Facts tagged with an entity, newest first
    pub fn list_about_entity(
        &self,
        agent: &str,
        entity: &str,
        limit: usize,
    ) -> MemoryResult<Vec<Fact>> {
        let Some(tag) = entity_tag(entity) else {
            return Ok(Vec::new());
        };
        let facts = decode(self.storage.facts.list_by_entity_raw(agent, &tag)?)?;
        Ok(newest_first(facts, limit))
    }

    /// Facts retained in the last `days` days, newest first
    pub fn list_recent(&self, agent: &str, days: u32, limit: usize) -> MemoryResult<Vec<Fact>> {
        let cutoff = time_utils::days_ago_ms(days);
        let facts = self
            .list_by_agent(agent)?
            .into_iter()
            .filter(|fact| fact.created_at >= cutoff)
            .collect();
        Ok(newest_first(facts, limit))
    }

    pub fn count(&self, agent: &str) -> MemoryResult<u32> {
        Ok(self.storage.facts.count_by_agent(agent)?)
    }

    /// Split text into the terms the index matches on.
    pub fn tokenize(&self, text: &str) -> MemoryResult<Vec<String>> {
        Ok(self.storage.index.tokenize(text)?)
    }

    /// Rank facts in `partitions` against `query`, best first.
    pub fn search(
        &self,
        partitions: &[&str],
        query: &str,
        limit: usize,
    ) -> MemoryResult<Vec<ScoredFact>> {
        let hits = self.storage.index.search(query, partitions, limit)?;

        let mut results = Vec::with_capacity(hits.len());
        for hit in hits {
            match self.get(&hit.fact_id)? {
                Some(fact) => results.push(ScoredFact {
                    fact,
                    score: hit.score,
                }),
                None => {
                    tracing::warn!(
                        fact_id = %hit.fact_id,
                        "Indexed fact missing from fact store; rebuild the index"
                    );
                }
            }
        }

        Ok(results)
    }

    /// Drop the search index and repopulate it from every stored fact.
    ///
    /// Safe to run at any time; concurrent readers see the old or new index.
    pub fn rebuild_all(&self) -> MemoryResult<usize> {
        let _gate = self.rebuild_gate.write();

        let facts = decode(self.storage.facts.list_all_raw()?)?;
        let count = self
            .storage
            .index
            .rebuild(facts.iter().map(indexable))?;

        tracing::info!(facts = count, "Rebuilt fact search index");
        Ok(count)
    }
}

fn indexable(fact: &Fact) -> IndexableFact {
    IndexableFact {
        id: fact.id.clone(),
        agent: fact.agent.clone(),
        category: fact.category.as_str().to_string(),
        content: fact.content.clone(),
        created_at: fact.created_at,
    }
}

fn decode(rows: Vec<(String, Vec<u8>)>) -> MemoryResult<Vec<Fact>> {
    let mut facts = Vec::with_capacity(rows.len());
    for (_, bytes) in rows {
        facts.push(serde_json::from_slice(&bytes)?);
    }
    Ok(facts)
}

/// Reverse insertion order, then order by timestamp; ties keep the later insert first.
fn newest_first(mut facts: Vec<Fact>, limit: usize) -> Vec<Fact> {
    facts.reverse();
    facts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    facts.truncate(limit);
    facts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> FactStore {
        FactStore::new(Arc::new(Storage::in_memory().unwrap()))
    }

    fn fact(agent: &str, category: FactCategory, content: &str) -> Fact {
        Fact::new(agent.to_string(), category, content.to_string())
    }

    #[test]
    fn test_retain_is_immediately_searchable() {
        let store = store();
        let retained = fact("Cynix", FactCategory::Opinion, "Coffee stains are art")
            .with_entities(&["coffee_stains".to_string()]);
        store.retain(&retained).unwrap();

        let results = store.search(&["Cynix"], "coffee", 5).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].fact, retained);
    }

    #[test]
    fn test_list_orders_and_filters() {
        let store = store();
        let first = fact("Cynix", FactCategory::World, "one");
        let second = fact("Cynix", FactCategory::Opinion, "two");
        let third = fact("Cynix", FactCategory::World, "three");
        for f in [&first, &second, &third] {
            store.retain(f).unwrap();
        }
        store.retain(&fact("Nova", FactCategory::World, "other")).unwrap();

        let all: Vec<_> = store
            .list_by_agent("Cynix")
            .unwrap()
            .into_iter()
            .map(|f| f.content)
            .collect();
        assert_eq!(all, ["one", "two", "three"]);

        let world: Vec<_> = store
            .list_by_category("Cynix", &FactCategory::World)
            .unwrap()
            .into_iter()
            .map(|f| f.content)
            .collect();
        assert_eq!(world, ["one", "three"]);
        assert_eq!(store.count("Cynix").unwrap(), 3);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let store = store();
        store.retain(&fact("Cynix", FactCategory::World, "same")).unwrap();
        store.retain(&fact("Cynix", FactCategory::World, "same")).unwrap();
        assert_eq!(store.list_by_agent("Cynix").unwrap().len(), 2);
    }

    #[test]
    fn test_list_about_entity_newest_first() {
        let store = store();
        let tags = vec!["Nova".to_string()];
        store
            .retain(&fact("Cynix", FactCategory::Interaction, "older").with_entities(&tags).with_created_at(100))
            .unwrap();
        store
            .retain(&fact("Cynix", FactCategory::Interaction, "newer").with_entities(&tags).with_created_at(200))
            .unwrap();
        store
            .retain(&fact("Cynix", FactCategory::World, "untagged"))
            .unwrap();

        let about: Vec<_> = store
            .list_about_entity("Cynix", "@nova", 10)
            .unwrap()
            .into_iter()
            .map(|f| f.content)
            .collect();
        assert_eq!(about, ["newer", "older"]);
        assert_eq!(store.list_about_entity("Cynix", "Nova", 1).unwrap().len(), 1);
        assert!(store.list_about_entity("Cynix", "??", 10).unwrap().is_empty());
    }

    #[test]
    fn test_list_recent_excludes_old_facts() {
        let store = store();
        store
            .retain(&fact("Cynix", FactCategory::World, "ancient").with_created_at(1_000))
            .unwrap();
        store.retain(&fact("Cynix", FactCategory::World, "fresh")).unwrap();

        let recent = store.list_recent("Cynix", 7, 10).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].content, "fresh");
    }

    #[test]
    fn test_rebuild_preserves_search_results() {
        let store = store();
        for (i, text) in ["tea time", "tea and coffee", "coffee coffee", "nothing"].iter().enumerate() {
            store
                .retain(&fact("Cynix", FactCategory::World, text).with_created_at(i as i64))
                .unwrap();
        }

        let before = store.search(&["Cynix"], "coffee tea", 10).unwrap();
        assert_eq!(store.rebuild_all().unwrap(), 4);
        let after = store.search(&["Cynix"], "coffee tea", 10).unwrap();

        let ids = |r: &[ScoredFact]| r.iter().map(|s| s.fact.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&before), ids(&after));
        assert_eq!(after.len(), 3);
    }
}
