use jautmem_storage::time_utils;

use crate::error::MemoryResult;
use crate::models::{FactCategory, SHARED_PARTITION};
use crate::storage::{FactStore, ScoredFact};

/// Filters for a recall query.
#[derive(Debug, Clone, PartialEq)]
pub struct RecallOptions {
    pub limit: usize,
    pub category: Option<FactCategory>,
    /// Only facts retained within this many days
    pub since_days: Option<u32>,
    /// Also search the platform-wide shared partition
    pub include_shared: bool,
}

impl RecallOptions {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            category: None,
            since_days: None,
            include_shared: false,
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: FactCategory) -> Self {
        self.category = Some(category);
        self
    }

    #[must_use]
    pub fn since_days(mut self, days: u32) -> Self {
        self.since_days = Some(days);
        self
    }

    #[must_use]
    pub fn include_shared(mut self, include: bool) -> Self {
        self.include_shared = include;
        self
    }
}

impl Default for RecallOptions {
    fn default() -> Self {
        Self::new(5)
    }
}

/// Rank an agent's facts against free-text `query`.
///
/// An empty query or no match yields an empty list.
pub fn recall(
    store: &FactStore,
    agent: &str,
    query: &str,
    options: &RecallOptions,
) -> MemoryResult<Vec<ScoredFact>> {
    let mut partitions = vec![agent];
    if options.include_shared {
        partitions.push(SHARED_PARTITION);
    }

    let filtered = options.category.is_some() || options.since_days.is_some();
    let fetch = if filtered { usize::MAX } else { options.limit };
    let mut results = store.search(&partitions, query, fetch)?;

    if let Some(category) = &options.category {
        results.retain(|scored| &scored.fact.category == category);
    }
    if let Some(days) = options.since_days {
        let cutoff = time_utils::days_ago_ms(days);
        results.retain(|scored| scored.fact.created_at >= cutoff);
    }
    results.truncate(options.limit);

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Fact;
    use jautmem_storage::Storage;
    use std::sync::Arc;

    fn seeded() -> FactStore {
        let store = FactStore::new(Arc::new(Storage::in_memory().unwrap()));
        let facts = [
            ("Cynix", FactCategory::Opinion, "coffee is overrated", 3),
            ("Cynix", FactCategory::World, "coffee prices rose", 2),
            ("Cynix", FactCategory::World, "coffee was first brewed long ago", 1_000),
            (SHARED_PARTITION, FactCategory::World, "coffee day is on friday", 4),
        ];
        for (agent, category, text, days_offset) in facts {
            let created = if days_offset >= 1_000 {
                1_000
            } else {
                time_utils::now_ms() - days_offset
            };
            store
                .retain(&Fact::new(agent.to_string(), category, text.to_string()).with_created_at(created))
                .unwrap();
        }
        store
    }

    #[test]
    fn test_recall_limits() {
        let store = seeded();
        let results = recall(&store, "Cynix", "coffee", &RecallOptions::new(2)).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_recall_category_filter() {
        let store = seeded();
        let options = RecallOptions::new(5).with_category(FactCategory::Opinion);
        let results = recall(&store, "Cynix", "coffee", &options).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].fact.content, "coffee is overrated");
    }

    #[test]
    fn test_recall_since_days() {
        let store = seeded();
        let options = RecallOptions::new(5).since_days(1);
        let results = recall(&store, "Cynix", "coffee", &options).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.fact.content != "coffee was first brewed long ago"));
    }

    #[test]
    fn test_recall_shared_partition_opt_in() {
        let store = seeded();
        let own = recall(&store, "Cynix", "friday", &RecallOptions::new(5)).unwrap();
        assert!(own.is_empty());

        let with_shared = recall(
            &store,
            "Cynix",
            "friday",
            &RecallOptions::new(5).include_shared(true),
        )
        .unwrap();
        assert_eq!(with_shared.len(), 1);
        assert_eq!(with_shared[0].fact.agent, SHARED_PARTITION);
    }

    #[test]
    fn test_recall_empty_query() {
        let store = seeded();
        assert!(recall(&store, "Cynix", "", &RecallOptions::new(5)).unwrap().is_empty());
        assert!(recall(&store, "Cynix", "zebra", &RecallOptions::new(5)).unwrap().is_empty());
    }
}
