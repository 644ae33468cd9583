//! JautMem Storage - Low-level persistence for agent memory
//!
//! This crate provides the durable layer underneath the typed memory core.
//! Fact records live in a redb embedded database and a tantivy full-text
//! index is derived from them. Both expose byte/string-level APIs so that the
//! core crate owns the domain types.
//!
//! # Tables
//!
//! - `facts` - fact_id -> serialized fact
//! - `fact_order` - sequence -> fact_id (global insertion order)
//! - `fact_agent_index` - agent:sequence -> fact_id
//! - `fact_category_index` - agent:category:sequence -> fact_id
//! - `fact_entity_index` - agent:entity:sequence -> fact_id
//! - `fact_sequence` - next sequence number
//!
//! The search index under `.memory/index/` holds nothing that cannot be
//! rebuilt from the `facts` table.

pub mod fact;
pub mod fact_index;
pub mod paths;
pub mod time_utils;

use anyhow::{Context, Result};
use redb::Database;
use std::path::Path;
use std::sync::Arc;

pub use fact::FactStorage;
pub use fact_index::{FactIndex, IndexableFact, SearchHit};

const FACTS_DB_FILE: &str = "facts.redb";
const INDEX_DIR: &str = "index";

/// Central storage manager for the fact database and its search index.
pub struct Storage {
    db: Arc<Database>,
    pub facts: FactStorage,
    pub index: FactIndex,
}

impl Storage {
    /// Open (or create) storage under the given `.memory` directory.
    pub fn open(memory_dir: &Path, writer_heap_bytes: usize) -> Result<Self> {
        std::fs::create_dir_all(memory_dir)
            .with_context(|| format!("failed to create memory dir: {}", memory_dir.display()))?;

        let db_path = memory_dir.join(FACTS_DB_FILE);
        let db = Arc::new(
            Database::create(&db_path)
                .with_context(|| format!("failed to open fact database: {}", db_path.display()))?,
        );
        let facts = FactStorage::new(db.clone())?;
        let index = FactIndex::open(&memory_dir.join(INDEX_DIR), writer_heap_bytes)?;

        tracing::info!(path = %memory_dir.display(), "Opened memory storage");

        Ok(Self { db, facts, index })
    }

    /// Storage that lives entirely in memory, for tests and ephemeral agents.
    pub fn in_memory() -> Result<Self> {
        let db = Arc::new(
            Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?,
        );
        let facts = FactStorage::new(db.clone())?;
        let index = FactIndex::in_memory()?;
        Ok(Self { db, facts, index })
    }

    /// Get a reference to the underlying database
    pub fn get_db(&self) -> Arc<Database> {
        self.db.clone()
    }
}
