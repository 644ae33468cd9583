//! Fact storage - byte-level API for structured memory facts.
//!
//! Facts are append-only: there is no update or delete path. Every fact gets
//! a sequence number inside the same write transaction that stores it, so
//! listing by any index key yields insertion order.

use anyhow::Result;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::sync::Arc;

const FACT_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("facts");
/// Global order: sequence -> fact_id
const ORDER_TABLE: TableDefinition<u64, &str> = TableDefinition::new("fact_order");
/// Index: agent:sequence -> fact_id
const AGENT_INDEX_TABLE: TableDefinition<&str, &str> = TableDefinition::new("fact_agent_index");
/// Index: agent:category:sequence -> fact_id
const CATEGORY_INDEX_TABLE: TableDefinition<&str, &str> =
    TableDefinition::new("fact_category_index");
/// Index: agent:entity:sequence -> fact_id
const ENTITY_INDEX_TABLE: TableDefinition<&str, &str> = TableDefinition::new("fact_entity_index");
const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("fact_sequence");

const SEQUENCE_KEY: &str = "next";

/// Low-level fact storage with byte-level API
#[derive(Clone)]
pub struct FactStorage {
    db: Arc<Database>,
}

impl FactStorage {
    /// Create a new FactStorage instance
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(FACT_TABLE)?;
        write_txn.open_table(ORDER_TABLE)?;
        write_txn.open_table(AGENT_INDEX_TABLE)?;
        write_txn.open_table(CATEGORY_INDEX_TABLE)?;
        write_txn.open_table(ENTITY_INDEX_TABLE)?;
        write_txn.open_table(SEQUENCE_TABLE)?;
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Store a raw fact with all of its indexes. Returns the assigned sequence.
    ///
    /// # Arguments
    /// - `fact_id`: Unique identifier for the fact
    /// - `agent`: Partition the fact belongs to
    /// - `category`: Normalized category name
    /// - `entities`: Normalized entity tags
    /// - `data`: Serialized fact
    pub fn put_fact_raw(
        &self,
        fact_id: &str,
        agent: &str,
        category: &str,
        entities: &[String],
        data: &[u8],
    ) -> Result<u64> {
        let write_txn = self.db.begin_write()?;
        let sequence = {
            let mut sequence_table = write_txn.open_table(SEQUENCE_TABLE)?;
            let sequence = sequence_table
                .get(SEQUENCE_KEY)?
                .map(|value| value.value())
                .unwrap_or(0);
            sequence_table.insert(SEQUENCE_KEY, sequence + 1)?;

            let mut fact_table = write_txn.open_table(FACT_TABLE)?;
            fact_table.insert(fact_id, data)?;

            let mut order_table = write_txn.open_table(ORDER_TABLE)?;
            order_table.insert(sequence, fact_id)?;

            let mut agent_index = write_txn.open_table(AGENT_INDEX_TABLE)?;
            let agent_key = format!("{}:{:020}", agent, sequence);
            agent_index.insert(agent_key.as_str(), fact_id)?;

            let mut category_index = write_txn.open_table(CATEGORY_INDEX_TABLE)?;
            let category_key = format!("{}:{}:{:020}", agent, category, sequence);
            category_index.insert(category_key.as_str(), fact_id)?;

            let mut entity_index = write_txn.open_table(ENTITY_INDEX_TABLE)?;
            for entity in entities {
                let entity_key = format!("{}:{}:{:020}", agent, entity, sequence);
                entity_index.insert(entity_key.as_str(), fact_id)?;
            }

            sequence
        };
        write_txn.commit()?;
        Ok(sequence)
    }

    /// Get raw fact data by ID
    pub fn get_fact_raw(&self, fact_id: &str) -> Result<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(FACT_TABLE)?;

        if let Some(value) = table.get(fact_id)? {
            Ok(Some(value.value().to_vec()))
        } else {
            Ok(None)
        }
    }

    /// List all facts for an agent, in insertion order
    pub fn list_by_agent_raw(&self, agent: &str) -> Result<Vec<(String, Vec<u8>)>> {
        self.list_by_prefix(AGENT_INDEX_TABLE, &format!("{}:", agent))
    }

    /// List an agent's facts in one category, in insertion order
    pub fn list_by_category_raw(
        &self,
        agent: &str,
        category: &str,
    ) -> Result<Vec<(String, Vec<u8>)>> {
        self.list_by_prefix(CATEGORY_INDEX_TABLE, &format!("{}:{}:", agent, category))
    }

    /// List an agent's facts tagged with an entity, in insertion order
    pub fn list_by_entity_raw(&self, agent: &str, entity: &str) -> Result<Vec<(String, Vec<u8>)>> {
        self.list_by_prefix(ENTITY_INDEX_TABLE, &format!("{}:{}:", agent, entity))
    }

    /// List every fact across all partitions, in insertion order
    pub fn list_all_raw(&self) -> Result<Vec<(String, Vec<u8>)>> {
        let read_txn = self.db.begin_read()?;
        let order_table = read_txn.open_table(ORDER_TABLE)?;
        let fact_table = read_txn.open_table(FACT_TABLE)?;

        let mut facts = Vec::new();
        for item in order_table.iter()? {
            let (_, value) = item?;
            let fact_id = value.value();
            if let Some(data) = fact_table.get(fact_id)? {
                facts.push((fact_id.to_string(), data.value().to_vec()));
            }
        }

        Ok(facts)
    }

    /// Count facts for an agent
    pub fn count_by_agent(&self, agent: &str) -> Result<u32> {
        let read_txn = self.db.begin_read()?;
        let agent_index = read_txn.open_table(AGENT_INDEX_TABLE)?;

        let (start, end) = prefix_range(&format!("{}:", agent));
        let mut count = 0u32;
        for item in agent_index.range(start.as_str()..end.as_str())? {
            item?;
            count += 1;
        }

        Ok(count)
    }

    fn list_by_prefix(
        &self,
        index: TableDefinition<'static, &'static str, &'static str>,
        prefix: &str,
    ) -> Result<Vec<(String, Vec<u8>)>> {
        let read_txn = self.db.begin_read()?;
        let index_table = read_txn.open_table(index)?;
        let fact_table = read_txn.open_table(FACT_TABLE)?;

        let (start, end) = prefix_range(prefix);
        let mut facts = Vec::new();

        for item in index_table.range(start.as_str()..end.as_str())? {
            let (_, value) = item?;
            let fact_id = value.value();
            if let Some(data) = fact_table.get(fact_id)? {
                facts.push((fact_id.to_string(), data.value().to_vec()));
            }
        }

        Ok(facts)
    }
}

/// Half-open key range covering every key that starts with `prefix`.
///
/// Given "Cynix:", the end bound is "Cynix;" (next byte after ':').
fn prefix_range(prefix: &str) -> (String, String) {
    let mut bytes = prefix.as_bytes().to_vec();
    if let Some(last) = bytes.last_mut() {
        *last = last.saturating_add(1);
    }
    let end = String::from_utf8(bytes).unwrap_or_else(|_| format!("{}\x7F", prefix));
    (prefix.to_string(), end)
}
