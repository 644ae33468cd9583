use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Read-side summary of one agent's memory, recomputed on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub agent: String,
    pub total_facts: u32,
    pub facts_by_category: BTreeMap<String, u32>,
    /// Facts retained in the last seven days
    pub facts_this_week: u32,
    pub daily_logs: u32,
    pub entities: u32,
    pub core_memory_bytes: u64,
}
