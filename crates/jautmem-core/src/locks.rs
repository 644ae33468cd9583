//! Per-agent write serialization.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// One mutex per agent, created on first use.
///
/// Writes for the same agent run one at a time; different agents never
/// contend. The guard is released on every exit path, including `?` and
/// panics inside the closure.
#[derive(Debug, Default, Clone)]
pub struct AgentLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl AgentLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding `agent`'s lock.
    pub fn with_lock<T>(&self, agent: &str, f: impl FnOnce() -> T) -> T {
        let lock = self.lock_for(agent);
        let _guard = lock.lock();
        f()
    }

    fn lock_for(&self, agent: &str) -> Arc<Mutex<()>> {
        // Clone the Arc out so the map shard is not held while we wait.
        self.locks
            .entry(agent.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Number of agents that have taken a lock so far
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
