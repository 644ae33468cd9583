//! Memory configuration.
//!
//! Loaded from `<root>/jautmem.toml`. Every field is optional in the file;
//! anything left out takes its default.

use crate::error::{MemoryError, MemoryResult};
use jautmem_storage::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// Default configuration constants
const DEFAULT_RECENT_LOG_DAYS: u32 = 2;
const DEFAULT_RECALL_LIMIT: usize = 5;
const DEFAULT_ENTITY_FACT_LIMIT: usize = 3;
const DEFAULT_CHARS_PER_TOKEN: usize = 4;
const DEFAULT_MAX_TOKENS: i64 = 2000;
const DEFAULT_INDEX_WRITER_HEAP_BYTES: usize = 50_000_000;
/// tantivy refuses writer heaps below this size.
const MIN_INDEX_WRITER_HEAP_BYTES: usize = 15_000_000;

/// Memory subsystem configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Calendar days of daily log included as recent activity
    pub recent_log_days: u32,
    /// Facts returned by `recall` and the topic stage of context assembly
    pub recall_limit: usize,
    /// Facts listed under each participant profile
    pub entity_fact_limit: usize,
    /// Characters per token for the budget heuristic
    pub chars_per_token: usize,
    /// Budget used when a caller does not pass one
    pub default_max_tokens: i64,
    pub index_writer_heap_bytes: usize,
    /// Whether recall also searches the shared partition
    pub include_shared_facts: bool,
    /// Whether `init_agent` writes the core memory template
    pub seed_core_memory: bool,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            recent_log_days: DEFAULT_RECENT_LOG_DAYS,
            recall_limit: DEFAULT_RECALL_LIMIT,
            entity_fact_limit: DEFAULT_ENTITY_FACT_LIMIT,
            chars_per_token: DEFAULT_CHARS_PER_TOKEN,
            default_max_tokens: DEFAULT_MAX_TOKENS,
            index_writer_heap_bytes: DEFAULT_INDEX_WRITER_HEAP_BYTES,
            include_shared_facts: false,
            seed_core_memory: true,
        }
    }
}

impl MemoryConfig {
    /// Load `<root>/jautmem.toml`, falling back to defaults when absent.
    pub fn load(root: &Path) -> MemoryResult<Self> {
        Self::load_from_path(&paths::config_path(root))
    }

    /// Load configuration from a specific file.
    pub fn load_from_path(path: &Path) -> MemoryResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(MemoryError::io(path))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| MemoryError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Write this configuration to `<root>/jautmem.toml`.
    pub fn save(&self, root: &Path) -> MemoryResult<()> {
        self.validate()?;
        let path = paths::config_path(root);
        let content = toml::to_string_pretty(self)
            .map_err(|e| MemoryError::Config(e.to_string()))?;
        std::fs::create_dir_all(root).map_err(MemoryError::io(root))?;
        std::fs::write(&path, content).map_err(MemoryError::io(&path))
    }

    /// Validate configuration values
    pub fn validate(&self) -> MemoryResult<()> {
        if self.chars_per_token == 0 {
            return Err(MemoryError::Config(
                "chars_per_token must be at least 1".to_string(),
            ));
        }

        if self.recall_limit == 0 {
            return Err(MemoryError::Config(
                "recall_limit must be at least 1".to_string(),
            ));
        }

        if self.index_writer_heap_bytes < MIN_INDEX_WRITER_HEAP_BYTES {
            return Err(MemoryError::Config(format!(
                "index_writer_heap_bytes must be at least {}",
                MIN_INDEX_WRITER_HEAP_BYTES
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let tmp = tempdir().unwrap();
        let config = MemoryConfig::load(tmp.path()).unwrap();
        assert_eq!(config, MemoryConfig::default());
        assert_eq!(config.recent_log_days, 2);
        assert_eq!(config.chars_per_token, 4);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let tmp = tempdir().unwrap();
        std::fs::write(
            paths::config_path(tmp.path()),
            "recall_limit = 8\ninclude_shared_facts = true\n",
        )
        .unwrap();

        let config = MemoryConfig::load(tmp.path()).unwrap();
        assert_eq!(config.recall_limit, 8);
        assert!(config.include_shared_facts);
        assert_eq!(config.default_max_tokens, 2000);
    }

    #[test]
    fn test_save_and_reload() {
        let tmp = tempdir().unwrap();
        let config = MemoryConfig {
            entity_fact_limit: 1,
            ..Default::default()
        };
        config.save(tmp.path()).unwrap();
        assert_eq!(MemoryConfig::load(tmp.path()).unwrap(), config);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = MemoryConfig {
            chars_per_token: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(MemoryError::Config(_))));

        let tmp = tempdir().unwrap();
        std::fs::write(paths::config_path(tmp.path()), "recall_limit = \"many\"").unwrap();
        assert!(matches!(
            MemoryConfig::load(tmp.path()),
            Err(MemoryError::Config(_))
        ));
    }
}
