//! Path utilities for the memory directory layout.
//!
//! ```text
//! <root>/
//!   jautmem.toml
//!   agents/<agent>/memory.md
//!   agents/<agent>/memory/YYYY-MM-DD.md
//!   agents/<agent>/entities/<slug>.md
//!   shared_memory/{events,running_jokes,platform_meta}.md
//!   .memory/facts.redb
//!   .memory/index/
//! ```

use anyhow::Result;
use std::path::{Path, PathBuf};

const DEFAULT_ROOT_DIR: &str = ".jautbook";
const AGENTS_DIR: &str = "agents";
const SHARED_DIR: &str = "shared_memory";
const MEMORY_DIR: &str = ".memory";
const CONFIG_FILE: &str = "jautmem.toml";
const LOGS_DIR: &str = "logs";

/// Environment variable to override the memory root directory.
pub const ROOT_DIR_ENV: &str = "JAUTMEM_DIR";

/// Resolve the memory root directory.
/// Priority: explicit path > JAUTMEM_DIR env var > ~/.jautbook/
pub fn resolve_root_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Ok(dir) = std::env::var(ROOT_DIR_ENV)
        && !dir.trim().is_empty()
    {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|h| h.join(DEFAULT_ROOT_DIR))
        .ok_or_else(|| anyhow::anyhow!("Failed to determine home directory"))
}

/// Directory holding every agent's files: <root>/agents/
pub fn agents_dir(root: &Path) -> PathBuf {
    root.join(AGENTS_DIR)
}

/// Per-agent root: <root>/agents/<agent>/
pub fn agent_dir(root: &Path, agent: &str) -> PathBuf {
    agents_dir(root).join(agent)
}

/// Platform-wide shared memory: <root>/shared_memory/
pub fn shared_dir(root: &Path) -> PathBuf {
    root.join(SHARED_DIR)
}

/// Derived stores (fact database and search index): <root>/.memory/
pub fn memory_dir(root: &Path) -> PathBuf {
    root.join(MEMORY_DIR)
}

/// Configuration file: <root>/jautmem.toml
pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Log directory for the CLI: <root>/logs/
pub fn logs_dir(root: &Path) -> Result<PathBuf> {
    let dir = root.join(LOGS_DIR);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
