//! Typed stores over the agent memory layout.
//!
//! Markdown-backed stores (daily logs, curated memory, entities) are the
//! human-readable source of truth for raw events and hand-edited knowledge.
//! [`FactStore`] wraps the byte-level fact database and its derived search
//! index from `jautmem-storage`.

pub mod curated;
pub mod daily_log;
pub mod entity;
pub mod fact;

pub use curated::{CuratedMemoryStore, MemoryScope, SharedBlob};
pub use daily_log::DailyLogStore;
pub use entity::EntityStore;
pub use fact::{FactStore, ScoredFact};

use crate::error::{MemoryError, MemoryResult};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Read a file, treating a missing file as empty.
pub(crate) fn read_or_empty(path: &Path) -> MemoryResult<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(MemoryError::io(path)(e)),
    }
}

/// Append to a file, creating it and its parent directory when needed.
pub(crate) fn append_to(path: &Path, text: &str) -> MemoryResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(MemoryError::io(parent))?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(MemoryError::io(path))?;
    file.write_all(text.as_bytes()).map_err(MemoryError::io(path))
}

/// Replace a file's content, creating its parent directory when needed.
pub(crate) fn overwrite(path: &Path, text: &str) -> MemoryResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(MemoryError::io(parent))?;
    }
    std::fs::write(path, text).map_err(MemoryError::io(path))
}

/// Count `*.md` files directly inside `dir`; a missing directory counts zero.
pub(crate) fn count_markdown_files(dir: &Path) -> MemoryResult<u32> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(MemoryError::io(dir)(e)),
    };

    let mut count = 0u32;
    for entry in entries {
        let path = entry.map_err(MemoryError::io(dir))?.path();
        if path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("md") {
            count += 1;
        }
    }
    Ok(count)
}
