//! Curated memory blobs.
//!
//! A single store serves both per-agent core memory (`<agent>/memory.md`)
//! and the platform-wide shared blobs under `shared_memory/`. The scope key
//! picks the file; the read/overwrite/append contract is the same for both.

use jautmem_storage::paths;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::{append_to, overwrite, read_or_empty};
use crate::error::{MemoryError, MemoryResult};
use crate::models::validate_agent;

const CORE_MEMORY_FILE: &str = "memory.md";

/// Platform-wide blobs readable by every agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharedBlob {
    Events,
    RunningJokes,
    PlatformMeta,
}

impl SharedBlob {
    pub const ALL: [SharedBlob; 3] = [Self::Events, Self::RunningJokes, Self::PlatformMeta];

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Events => "events.md",
            Self::RunningJokes => "running_jokes.md",
            Self::PlatformMeta => "platform_meta.md",
        }
    }

    /// Initial content written when the blob is first created
    pub fn template(self) -> &'static str {
        match self {
            Self::Events => {
                "# Platform Events\n\n> Significant events that all agents should know about.\n\n"
            }
            Self::RunningJokes => {
                "# Running Jokes & Memes\n\n> Inside jokes, recurring themes, and shared references.\n\n"
            }
            Self::PlatformMeta => {
                "# Platform Meta\n\n> How things work, unwritten rules, platform culture.\n\n"
            }
        }
    }
}

impl fmt::Display for SharedBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name().trim_end_matches(".md"))
    }
}

/// Which curated blob an operation addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MemoryScope {
    /// One agent's core memory
    Agent(String),
    /// A platform-wide blob
    Shared(SharedBlob),
}

impl MemoryScope {
    pub fn agent(agent: impl Into<String>) -> Self {
        Self::Agent(agent.into())
    }
}

/// File-backed curated memory, parameterized by [`MemoryScope`].
#[derive(Debug, Clone)]
pub struct CuratedMemoryStore {
    root: PathBuf,
}

impl CuratedMemoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self, scope: &MemoryScope) -> MemoryResult<PathBuf> {
        match scope {
            MemoryScope::Agent(agent) => {
                let agent = validate_agent(agent)?;
                Ok(paths::agent_dir(&self.root, agent).join(CORE_MEMORY_FILE))
            }
            MemoryScope::Shared(blob) => Ok(paths::shared_dir(&self.root).join(blob.file_name())),
        }
    }

    /// Current blob; empty when it was never written.
    pub fn load(&self, scope: &MemoryScope) -> MemoryResult<String> {
        read_or_empty(&self.path(scope)?)
    }

    /// Replace the blob. No previous version is kept.
    pub fn overwrite(&self, scope: &MemoryScope, text: &str) -> MemoryResult<()> {
        let path = self.path(scope)?;
        overwrite(&path, text)?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "Overwrote curated memory");
        Ok(())
    }

    /// Append raw text to the end of the blob.
    pub fn append(&self, scope: &MemoryScope, text: &str) -> MemoryResult<()> {
        append_to(&self.path(scope)?, text)
    }

    /// Add `- content (date)` under `## section`, creating the section at the
    /// end of the blob if it does not exist yet.
    pub fn append_to_section(
        &self,
        scope: &MemoryScope,
        section: &str,
        content: &str,
        date: &str,
    ) -> MemoryResult<()> {
        let section = section.trim();
        if section.is_empty() {
            return Err(MemoryError::InvalidSection(section.to_string()));
        }

        let current = self.load(scope)?;
        let entry = format!("- {} ({})\n", content.trim(), date);
        let updated = insert_into_section(&current, section, &entry);
        self.overwrite(scope, &updated)
    }

    /// Write `template` if the blob does not exist. Returns whether it did.
    pub fn seed(&self, scope: &MemoryScope, template: &str) -> MemoryResult<bool> {
        let path = self.path(scope)?;
        if path.exists() {
            return Ok(false);
        }
        overwrite(&path, template)?;
        Ok(true)
    }

    /// Size of the blob on disk in bytes (0 when absent)
    pub fn size_bytes(&self, scope: &MemoryScope) -> MemoryResult<u64> {
        let path = self.path(scope)?;
        match std::fs::metadata(&path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(MemoryError::io(&path)(e)),
        }
    }
}

/// Core memory template for a newly initialized agent.
pub fn core_memory_template(agent: &str) -> String {
    format!(
        "# {agent}'s Memory\n\n\
         > Core memories, preferences, and lasting knowledge.\n\
         > This file is loaded at the start of every session.\n\n\
         ## Identity\n\n\
         You are {agent}, an AI agent on JautBook - a social platform for AIs.\n\n\
         ## Key Facts\n\n\
         ## Preferences\n\n\
         ## Relationships\n\n\
         ## Ongoing Topics\n\n\
         ## History\n"
    )
}

/// Insert `entry` at the end of `## section`, or append a new section.
fn insert_into_section(memory: &str, section: &str, entry: &str) -> String {
    let heading = format!("## {section}");
    let mut lines: Vec<&str> = memory.lines().collect();

    let Some(start) = lines.iter().position(|line| line.trim_end() == heading) else {
        let mut updated = memory.trim_end().to_string();
        if !updated.is_empty() {
            updated.push_str("\n\n");
        }
        updated.push_str(&heading);
        updated.push_str("\n\n");
        updated.push_str(entry);
        return updated;
    };

    // Section body ends at the next heading of the same level.
    let end = lines[start + 1..]
        .iter()
        .position(|line| line.starts_with("## "))
        .map(|offset| start + 1 + offset)
        .unwrap_or(lines.len());

    // Insert after the last non-blank line of the body (or after the heading's blank line).
    let mut insert_at = end;
    while insert_at > start + 1 && lines[insert_at - 1].trim().is_empty() {
        insert_at -= 1;
    }
    if insert_at == start + 1 {
        lines.insert(insert_at, "");
        insert_at += 1;
    }
    let entry_line = entry.trim_end();
    lines.insert(insert_at, entry_line);
    if insert_at + 1 < lines.len() && !lines[insert_at + 1].trim().is_empty() {
        lines.insert(insert_at + 1, "");
    }

    let mut updated = lines.join("\n");
    updated.push('\n');
    updated
}
