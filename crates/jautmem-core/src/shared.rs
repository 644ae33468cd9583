//! Platform-wide memory shared by every agent.
//!
//! Reads are open to any caller. Writes go through [`SharedMemory`] only,
//! never through a per-agent path, and are serialized by one lock.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::path::PathBuf;

use crate::error::MemoryResult;
use crate::storage::{CuratedMemoryStore, MemoryScope, SharedBlob};

pub const PLATFORM_EVENTS_HEADER: &str = "=== PLATFORM EVENTS ===";
pub const SHARED_REFERENCES_HEADER: &str = "=== SHARED REFERENCES ===";

const EVENT_TAIL_LINES: usize = 30;
const REFERENCE_TAIL_CHARS: usize = 1000;

/// Shared write path over the `shared_memory/` blobs.
#[derive(Debug)]
pub struct SharedMemory {
    curated: CuratedMemoryStore,
    write_lock: Mutex<()>,
}

impl SharedMemory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            curated: CuratedMemoryStore::new(root),
            write_lock: Mutex::new(()),
        }
    }

    /// Create any missing blob from its template. Existing blobs are untouched.
    pub fn init(&self) -> MemoryResult<()> {
        let _guard = self.write_lock.lock();
        for blob in SharedBlob::ALL {
            if self.curated.seed(&MemoryScope::Shared(blob), blob.template())? {
                tracing::info!(blob = %blob, "Seeded shared memory");
            }
        }
        Ok(())
    }

    /// Record a platform event under a `## YYYY-MM-DD HH:MM (significance)` heading.
    pub fn log_event(&self, event: &str, significance: &str, at: DateTime<Utc>) -> MemoryResult<()> {
        let entry = format!(
            "\n## {} ({})\n\n{}\n",
            at.format("%Y-%m-%d %H:%M"),
            significance.trim(),
            event.trim()
        );
        self.append(SharedBlob::Events, &entry)
    }

    /// Record a running joke or shared reference.
    pub fn add_joke(&self, reference: &str, context: &str, at: DateTime<Utc>) -> MemoryResult<()> {
        let entry = format!(
            "\n- **{}** ({}): {}\n",
            reference.trim(),
            at.format("%Y-%m-%d"),
            context.trim()
        );
        self.append(SharedBlob::RunningJokes, &entry)
    }

    /// Replace a shared blob.
    pub fn update(&self, blob: SharedBlob, text: &str) -> MemoryResult<()> {
        let _guard = self.write_lock.lock();
        self.curated.overwrite(&MemoryScope::Shared(blob), text)
    }

    pub fn read(&self, blob: SharedBlob) -> MemoryResult<String> {
        self.curated.load(&MemoryScope::Shared(blob))
    }

    /// Recent platform events and the tail of the shared references.
    ///
    /// Blobs that do not exist yet are left out.
    pub fn get_shared_context(&self) -> MemoryResult<String> {
        let mut sections = Vec::new();

        let events = self.read(SharedBlob::Events)?;
        if !events.is_empty() {
            sections.push(format!(
                "{}\n{}",
                PLATFORM_EVENTS_HEADER,
                tail_lines(&events, EVENT_TAIL_LINES)
            ));
        }

        let jokes = self.read(SharedBlob::RunningJokes)?;
        if !jokes.is_empty() {
            sections.push(format!(
                "{}\n{}",
                SHARED_REFERENCES_HEADER,
                tail_chars(&jokes, REFERENCE_TAIL_CHARS)
            ));
        }

        Ok(sections.join("\n\n"))
    }

    fn append(&self, blob: SharedBlob, entry: &str) -> MemoryResult<()> {
        let _guard = self.write_lock.lock();
        let scope = MemoryScope::Shared(blob);
        self.curated.seed(&scope, blob.template())?;
        self.curated.append(&scope, entry)?;
        tracing::debug!(blob = %blob, "Appended to shared memory");
        Ok(())
    }
}

fn tail_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    lines[lines.len().saturating_sub(n)..].concat()
}

fn tail_chars(text: &str, n: usize) -> &str {
    let count = text.chars().count();
    if count <= n {
        return text;
    }
    match text.char_indices().nth(count - n) {
        Some((start, _)) => &text[start..],
        None => text,
    }
}
