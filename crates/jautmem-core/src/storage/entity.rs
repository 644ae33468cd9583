//! Per-agent entity knowledge, one markdown file per entity slug.

use chrono::{DateTime, Utc};
use jautmem_storage::paths;
use std::path::PathBuf;

use super::{append_to, count_markdown_files, overwrite, read_or_empty};
use crate::error::{MemoryError, MemoryResult};
use crate::models::{Entity, EntityUpdateMode, entity_slug, validate_agent};

const ENTITIES_DIR: &str = "entities";

/// File-backed entity store rooted at the memory root directory.
#[derive(Debug, Clone)]
pub struct EntityStore {
    root: PathBuf,
}

impl EntityStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn entities_dir(&self, agent: &str) -> MemoryResult<PathBuf> {
        let agent = validate_agent(agent)?;
        Ok(paths::agent_dir(&self.root, agent).join(ENTITIES_DIR))
    }

    fn entity_path(&self, agent: &str, slug: &str) -> MemoryResult<PathBuf> {
        Ok(self.entities_dir(agent)?.join(format!("{slug}.md")))
    }

    /// Look up an entity; `None` if it was never created.
    pub fn get(&self, agent: &str, name: &str) -> MemoryResult<Option<Entity>> {
        let slug = entity_slug(name);
        if slug.is_empty() {
            return Ok(None);
        }

        let path = self.entity_path(agent, &slug)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(Entity::new(slug, read_or_empty(&path)?)))
    }

    /// Fetch an entity, creating an empty record if none exists.
    ///
    /// A name without any alphanumeric characters yields an empty, unsaved
    /// entity rather than an error.
    pub fn get_or_create(&self, agent: &str, name: &str) -> MemoryResult<Entity> {
        let slug = entity_slug(name);
        if slug.is_empty() {
            validate_agent(agent)?;
            return Ok(Entity::new(slug, String::new()));
        }

        let path = self.entity_path(agent, &slug)?;
        if !path.exists() {
            overwrite(&path, "")?;
            tracing::debug!(agent = %agent, entity = %slug, "Created entity");
            return Ok(Entity::new(slug, String::new()));
        }
        Ok(Entity::new(slug, read_or_empty(&path)?))
    }

    /// Append a timestamped line to an entity, or replace its blob.
    pub fn update(
        &self,
        agent: &str,
        name: &str,
        text: &str,
        mode: EntityUpdateMode,
        at: DateTime<Utc>,
    ) -> MemoryResult<Entity> {
        let slug = entity_slug(name);
        if slug.is_empty() {
            return Err(MemoryError::InvalidEntity(name.to_string()));
        }

        let path = self.entity_path(agent, &slug)?;
        match mode {
            EntityUpdateMode::Append => {
                let line = format!("- [{}] {}\n", at.format("%Y-%m-%d %H:%M"), text.trim());
                append_to(&path, &line)?;
            }
            EntityUpdateMode::Replace => overwrite(&path, text)?,
        }

        tracing::debug!(agent = %agent, entity = %slug, mode = %mode, "Updated entity");
        Ok(Entity::new(slug, read_or_empty(&path)?))
    }

    /// Number of entities an agent knows about
    pub fn count(&self, agent: &str) -> MemoryResult<u32> {
        count_markdown_files(&self.entities_dir(agent)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 31, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_get_missing_is_none() {
        let tmp = tempdir().unwrap();
        let store = EntityStore::new(tmp.path());
        assert_eq!(store.get("Cynix", "Nova").unwrap(), None);
        assert_eq!(store.get("Cynix", "!!!").unwrap(), None);
    }

    #[test]
    fn test_get_or_create_normalizes_names() {
        let tmp = tempdir().unwrap();
        let store = EntityStore::new(tmp.path());

        let created = store.get_or_create("Cynix", "Coffee Stains").unwrap();
        assert_eq!(created.slug, "coffee_stains");
        assert!(created.is_empty());
        assert!(tmp.path().join("agents/Cynix/entities/coffee_stains.md").exists());

        store
            .update("Cynix", "coffee_stains", "a metaphor", EntityUpdateMode::Append, noon())
            .unwrap();
        let same = store.get_or_create("Cynix", "Coffee Stains").unwrap();
        assert_eq!(same.content, "- [2025-01-31 12:30] a metaphor\n");
        assert_eq!(store.count("Cynix").unwrap(), 1);
    }

    #[test]
    fn test_append_then_replace() {
        let tmp = tempdir().unwrap();
        let store = EntityStore::new(tmp.path());

        store
            .update("Cynix", "@Nova", "argued about tabs", EntityUpdateMode::Append, noon())
            .unwrap();
        let entity = store
            .update("Cynix", "Nova", "second line", EntityUpdateMode::Append, noon())
            .unwrap();
        assert_eq!(entity.content.lines().count(), 2);

        let replaced = store
            .update("Cynix", "NOVA", "# Nova\n\nFriendly rival.\n", EntityUpdateMode::Replace, noon())
            .unwrap();
        assert_eq!(replaced.content, "# Nova\n\nFriendly rival.\n");
        assert_eq!(
            store.get("Cynix", "nova").unwrap().unwrap().content,
            "# Nova\n\nFriendly rival.\n"
        );
    }

    #[test]
    fn test_entities_are_scoped_per_agent() {
        let tmp = tempdir().unwrap();
        let store = EntityStore::new(tmp.path());
        store
            .update("Cynix", "Nova", "hi", EntityUpdateMode::Append, noon())
            .unwrap();
        assert_eq!(store.get("Echo", "Nova").unwrap(), None);
        assert_eq!(store.count("Echo").unwrap(), 0);
    }

    #[test]
    fn test_update_with_empty_slug_fails() {
        let tmp = tempdir().unwrap();
        let store = EntityStore::new(tmp.path());
        assert!(matches!(
            store.update("Cynix", " @ ", "x", EntityUpdateMode::Append, noon()),
            Err(MemoryError::InvalidEntity(_))
        ));
        let unsaved = store.get_or_create("Cynix", " @ ").unwrap();
        assert!(unsaved.is_empty());
        assert_eq!(store.count("Cynix").unwrap(), 0);
    }
}
