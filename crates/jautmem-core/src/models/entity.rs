use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How an entity update is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityUpdateMode {
    /// Add the text as a new timestamped line
    #[default]
    Append,
    /// Overwrite the whole blob
    Replace,
}

impl fmt::Display for EntityUpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Append => write!(f, "append"),
            Self::Replace => write!(f, "replace"),
        }
    }
}

impl FromStr for EntityUpdateMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "append" => Ok(Self::Append),
            "replace" => Ok(Self::Replace),
            other => Err(format!("unknown entity update mode: {other}")),
        }
    }
}

/// Knowledge an agent holds about another agent or a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Normalized lookup key, also the file stem
    pub slug: String,
    pub content: String,
}

impl Entity {
    pub fn new(slug: String, content: String) -> Self {
        Self { slug, content }
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Normalize an entity name into its stable slug.
///
/// A leading `@` is dropped, letters are lowercased and every run of
/// non-alphanumeric characters collapses into a single `_`:
/// `"Coffee Stains"`, `"coffee_stains"` and `"@coffee--stains!"` all map to
/// `coffee_stains`.
pub fn entity_slug(name: &str) -> String {
    let trimmed = name.trim().trim_start_matches('@');
    let mut slug = String::with_capacity(trimmed.len());
    let mut pending_separator = false;

    for ch in trimmed.chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_separator = true;
        }
    }

    slug
}

/// Tag form used on facts: `@<slug>`, or `None` if the name has no slug.
pub fn entity_tag(name: &str) -> Option<String> {
    let slug = entity_slug(name);
    if slug.is_empty() {
        None
    } else {
        Some(format!("@{slug}"))
    }
}
