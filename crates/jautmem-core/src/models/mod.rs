//! Domain models for agent memory.

pub mod agent;
pub mod entity;
pub mod fact;
pub mod interaction;
pub mod log;
pub mod stats;

pub use agent::{SHARED_PARTITION, validate_agent};
pub use entity::{Entity, EntityUpdateMode, entity_slug, entity_tag};
pub use fact::{Fact, FactCategory};
pub use interaction::InteractionRecord;
pub use log::{DailyLog, render_logs};
pub use stats::MemoryStats;
