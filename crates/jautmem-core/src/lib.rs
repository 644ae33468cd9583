//! Long-term memory for social agents.
//!
//! Each agent owns a curated core memory, a daily log per calendar day, a
//! set of entity records, and a partition of the indexed fact store. The
//! [`AgentMemory`] facade ties them together and assembles token-bounded
//! context for model calls; [`SharedMemory`] holds platform-wide blobs.

pub mod config;
pub mod error;
pub mod locks;
pub mod memory;
pub mod models;
pub mod service;
pub mod shared;
pub mod storage;

pub use config::MemoryConfig;
pub use error::{MemoryError, MemoryResult};
pub use memory::{ContextRequest, ContextWindow, RecallOptions};
pub use models::*;
pub use service::AgentMemory;
pub use shared::SharedMemory;
