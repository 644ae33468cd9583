//! Retrieval over agent memory.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     ContextAssembler                          │
//! │   core memory → recent logs → topic facts → participants      │
//! │          (each stage spends from one token budget)            │
//! └───────┬──────────────┬───────────────┬──────────────┬─────────┘
//!         │              │               │              │
//!  ┌──────▼──────┐ ┌─────▼──────┐ ┌──────▼──────┐ ┌─────▼──────┐
//!  │ CuratedMem  │ │ DailyLogs  │ │   recall    │ │  Entities  │
//!  └─────────────┘ └────────────┘ └──────┬──────┘ └────────────┘
//!                                 ┌──────▼──────┐
//!                                 │  FactStore  │ ← tantivy index
//!                                 └─────────────┘
//! ```

mod context;
mod recall;

pub use context::{
    CORE_MEMORY_HEADER, CharRatioEstimator, ContextAssembler, ContextRequest, ContextSection,
    ContextWindow, RECENT_ACTIVITY_HEADER, SectionKind, TokenEstimator, profile_header,
    topic_header,
};
pub use recall::{RecallOptions, recall};
